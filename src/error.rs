//! Error types for the lookup-table resolver

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Resolver-level errors
///
/// Every failure aborts the operation that produced it. Decoding and
/// resolution never hand back partial state alongside an error.
#[derive(Error, Debug)]
pub enum AltError {
    /// Account bytes do not follow the lookup table layout
    #[error("Malformed lookup table account: {0}")]
    MalformedAccount(String),

    /// A message references a table that was not supplied
    #[error("Lookup table not found: {0}")]
    TableNotFound(Pubkey),

    /// A lookup index points past the end of the table
    #[error("Lookup index {index} out of range for table {table} with {len} addresses")]
    IndexOutOfRange { table: Pubkey, index: u8, len: usize },

    /// A positional or key query against the resolved key list failed
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// The same table index is requested as both writable and readonly
    #[error("Lookup index {index} of table {table} is listed as both writable and readonly")]
    DuplicateIndex { table: Pubkey, index: u8 },

    /// Lookup table program instruction data could not be decoded
    #[error("Invalid lookup table instruction: {0}")]
    InvalidInstruction(String),

    /// Instruction targets a different program
    #[error("Program mismatch: expected {expected}, got {actual}")]
    ProgramMismatch { expected: Pubkey, actual: Pubkey },

    /// Message version this crate does not resolve
    #[error("Unsupported message: {0}")]
    UnsupportedMessage(String),

    /// Wire (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// RPC/Solana error
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type alias for convenience
pub type AltResult<T> = Result<T, AltError>;
