//! Address Lookup Table toolkit for Solana
//!
//! Decodes and encodes lookup table accounts, builds lookup table program
//! instructions, and expands the address table lookups of v0 messages into
//! their full account key list.

pub mod config;
pub mod constants;
pub mod error;
pub mod fetch;
pub mod message;
pub mod table;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AltError, AltResult};
pub use fetch::{AccountFetcher, RpcAccountFetcher, TableCache, TableFetcher};
pub use message::{resolve_lookups, LookupMessage, LookupsExt, ResolvedKeySet, TableProvider};
pub use table::{
    KeyedLookupTable, LookupTableInstruction, LookupTableProgram, LookupTableState, UiLookupTable,
};
