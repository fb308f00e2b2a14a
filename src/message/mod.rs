//! Versioned message lookup resolution

pub mod lookups;
pub mod resolver;
pub mod versioned;

pub use lookups::LookupsExt;
pub use resolver::{resolve_lookups, ResolvedKeySet, TableProvider};
pub use versioned::{
    decode_base64_transaction, decode_transaction, encode_transaction, LookupMessage,
};
