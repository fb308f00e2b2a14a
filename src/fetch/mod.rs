//! Lookup table fetching and caching

pub mod cache;
pub mod fetcher;

pub use cache::{CacheStats, TableCache};
pub use fetcher::{AccountFetcher, RpcAccountFetcher, TableFetcher};
