//! Lookup table retrieval
//!
//! `AccountFetcher` is the only I/O seam: it hands back raw account bytes.
//! `TableFetcher` decodes them, caches the result and feeds the resolver.

use super::cache::TableCache;
use crate::error::{AltError, AltResult};
use crate::message::LookupMessage;
use crate::table::LookupTableState;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::message::v0::MessageAddressTableLookup;
use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Source of raw account data
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// Account data at `address`, or `None` if no such account exists
    async fn fetch(&self, address: &Pubkey) -> AltResult<Option<Vec<u8>>>;
}

#[async_trait]
impl<T: AccountFetcher + ?Sized> AccountFetcher for Arc<T> {
    async fn fetch(&self, address: &Pubkey) -> AltResult<Option<Vec<u8>>> {
        (**self).fetch(address).await
    }
}

/// Account fetcher backed by a Solana JSON-RPC node
///
/// Only accounts owned by the configured lookup table program are returned.
pub struct RpcAccountFetcher {
    rpc_client: Arc<RpcClient>,
    program_id: Pubkey,
}

impl RpcAccountFetcher {
    pub fn new(
        rpc_url: &str,
        timeout: Duration,
        commitment: CommitmentConfig,
        program_id: Pubkey,
    ) -> Self {
        let rpc_client =
            RpcClient::new_with_timeout_and_commitment(rpc_url.to_string(), timeout, commitment);
        Self {
            rpc_client: Arc::new(rpc_client),
            program_id,
        }
    }

    /// Share an existing client
    pub fn with_client(rpc_client: Arc<RpcClient>, program_id: Pubkey) -> Self {
        Self {
            rpc_client,
            program_id,
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }
}

/// Account data, provided the account belongs to `program_id`
fn owned_data(address: &Pubkey, account: Account, program_id: &Pubkey) -> AltResult<Vec<u8>> {
    if account.owner != *program_id {
        return Err(AltError::MalformedAccount(format!(
            "account {} is owned by {}, not the lookup table program {}",
            address, account.owner, program_id
        )));
    }
    Ok(account.data)
}

#[async_trait]
impl AccountFetcher for RpcAccountFetcher {
    async fn fetch(&self, address: &Pubkey) -> AltResult<Option<Vec<u8>>> {
        let response = self
            .rpc_client
            .get_account_with_commitment(address, self.rpc_client.commitment())
            .await
            .map_err(|e| AltError::Rpc(format!("Failed to fetch account {}: {}", address, e)))?;

        response
            .value
            .map(|account| owned_data(address, account, &self.program_id))
            .transpose()
    }
}

/// Fetches, decodes and caches lookup tables
pub struct TableFetcher<F> {
    fetcher: F,
    cache: TableCache,
}

impl<F: AccountFetcher> TableFetcher<F> {
    pub fn new(fetcher: F, cache: TableCache) -> Self {
        Self { fetcher, cache }
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    /// Load one table, from the cache when possible
    pub async fn fetch_table(&self, address: &Pubkey) -> AltResult<LookupTableState> {
        self.fetch_table_covering(address, 0).await
    }

    /// Load one table holding at least `min_len` addresses
    ///
    /// Tables grow through extension, so a cached copy shorter than
    /// `min_len` is dropped and fetched again once.
    pub async fn fetch_table_covering(
        &self,
        address: &Pubkey,
        min_len: usize,
    ) -> AltResult<LookupTableState> {
        if let Some(table) = self.cache.get(address) {
            if table.len() >= min_len {
                return Ok(table);
            }
            tracing::debug!(
                table = %address,
                cached = table.len(),
                required = min_len,
                "Cached lookup table too short, refetching"
            );
            self.cache.invalidate(address);
        }

        let data = self
            .fetcher
            .fetch(address)
            .await?
            .ok_or(AltError::TableNotFound(*address))?;
        let table = LookupTableState::decode_initialized(&data)?;

        if !table.is_active() {
            tracing::warn!(
                table = %address,
                deactivation_slot = table.deactivation_slot,
                "Lookup table is deactivated"
            );
        }
        tracing::debug!(table = %address, addresses = table.len(), "Fetched lookup table");

        self.cache.insert(*address, table.clone());
        Ok(table)
    }

    /// Load several tables concurrently
    ///
    /// Repeated addresses are fetched once. Any failure fails the whole call.
    pub async fn fetch_tables(
        &self,
        addresses: &[Pubkey],
    ) -> AltResult<HashMap<Pubkey, LookupTableState>> {
        let mut seen = HashSet::new();
        let requirements: Vec<(Pubkey, usize)> = addresses
            .iter()
            .copied()
            .filter(|address| seen.insert(*address))
            .map(|address| (address, 0))
            .collect();
        self.fetch_covering(requirements).await
    }

    async fn fetch_covering(
        &self,
        requirements: Vec<(Pubkey, usize)>,
    ) -> AltResult<HashMap<Pubkey, LookupTableState>> {
        let tables = try_join_all(requirements.into_iter().map(|(address, min_len)| async move {
            self.fetch_table_covering(&address, min_len)
                .await
                .map(|table| (address, table))
        }))
        .await?;

        Ok(tables.into_iter().collect())
    }

    /// Fetch every table a message references and resolve its lookups
    pub async fn resolve_message(&self, message: &mut LookupMessage) -> AltResult<()> {
        if message.is_resolved() {
            return Ok(());
        }

        let requirements = required_lengths(message.address_table_lookups());
        let tables = self.fetch_covering(requirements).await?;
        message.set_address_tables(
            tables
                .into_iter()
                .map(|(address, table)| (address, table.addresses))
                .collect(),
        );
        message.resolve_lookups()
    }
}

/// Per table, in first-reference order, one past the highest index used
fn required_lengths(lookups: &[MessageAddressTableLookup]) -> Vec<(Pubkey, usize)> {
    let mut requirements: Vec<(Pubkey, usize)> = Vec::new();
    for lookup in lookups {
        let needed = lookup
            .writable_indexes
            .iter()
            .chain(&lookup.readonly_indexes)
            .map(|&index| index as usize + 1)
            .max()
            .unwrap_or(0);
        match requirements
            .iter_mut()
            .find(|(address, _)| *address == lookup.account_key)
        {
            Some((_, min_len)) => *min_len = (*min_len).max(needed),
            None => requirements.push((lookup.account_key, needed)),
        }
    }
    requirements
}
