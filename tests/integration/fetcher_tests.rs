//! Table Fetcher Integration Tests
//!
//! Serves recorded account data from memory and drives the full
//! fetch -> decode -> cache -> resolve path.

use alt_resolver::{
    AccountFetcher, AltError, AltResult, LookupMessage, LookupTableState, TableCache, TableFetcher,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use parking_lot::Mutex;
use solana_sdk::hash::Hash;
use solana_sdk::message::v0::{self, MessageAddressTableLookup};
use solana_sdk::message::MessageHeader;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

const SWAP_TX: &str = include_str!("../fixtures/v0_swap_tx.b64");
const SWAP_TABLE: &str = "BpVMhYJB14QX5pXfbHRxB8vmpW4AFodWjBTDvfCJwsfv";

/// In-memory account store that records every request
#[derive(Default)]
struct RecordingFetcher {
    accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    requests: Mutex<Vec<Pubkey>>,
}

impl RecordingFetcher {
    fn with_account(address: Pubkey, data: Vec<u8>) -> Self {
        Self {
            accounts: Mutex::new(HashMap::from([(address, data)])),
            ..Default::default()
        }
    }
}

#[async_trait]
impl AccountFetcher for RecordingFetcher {
    async fn fetch(&self, address: &Pubkey) -> AltResult<Option<Vec<u8>>> {
        self.requests.lock().push(*address);
        Ok(self.accounts.lock().get(address).cloned())
    }
}

/// Fetcher standing in for an unreachable node
struct FailingFetcher;

#[async_trait]
impl AccountFetcher for FailingFetcher {
    async fn fetch(&self, _address: &Pubkey) -> AltResult<Option<Vec<u8>>> {
        Err(AltError::Rpc("connection refused".to_string()))
    }
}

fn swap_table_key() -> Pubkey {
    Pubkey::from_str(SWAP_TABLE).unwrap()
}

fn store() -> Arc<RecordingFetcher> {
    let data = STANDARD
        .decode(include_str!("../fixtures/lookup_table.b64").trim())
        .unwrap();
    Arc::new(RecordingFetcher::with_account(swap_table_key(), data))
}

#[tokio::test]
async fn test_resolve_message_from_store() {
    let store = store();
    let fetcher = TableFetcher::new(store.clone(), TableCache::new(16, 3600));

    let mut message = LookupMessage::from_base64_transaction(SWAP_TX).unwrap();
    fetcher.resolve_message(&mut message).await.unwrap();

    assert!(message.is_resolved());
    assert_eq!(message.account_keys().len(), 27);
    assert_eq!(message.address_tables()[&swap_table_key()].len(), 255);
    assert_eq!(
        message.account(26).unwrap(),
        Pubkey::from_str("749y4fXb9SzqmrLEetQdui5iDucnNiMgCJ2uzc3y7cou").unwrap()
    );
    assert_eq!(store.requests.lock().as_slice(), &[swap_table_key()]);
}

#[tokio::test]
async fn test_second_message_served_from_cache() {
    let store = store();
    let fetcher = TableFetcher::new(store.clone(), TableCache::new(16, 3600));

    let mut first = LookupMessage::from_base64_transaction(SWAP_TX).unwrap();
    let mut second = first.clone();
    fetcher.resolve_message(&mut first).await.unwrap();
    fetcher.resolve_message(&mut second).await.unwrap();

    assert_eq!(first.account_keys(), second.account_keys());
    assert_eq!(store.requests.lock().len(), 1);
    assert_eq!(fetcher.cache().stats().entries, 1);
}

#[tokio::test]
async fn test_resolved_message_not_refetched() {
    let store = store();
    let fetcher = TableFetcher::new(store.clone(), TableCache::new(16, 0));

    let mut message = LookupMessage::from_base64_transaction(SWAP_TX).unwrap();
    fetcher.resolve_message(&mut message).await.unwrap();
    fetcher.resolve_message(&mut message).await.unwrap();

    assert_eq!(store.requests.lock().len(), 1);
}

#[tokio::test]
async fn test_missing_table_leaves_message_unresolved() {
    let fetcher = TableFetcher::new(RecordingFetcher::default(), TableCache::new(16, 3600));

    let mut message = LookupMessage::from_base64_transaction(SWAP_TX).unwrap();
    let result = fetcher.resolve_message(&mut message).await;

    assert!(matches!(result, Err(AltError::TableNotFound(t)) if t == swap_table_key()));
    assert!(!message.is_resolved());
    assert_eq!(message.account_keys().len(), 5);
}

#[tokio::test]
async fn test_rpc_failure_propagates() {
    let fetcher = TableFetcher::new(FailingFetcher, TableCache::new(16, 3600));

    let result = fetcher.fetch_table(&swap_table_key()).await;
    assert!(matches!(result, Err(AltError::Rpc(_))));
    assert!(fetcher.cache().is_empty());
}

#[tokio::test]
async fn test_uninitialized_account_rejected() {
    let key = Pubkey::new_unique();
    let mut data = vec![0u8; 56];
    data[4..12].copy_from_slice(&u64::MAX.to_le_bytes());
    let fetcher = TableFetcher::new(
        RecordingFetcher::with_account(key, data),
        TableCache::new(16, 3600),
    );

    assert!(matches!(
        fetcher.fetch_table(&key).await,
        Err(AltError::MalformedAccount(_))
    ));
}

fn single_lookup_message(table: Pubkey, index: u8) -> LookupMessage {
    LookupMessage::from_v0(v0::Message {
        header: MessageHeader {
            num_required_signatures: 1,
            num_readonly_signed_accounts: 0,
            num_readonly_unsigned_accounts: 0,
        },
        account_keys: vec![Pubkey::new_unique()],
        recent_blockhash: Hash::default(),
        instructions: vec![],
        address_table_lookups: vec![MessageAddressTableLookup {
            account_key: table,
            writable_indexes: vec![index],
            readonly_indexes: vec![],
        }],
    })
}

#[tokio::test]
async fn test_extended_table_refetched_past_cached_end() {
    let table_key = Pubkey::new_unique();
    let mut table = LookupTableState::new(Some(Pubkey::new_unique()));
    table.addresses = vec![Pubkey::new_unique(), Pubkey::new_unique()];
    let store = Arc::new(RecordingFetcher::with_account(table_key, table.encode()));
    let fetcher = TableFetcher::new(store.clone(), TableCache::new(16, 3600));

    let mut first = single_lookup_message(table_key, 1);
    fetcher.resolve_message(&mut first).await.unwrap();
    assert_eq!(first.account(1).unwrap(), table.addresses[1]);

    let appended = Pubkey::new_unique();
    table.addresses.push(appended);
    store.accounts.lock().insert(table_key, table.encode());

    let mut second = single_lookup_message(table_key, 2);
    fetcher.resolve_message(&mut second).await.unwrap();
    assert_eq!(second.account(1).unwrap(), appended);
    assert_eq!(fetcher.cache().get(&table_key).unwrap().len(), 3);
    assert_eq!(store.requests.lock().len(), 2);

    let mut third = single_lookup_message(table_key, 0);
    fetcher.resolve_message(&mut third).await.unwrap();
    assert_eq!(store.requests.lock().len(), 2);
}
