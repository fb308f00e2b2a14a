//! Lookup Table Codec Unit Tests
//!
//! Decodes a mainnet lookup table account:
//! - Header fields at their fixed offsets
//! - Address order
//! - Byte-exact re-encoding

use alt_resolver::constants::{layout, ACTIVE_DEACTIVATION_SLOT};
use alt_resolver::{AltError, KeyedLookupTable, LookupTableState, UiLookupTable};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use solana_sdk::address_lookup_table::AddressLookupTableAccount;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

const TABLE_ADDRESS: &str = "BpVMhYJB14QX5pXfbHRxB8vmpW4AFodWjBTDvfCJwsfv";

fn table_bytes() -> Vec<u8> {
    STANDARD
        .decode(include_str!("../fixtures/lookup_table.b64").trim())
        .expect("fixture is valid base64")
}

fn key(s: &str) -> Pubkey {
    Pubkey::from_str(s).unwrap()
}

#[test]
fn test_decode_fixture_header() {
    let state = LookupTableState::decode(&table_bytes()).unwrap();

    assert_eq!(state.type_index, 1);
    assert!(state.is_initialized());
    assert_eq!(state.deactivation_slot, ACTIVE_DEACTIVATION_SLOT);
    assert!(state.is_active());
    assert_eq!(state.last_extended_slot, 154_742_572);
    assert_eq!(state.last_extended_slot_start_index, 232);
    assert_eq!(
        state.authority,
        Some(key("9FRhPDoDk9JrpCqc4r51qTWgdBTxM892TdjexeErQUNs"))
    );
    assert!(!state.is_frozen());
}

#[test]
fn test_decode_fixture_addresses() {
    let state = LookupTableState::decode(&table_bytes()).unwrap();

    assert_eq!(state.len(), 255);
    assert_eq!(
        state.addresses[0],
        key("9W959DqEETiGZocYWCQPaJ6sBmUzgfxXfqGeTEdp3aQP")
    );
    assert_eq!(
        state.addresses[1],
        key("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA")
    );
    assert_eq!(
        state.addresses[2],
        key("GW1Xt9HHtvcnky8X7aBA3BoTgiirJKP5XwC5REFcZSsc")
    );
    assert_eq!(state.get(254), state.addresses.last());
    assert!(state.get(255).is_none());
}

#[test]
fn test_fixture_reencodes_byte_exact() {
    let bytes = table_bytes();
    let state = LookupTableState::decode(&bytes).unwrap();

    let encoded = state.encode();
    assert_eq!(encoded.len(), layout::LOOKUP_TABLE_META_SIZE + 255 * layout::PUBKEY_BYTES);
    assert_eq!(encoded, bytes);
    assert_eq!(state.serialized_size(), bytes.len());
}

#[test]
fn test_strict_decode_accepts_fixture() {
    let bytes = table_bytes();
    assert_eq!(
        LookupTableState::decode_initialized(&bytes).unwrap(),
        LookupTableState::decode(&bytes).unwrap()
    );
}

#[test]
fn test_truncated_fixture_rejected() {
    let bytes = table_bytes();
    let result = LookupTableState::decode(&bytes[..bytes.len() - 5]);
    assert!(matches!(result, Err(AltError::MalformedAccount(_))));

    let result = LookupTableState::decode(&bytes[..40]);
    assert!(matches!(result, Err(AltError::MalformedAccount(_))));
}

#[test]
fn test_keyed_table_converts_to_sdk_account() {
    let keyed = KeyedLookupTable::decode(key(TABLE_ADDRESS), &table_bytes()).unwrap();
    let account: AddressLookupTableAccount = keyed.clone().into();

    assert_eq!(account.key, key(TABLE_ADDRESS));
    assert_eq!(account.addresses, keyed.state.addresses);
}

#[test]
fn test_ui_table_json() {
    let state = LookupTableState::decode(&table_bytes()).unwrap();
    let ui = UiLookupTable::from(&state);
    let value = serde_json::to_value(&ui).unwrap();

    assert_eq!(value["deactivationSlot"], "18446744073709551615");
    assert_eq!(value["lastExtendedSlot"], "154742572");
    assert_eq!(value["lastExtendedSlotStartIndex"], 232);
    assert_eq!(
        value["authority"],
        "9FRhPDoDk9JrpCqc4r51qTWgdBTxM892TdjexeErQUNs"
    );
    assert_eq!(value["addresses"].as_array().unwrap().len(), 255);
}
