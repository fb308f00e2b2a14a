//! Address Lookup Table account codec
//!
//! Decodes and encodes the raw data of a lookup table account:
//! a fixed 56-byte metadata header followed by a packed address array.
//!
//! ```text
//! offset  size  field
//!      0     4  type_index (u32)
//!      4     8  deactivation_slot (u64, u64::MAX = active)
//!     12     8  last_extended_slot (u64)
//!     20     1  last_extended_slot_start_index (u8)
//!     21     1  authority option flag
//!     22    32  authority (zeroed when the flag is 0)
//!     54     2  padding
//!     56  32*N  addresses
//! ```

use crate::constants::{account_type, layout::*, ACTIVE_DEACTIVATION_SLOT};
use crate::error::{AltError, AltResult};
use serde::{Deserialize, Serialize};
use solana_sdk::address_lookup_table::AddressLookupTableAccount;
use solana_sdk::pubkey::Pubkey;

/// Decoded content of a lookup table account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTableState {
    /// Account type discriminant (1 for an initialized table)
    pub type_index: u32,
    /// Slot at which the table was deactivated, `u64::MAX` while active
    pub deactivation_slot: u64,
    /// Last slot the table was extended in
    pub last_extended_slot: u64,
    /// Address count at the start of `last_extended_slot`
    pub last_extended_slot_start_index: u8,
    /// Authority allowed to extend, freeze, deactivate and close the table
    pub authority: Option<Pubkey>,
    /// Stored addresses; position in this list is the lookup index
    pub addresses: Vec<Pubkey>,
}

impl LookupTableState {
    /// Create an empty, active table owned by `authority`
    pub fn new(authority: Option<Pubkey>) -> Self {
        Self {
            type_index: account_type::LOOKUP_TABLE,
            deactivation_slot: ACTIVE_DEACTIVATION_SLOT,
            last_extended_slot: 0,
            last_extended_slot_start_index: 0,
            authority,
            addresses: Vec::new(),
        }
    }

    /// Decode raw account data
    pub fn decode(data: &[u8]) -> AltResult<Self> {
        if data.len() < LOOKUP_TABLE_META_SIZE {
            return Err(AltError::MalformedAccount(format!(
                "account data is {} bytes, metadata alone needs {}",
                data.len(),
                LOOKUP_TABLE_META_SIZE
            )));
        }

        let type_index = u32::from_le_bytes(read_array(data, TYPE_INDEX_OFFSET));
        let deactivation_slot = u64::from_le_bytes(read_array(data, DEACTIVATION_SLOT_OFFSET));
        let last_extended_slot = u64::from_le_bytes(read_array(data, LAST_EXTENDED_SLOT_OFFSET));
        let last_extended_slot_start_index = data[LAST_EXTENDED_SLOT_START_INDEX_OFFSET];

        // The authority slot is always 32 bytes wide, present or not.
        let authority = match data[AUTHORITY_OPTION_OFFSET] {
            0 => None,
            1 => Some(Pubkey::new_from_array(read_array(data, AUTHORITY_OFFSET))),
            flag => {
                return Err(AltError::MalformedAccount(format!(
                    "invalid authority option flag {}",
                    flag
                )))
            }
        };

        // Nonzero padding would not survive a re-encode.
        let padding = &data[PADDING_OFFSET..PADDING_OFFSET + PADDING_SIZE];
        if padding.iter().any(|b| *b != 0) {
            return Err(AltError::MalformedAccount(format!(
                "nonzero padding bytes {:?} at offset {}",
                padding, PADDING_OFFSET
            )));
        }

        let serialized = &data[LOOKUP_TABLE_META_SIZE..];
        if serialized.len() % PUBKEY_BYTES != 0 {
            return Err(AltError::MalformedAccount(format!(
                "serialized addresses are not a multiple of {} bytes, {} bytes remaining",
                PUBKEY_BYTES,
                serialized.len() % PUBKEY_BYTES
            )));
        }

        let count = serialized.len() / PUBKEY_BYTES;
        if count > LOOKUP_TABLE_MAX_ADDRESSES {
            return Err(AltError::MalformedAccount(format!(
                "max addresses exceeded ({} > {})",
                count, LOOKUP_TABLE_MAX_ADDRESSES
            )));
        }

        let addresses = serialized
            .chunks_exact(PUBKEY_BYTES)
            .map(|chunk| Pubkey::new_from_array(read_array(chunk, 0)))
            .collect();

        Ok(Self {
            type_index,
            deactivation_slot,
            last_extended_slot,
            last_extended_slot_start_index,
            authority,
            addresses,
        })
    }

    /// Decode raw account data and require an initialized lookup table
    pub fn decode_initialized(data: &[u8]) -> AltResult<Self> {
        let state = Self::decode(data)?;
        if !state.is_initialized() {
            return Err(AltError::MalformedAccount(format!(
                "unexpected account type index {}",
                state.type_index
            )));
        }
        Ok(state)
    }

    /// Encode back into raw account data
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_size());
        out.extend_from_slice(&self.type_index.to_le_bytes());
        out.extend_from_slice(&self.deactivation_slot.to_le_bytes());
        out.extend_from_slice(&self.last_extended_slot.to_le_bytes());
        out.push(self.last_extended_slot_start_index);
        match &self.authority {
            Some(authority) => {
                out.push(1);
                out.extend_from_slice(authority.as_ref());
            }
            None => {
                out.push(0);
                out.extend_from_slice(&[0u8; PUBKEY_BYTES]);
            }
        }
        out.extend_from_slice(&[0u8; PADDING_SIZE]);
        for address in &self.addresses {
            out.extend_from_slice(address.as_ref());
        }
        out
    }

    /// Size of the encoded account data
    pub fn serialized_size(&self) -> usize {
        LOOKUP_TABLE_META_SIZE + self.addresses.len() * PUBKEY_BYTES
    }

    /// True while the table has not been deactivated
    pub fn is_active(&self) -> bool {
        self.deactivation_slot == ACTIVE_DEACTIVATION_SLOT
    }

    pub fn is_initialized(&self) -> bool {
        self.type_index == account_type::LOOKUP_TABLE
    }

    /// Frozen tables have no authority and can never change again
    pub fn is_frozen(&self) -> bool {
        self.authority.is_none()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Address stored at `index`
    pub fn get(&self, index: u8) -> Option<&Pubkey> {
        self.addresses.get(index as usize)
    }
}

/// Copy `N` bytes starting at `offset`; callers check the length beforehand.
fn read_array<const N: usize>(data: &[u8], offset: usize) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&data[offset..offset + N]);
    buf
}

/// A decoded table together with its own address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedLookupTable {
    pub key: Pubkey,
    pub state: LookupTableState,
}

impl KeyedLookupTable {
    pub fn new(key: Pubkey, state: LookupTableState) -> Self {
        Self { key, state }
    }

    /// Decode account data fetched from `key`
    pub fn decode(key: Pubkey, data: &[u8]) -> AltResult<Self> {
        Ok(Self::new(key, LookupTableState::decode(data)?))
    }
}

impl From<KeyedLookupTable> for AddressLookupTableAccount {
    fn from(table: KeyedLookupTable) -> Self {
        AddressLookupTableAccount {
            key: table.key,
            addresses: table.state.addresses,
        }
    }
}

/// JSON view of a lookup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiLookupTable {
    pub deactivation_slot: String,
    pub last_extended_slot: String,
    pub last_extended_slot_start_index: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    pub addresses: Vec<String>,
}

impl From<&LookupTableState> for UiLookupTable {
    fn from(state: &LookupTableState) -> Self {
        Self {
            deactivation_slot: state.deactivation_slot.to_string(),
            last_extended_slot: state.last_extended_slot.to_string(),
            last_extended_slot_start_index: state.last_extended_slot_start_index,
            authority: state.authority.map(|authority| authority.to_string()),
            addresses: state.addresses.iter().map(|a| a.to_string()).collect(),
        }
    }
}
