//! Counting and validation over address table lookup descriptors
//!
//! These operate on the descriptors embedded in the message, never on the
//! resolved key list, so they give the same answers before and after
//! resolution.

use crate::error::{AltError, AltResult};
use solana_sdk::message::v0::MessageAddressTableLookup;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashSet;

pub trait LookupsExt {
    /// Total number of indexes, writable plus readonly
    fn num_lookups(&self) -> usize;

    fn num_writable_lookups(&self) -> usize;

    fn num_readonly_lookups(&self) -> usize;

    /// Referenced table addresses in descriptor order, without repeats
    fn table_ids(&self) -> Vec<Pubkey>;

    /// Reject a descriptor that lists an index as both writable and readonly
    fn validate(&self) -> AltResult<()>;
}

impl LookupsExt for [MessageAddressTableLookup] {
    fn num_lookups(&self) -> usize {
        self.num_writable_lookups() + self.num_readonly_lookups()
    }

    fn num_writable_lookups(&self) -> usize {
        self.iter().map(|lookup| lookup.writable_indexes.len()).sum()
    }

    fn num_readonly_lookups(&self) -> usize {
        self.iter().map(|lookup| lookup.readonly_indexes.len()).sum()
    }

    fn table_ids(&self) -> Vec<Pubkey> {
        let mut seen = HashSet::new();
        self.iter()
            .map(|lookup| lookup.account_key)
            .filter(|key| seen.insert(*key))
            .collect()
    }

    fn validate(&self) -> AltResult<()> {
        for lookup in self {
            let writable: HashSet<u8> = lookup.writable_indexes.iter().copied().collect();
            if let Some(index) = lookup
                .readonly_indexes
                .iter()
                .find(|index| writable.contains(index))
            {
                return Err(AltError::DuplicateIndex {
                    table: lookup.account_key,
                    index: *index,
                });
            }
        }
        Ok(())
    }
}
