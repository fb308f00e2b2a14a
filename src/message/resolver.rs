//! Versioned message lookup resolution
//!
//! Expands the address table lookups of a v0 message into the full account
//! key list that instruction indexes refer to:
//!
//! `static keys ++ writable keys of every table ++ readonly keys of every table`
//!
//! Tables are walked in the order the message lists them and indexes in the
//! order each descriptor lists them. Any unknown table or out-of-range index
//! fails the whole resolution.

use super::lookups::LookupsExt;
use crate::error::{AltError, AltResult};
use crate::table::LookupTableState;
use solana_sdk::address_lookup_table::AddressLookupTableAccount;
use solana_sdk::instruction::{AccountMeta, CompiledInstruction, Instruction};
use solana_sdk::message::v0::{self, MessageAddressTableLookup};
use solana_sdk::message::MessageHeader;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

/// Read-only source of already fetched table contents
pub trait TableProvider {
    /// Addresses stored in the table at `table`, if known
    fn addresses(&self, table: &Pubkey) -> Option<&[Pubkey]>;
}

impl TableProvider for HashMap<Pubkey, Vec<Pubkey>> {
    fn addresses(&self, table: &Pubkey) -> Option<&[Pubkey]> {
        self.get(table).map(Vec::as_slice)
    }
}

impl TableProvider for HashMap<Pubkey, LookupTableState> {
    fn addresses(&self, table: &Pubkey) -> Option<&[Pubkey]> {
        self.get(table).map(|state| state.addresses.as_slice())
    }
}

impl TableProvider for [AddressLookupTableAccount] {
    fn addresses(&self, table: &Pubkey) -> Option<&[Pubkey]> {
        self.iter()
            .find(|account| account.key == *table)
            .map(|account| account.addresses.as_slice())
    }
}

/// Ordered account keys of a message with its lookups expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKeySet {
    keys: Vec<Pubkey>,
    header: MessageHeader,
    static_count: usize,
    writable_lookup_count: usize,
}

impl ResolvedKeySet {
    /// Key set of a message without lookups
    pub fn from_static(header: MessageHeader, static_keys: Vec<Pubkey>) -> Self {
        let static_count = static_keys.len();
        Self {
            keys: static_keys,
            header,
            static_count,
            writable_lookup_count: 0,
        }
    }

    pub fn keys(&self) -> &[Pubkey] {
        &self.keys
    }

    pub fn into_keys(self) -> Vec<Pubkey> {
        self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn static_count(&self) -> usize {
        self.static_count
    }

    pub fn writable_lookup_count(&self) -> usize {
        self.writable_lookup_count
    }

    pub fn readonly_lookup_count(&self) -> usize {
        self.keys.len() - self.static_count - self.writable_lookup_count
    }

    pub fn signer_count(&self) -> usize {
        (self.header.num_required_signatures as usize).min(self.static_count)
    }

    /// Writable static keys plus writable lookup keys
    pub fn writable_count(&self) -> usize {
        let signed = self.signer_count();
        let writable_signed =
            signed.saturating_sub(self.header.num_readonly_signed_accounts as usize);
        let writable_unsigned = self
            .static_count
            .saturating_sub(signed)
            .saturating_sub(self.header.num_readonly_unsigned_accounts as usize);
        writable_signed + writable_unsigned + self.writable_lookup_count
    }

    /// Key at a position in the resolved list
    pub fn account(&self, index: usize) -> AltResult<Pubkey> {
        self.keys.get(index).copied().ok_or_else(|| {
            AltError::AccountNotFound(format!(
                "index {} out of range for {} account keys",
                index,
                self.keys.len()
            ))
        })
    }

    /// First position of `key` in the resolved list
    pub fn position(&self, key: &Pubkey) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    pub fn has_account(&self, key: &Pubkey) -> bool {
        self.position(key).is_some()
    }

    pub fn is_signer_index(&self, index: usize) -> bool {
        index < self.signer_count()
    }

    pub fn is_writable_index(&self, index: usize) -> bool {
        if index < self.static_count {
            let signed = self.signer_count();
            let ro_signed = self.header.num_readonly_signed_accounts as usize;
            let ro_unsigned = self.header.num_readonly_unsigned_accounts as usize;
            index < signed.saturating_sub(ro_signed)
                || (index >= signed && index < self.static_count.saturating_sub(ro_unsigned))
        } else {
            index < self.static_count + self.writable_lookup_count
        }
    }

    pub fn is_signer(&self, key: &Pubkey) -> bool {
        self.position(key)
            .map(|index| self.is_signer_index(index))
            .unwrap_or(false)
    }

    pub fn is_writable(&self, key: &Pubkey) -> AltResult<bool> {
        self.position(key)
            .map(|index| self.is_writable_index(index))
            .ok_or_else(|| AltError::AccountNotFound(key.to_string()))
    }

    pub fn signers(&self) -> Vec<Pubkey> {
        self.keys[..self.signer_count()].to_vec()
    }

    pub fn writable_keys(&self) -> Vec<Pubkey> {
        self.filter_keys(|index| self.is_writable_index(index))
    }

    pub fn readonly_keys(&self) -> Vec<Pubkey> {
        self.filter_keys(|index| !self.is_writable_index(index))
    }

    /// Account meta for every key, in resolved order
    pub fn account_metas(&self) -> Vec<AccountMeta> {
        (0..self.keys.len()).map(|index| self.meta_at(index)).collect()
    }

    /// Turn an index-based instruction into one carrying concrete account metas
    pub fn resolve_instruction(&self, instruction: &CompiledInstruction) -> AltResult<Instruction> {
        let program_id = self.account(instruction.program_id_index as usize)?;
        let accounts = instruction
            .accounts
            .iter()
            .map(|&index| {
                let index = index as usize;
                self.account(index).map(|_| self.meta_at(index))
            })
            .collect::<AltResult<Vec<_>>>()?;

        Ok(Instruction {
            program_id,
            accounts,
            data: instruction.data.clone(),
        })
    }

    fn meta_at(&self, index: usize) -> AccountMeta {
        AccountMeta {
            pubkey: self.keys[index],
            is_signer: self.is_signer_index(index),
            is_writable: self.is_writable_index(index),
        }
    }

    fn filter_keys(&self, keep: impl Fn(usize) -> bool) -> Vec<Pubkey> {
        self.keys
            .iter()
            .enumerate()
            .filter(|(index, _)| keep(*index))
            .map(|(_, key)| *key)
            .collect()
    }
}

/// Resolve every lookup of `message` against `tables`
///
/// `message.account_keys` must hold only the static keys, which is always the
/// case for a message decoded from the wire.
pub fn resolve_lookups<P>(message: &v0::Message, tables: &P) -> AltResult<ResolvedKeySet>
where
    P: TableProvider + ?Sized,
{
    resolve_parts(
        message.header,
        &message.account_keys,
        &message.address_table_lookups,
        tables,
    )
}

pub(crate) fn resolve_parts<P>(
    header: MessageHeader,
    static_keys: &[Pubkey],
    lookups: &[MessageAddressTableLookup],
    tables: &P,
) -> AltResult<ResolvedKeySet>
where
    P: TableProvider + ?Sized,
{
    lookups.validate()?;

    let mut writable = Vec::with_capacity(lookups.num_writable_lookups());
    let mut readonly = Vec::with_capacity(lookups.num_readonly_lookups());

    for lookup in lookups {
        let addresses = tables
            .addresses(&lookup.account_key)
            .ok_or(AltError::TableNotFound(lookup.account_key))?;

        collect_indexes(&lookup.account_key, addresses, &lookup.writable_indexes, &mut writable)?;
        collect_indexes(&lookup.account_key, addresses, &lookup.readonly_indexes, &mut readonly)?;
    }

    tracing::debug!(
        static_keys = static_keys.len(),
        writable = writable.len(),
        readonly = readonly.len(),
        tables = lookups.len(),
        "Resolved address table lookups"
    );

    let writable_lookup_count = writable.len();
    let mut keys = Vec::with_capacity(static_keys.len() + writable.len() + readonly.len());
    keys.extend_from_slice(static_keys);
    keys.append(&mut writable);
    keys.append(&mut readonly);

    Ok(ResolvedKeySet {
        keys,
        header,
        static_count: static_keys.len(),
        writable_lookup_count,
    })
}

fn collect_indexes(
    table: &Pubkey,
    addresses: &[Pubkey],
    indexes: &[u8],
    out: &mut Vec<Pubkey>,
) -> AltResult<()> {
    for &index in indexes {
        let address = addresses
            .get(index as usize)
            .ok_or(AltError::IndexOutOfRange {
                table: *table,
                index,
                len: addresses.len(),
            })?;
        out.push(*address);
    }
    Ok(())
}
