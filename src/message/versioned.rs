//! V0 message with attachable lookup tables
//!
//! Wraps a `v0::Message` the way it arrives off the wire, lets the caller
//! attach fetched table contents, and answers account queries over the
//! expanded key list. The wrapped message itself is never modified, so
//! serializing it gives the original bytes whether or not the lookups
//! have been resolved.

use super::lookups::LookupsExt;
use super::resolver::{resolve_parts, ResolvedKeySet};
use crate::error::{AltError, AltResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use solana_sdk::instruction::{AccountMeta, CompiledInstruction, Instruction};
use solana_sdk::message::{v0, MessageHeader, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use std::borrow::Cow;
use std::collections::HashMap;

/// Decode a transaction in Solana wire format
pub fn decode_transaction(bytes: &[u8]) -> AltResult<VersionedTransaction> {
    // bincode 1.x matches the Solana wire format
    bincode1::deserialize(bytes)
        .map_err(|e| AltError::Serialization(format!("Failed to decode transaction: {}", e)))
}

/// Decode a base64 encoded transaction
pub fn decode_base64_transaction(encoded: &str) -> AltResult<VersionedTransaction> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| AltError::Serialization(format!("Invalid base64 transaction: {}", e)))?;
    decode_transaction(&bytes)
}

/// Encode a transaction into Solana wire format
pub fn encode_transaction(transaction: &VersionedTransaction) -> AltResult<Vec<u8>> {
    bincode1::serialize(transaction)
        .map_err(|e| AltError::Serialization(format!("Failed to encode transaction: {}", e)))
}

#[derive(Debug, Clone)]
pub struct LookupMessage {
    message: v0::Message,
    address_tables: HashMap<Pubkey, Vec<Pubkey>>,
    resolved: Option<ResolvedKeySet>,
}

impl LookupMessage {
    pub fn from_v0(message: v0::Message) -> Self {
        Self {
            message,
            address_tables: HashMap::new(),
            resolved: None,
        }
    }

    /// Only v0 messages carry lookups; legacy messages are rejected
    pub fn from_versioned(message: VersionedMessage) -> AltResult<Self> {
        match message {
            VersionedMessage::V0(message) => Ok(Self::from_v0(message)),
            VersionedMessage::Legacy(_) => Err(AltError::UnsupportedMessage(
                "legacy message has no address table lookups".to_string(),
            )),
        }
    }

    pub fn from_transaction(transaction: &VersionedTransaction) -> AltResult<Self> {
        Self::from_versioned(transaction.message.clone())
    }

    pub fn from_transaction_bytes(bytes: &[u8]) -> AltResult<Self> {
        Self::from_transaction(&decode_transaction(bytes)?)
    }

    pub fn from_base64_transaction(encoded: &str) -> AltResult<Self> {
        Self::from_transaction(&decode_base64_transaction(encoded)?)
    }

    /// The message as decoded, static keys only
    pub fn message(&self) -> &v0::Message {
        &self.message
    }

    pub fn header(&self) -> &MessageHeader {
        &self.message.header
    }

    pub fn static_account_keys(&self) -> &[Pubkey] {
        &self.message.account_keys
    }

    pub fn address_table_lookups(&self) -> &[v0::MessageAddressTableLookup] {
        &self.message.address_table_lookups
    }

    pub fn instructions(&self) -> &[CompiledInstruction] {
        &self.message.instructions
    }

    /// Addresses of every table the message references
    pub fn table_ids(&self) -> Vec<Pubkey> {
        self.message.address_table_lookups.table_ids()
    }

    pub fn num_lookups(&self) -> usize {
        self.message.address_table_lookups.num_lookups()
    }

    pub fn num_writable_lookups(&self) -> usize {
        self.message.address_table_lookups.num_writable_lookups()
    }

    /// Attach fetched table contents, keyed by table address
    ///
    /// Any earlier resolution is dropped; call `resolve_lookups` again to
    /// expand against the new tables.
    pub fn set_address_tables(&mut self, tables: HashMap<Pubkey, Vec<Pubkey>>) {
        self.address_tables = tables;
        self.resolved = None;
    }

    pub fn address_tables(&self) -> &HashMap<Pubkey, Vec<Pubkey>> {
        &self.address_tables
    }

    /// Current key list: static keys, followed by the lookup keys once resolved
    pub fn account_keys(&self) -> &[Pubkey] {
        match &self.resolved {
            Some(resolved) => resolved.keys(),
            None => &self.message.account_keys,
        }
    }

    /// True once the key list holds every static and lookup key
    pub fn is_resolved(&self) -> bool {
        self.account_keys().len() == self.message.account_keys.len() + self.num_lookups()
    }

    /// Expand the lookups into the key list using the attached tables
    ///
    /// Calling this again on a resolved message leaves it untouched.
    pub fn resolve_lookups(&mut self) -> AltResult<()> {
        if self.is_resolved() {
            tracing::trace!(keys = self.account_keys().len(), "Message already resolved");
            return Ok(());
        }

        let resolved = resolve_parts(
            self.message.header,
            &self.message.account_keys,
            &self.message.address_table_lookups,
            &self.address_tables,
        )?;
        self.resolved = Some(resolved);
        Ok(())
    }

    /// Expanded key set, resolving from the attached tables when needed
    pub fn key_set(&self) -> AltResult<Cow<'_, ResolvedKeySet>> {
        if let Some(resolved) = &self.resolved {
            return Ok(Cow::Borrowed(resolved));
        }
        if self.message.address_table_lookups.is_empty() {
            return Ok(Cow::Owned(ResolvedKeySet::from_static(
                self.message.header,
                self.message.account_keys.clone(),
            )));
        }
        resolve_parts(
            self.message.header,
            &self.message.account_keys,
            &self.message.address_table_lookups,
            &self.address_tables,
        )
        .map(Cow::Owned)
    }

    /// All account keys in resolved order
    pub fn get_all_keys(&self) -> AltResult<Vec<Pubkey>> {
        Ok(self.key_set()?.keys().to_vec())
    }

    /// Key at a position in the resolved order; static positions never need the tables
    pub fn account(&self, index: usize) -> AltResult<Pubkey> {
        match self.message.account_keys.get(index) {
            Some(key) => Ok(*key),
            None => self.key_set()?.account(index),
        }
    }

    /// Program id an instruction's `program_id_index` refers to
    pub fn program(&self, program_id_index: u8) -> AltResult<Pubkey> {
        self.account(program_id_index as usize)
    }

    pub fn resolve_program_id_index(&self, program_id_index: u8) -> AltResult<Pubkey> {
        self.program(program_id_index)
    }

    pub fn has_account(&self, key: &Pubkey) -> AltResult<bool> {
        Ok(self.key_set()?.has_account(key))
    }

    /// Signers are always static keys, so this never needs the tables
    pub fn is_signer(&self, key: &Pubkey) -> bool {
        let signers = (self.message.header.num_required_signatures as usize)
            .min(self.message.account_keys.len());
        self.message.account_keys[..signers].contains(key)
    }

    pub fn is_writable(&self, key: &Pubkey) -> AltResult<bool> {
        self.key_set()?.is_writable(key)
    }

    pub fn signers(&self) -> Vec<Pubkey> {
        let signers = (self.message.header.num_required_signatures as usize)
            .min(self.message.account_keys.len());
        self.message.account_keys[..signers].to_vec()
    }

    pub fn writable(&self) -> AltResult<Vec<Pubkey>> {
        Ok(self.key_set()?.writable_keys())
    }

    pub fn account_meta_list(&self) -> AltResult<Vec<AccountMeta>> {
        Ok(self.key_set()?.account_metas())
    }

    /// Every instruction with its account indexes replaced by account metas
    pub fn resolved_instructions(&self) -> AltResult<Vec<Instruction>> {
        let key_set = self.key_set()?;
        self.message
            .instructions
            .iter()
            .map(|ix| key_set.resolve_instruction(ix))
            .collect()
    }

    /// Wire encoding of the message (version prefix included)
    pub fn serialize(&self) -> AltResult<Vec<u8>> {
        bincode1::serialize(&VersionedMessage::V0(self.message.clone()))
            .map_err(|e| AltError::Serialization(format!("Failed to encode message: {}", e)))
    }

    /// Rebuild a transaction around this message
    pub fn to_transaction(&self, signatures: Vec<Signature>) -> VersionedTransaction {
        VersionedTransaction {
            signatures,
            message: VersionedMessage::V0(self.message.clone()),
        }
    }

    pub fn to_base64(&self) -> AltResult<String> {
        Ok(STANDARD.encode(self.serialize()?))
    }
}
