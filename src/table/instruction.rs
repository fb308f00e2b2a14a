//! Address Lookup Table program instructions
//!
//! Instruction data is the bincode encoding of [`LookupTableInstruction`]:
//! a little-endian u32 variant tag followed by the variant's fields.

use crate::error::{AltError, AltResult};
use bincode1::Options;
use serde::{Deserialize, Serialize};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::packet::PACKET_DATA_SIZE;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

/// Lookup table program instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupTableInstruction {
    /// Create a table at the address derived from the authority and a recent slot
    CreateLookupTable { recent_slot: u64, bump_seed: u8 },
    /// Permanently remove the authority
    FreezeLookupTable,
    /// Append addresses
    ExtendLookupTable { new_addresses: Vec<Pubkey> },
    /// Start the cool-down that ends in the table being closable
    DeactivateLookupTable,
    /// Reclaim the lamports of a deactivated table
    CloseLookupTable,
}

impl LookupTableInstruction {
    pub const CREATE_TAG: u32 = 0;
    pub const FREEZE_TAG: u32 = 1;
    pub const EXTEND_TAG: u32 = 2;
    pub const DEACTIVATE_TAG: u32 = 3;
    pub const CLOSE_TAG: u32 = 4;

    pub fn tag(&self) -> u32 {
        match self {
            Self::CreateLookupTable { .. } => Self::CREATE_TAG,
            Self::FreezeLookupTable => Self::FREEZE_TAG,
            Self::ExtendLookupTable { .. } => Self::EXTEND_TAG,
            Self::DeactivateLookupTable => Self::DEACTIVATE_TAG,
            Self::CloseLookupTable => Self::CLOSE_TAG,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateLookupTable { .. } => "CreateLookupTable",
            Self::FreezeLookupTable => "FreezeLookupTable",
            Self::ExtendLookupTable { .. } => "ExtendLookupTable",
            Self::DeactivateLookupTable => "DeactivateLookupTable",
            Self::CloseLookupTable => "CloseLookupTable",
        }
    }

    /// Serialize into instruction data
    pub fn pack(&self) -> AltResult<Vec<u8>> {
        bincode1::serialize(self).map_err(|e| AltError::Serialization(e.to_string()))
    }

    /// Deserialize instruction data; the whole buffer must be consumed
    pub fn unpack(data: &[u8]) -> AltResult<Self> {
        // A length prefix can never claim more bytes than a packet carries.
        bincode1::DefaultOptions::new()
            .with_fixint_encoding()
            .with_limit(PACKET_DATA_SIZE as u64)
            .reject_trailing_bytes()
            .deserialize(data)
            .map_err(|e| AltError::InvalidInstruction(e.to_string()))
    }
}

/// Instruction builder bound to a lookup table program id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTableProgram {
    program_id: Pubkey,
}

impl LookupTableProgram {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Derive the table address and bump seed for an authority and recent slot
    pub fn derive_lookup_table_address(&self, authority: &Pubkey, recent_slot: u64) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[authority.as_ref(), &recent_slot.to_le_bytes()],
            &self.program_id,
        )
    }

    /// Build a create instruction, returning it with the new table's address
    pub fn create_lookup_table(
        &self,
        authority: Pubkey,
        payer: Pubkey,
        recent_slot: u64,
    ) -> (Instruction, Pubkey) {
        let (table, bump_seed) = self.derive_lookup_table_address(&authority, recent_slot);
        let instruction = self.build(
            LookupTableInstruction::CreateLookupTable {
                recent_slot,
                bump_seed,
            },
            vec![
                AccountMeta::new(table, false),
                AccountMeta::new_readonly(authority, true),
                AccountMeta::new(payer, true),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
        );
        (instruction, table)
    }

    pub fn freeze_lookup_table(&self, table: Pubkey, authority: Pubkey) -> Instruction {
        self.build(
            LookupTableInstruction::FreezeLookupTable,
            vec![
                AccountMeta::new(table, false),
                AccountMeta::new_readonly(authority, true),
            ],
        )
    }

    /// Build an extend instruction; a payer is only needed when the table must grow its rent
    pub fn extend_lookup_table(
        &self,
        table: Pubkey,
        authority: Pubkey,
        payer: Option<Pubkey>,
        new_addresses: Vec<Pubkey>,
    ) -> Instruction {
        let mut accounts = vec![
            AccountMeta::new(table, false),
            AccountMeta::new_readonly(authority, true),
        ];
        if let Some(payer) = payer {
            accounts.push(AccountMeta::new(payer, true));
            accounts.push(AccountMeta::new_readonly(system_program::id(), false));
        }
        self.build(
            LookupTableInstruction::ExtendLookupTable { new_addresses },
            accounts,
        )
    }

    pub fn deactivate_lookup_table(&self, table: Pubkey, authority: Pubkey) -> Instruction {
        self.build(
            LookupTableInstruction::DeactivateLookupTable,
            vec![
                AccountMeta::new(table, false),
                AccountMeta::new_readonly(authority, true),
            ],
        )
    }

    pub fn close_lookup_table(
        &self,
        table: Pubkey,
        authority: Pubkey,
        recipient: Pubkey,
    ) -> Instruction {
        self.build(
            LookupTableInstruction::CloseLookupTable,
            vec![
                AccountMeta::new(table, false),
                AccountMeta::new_readonly(authority, true),
                AccountMeta::new(recipient, false),
            ],
        )
    }

    /// Decode an instruction addressed to this program
    pub fn decode_instruction(&self, instruction: &Instruction) -> AltResult<LookupTableInstruction> {
        if instruction.program_id != self.program_id {
            return Err(AltError::ProgramMismatch {
                expected: self.program_id,
                actual: instruction.program_id,
            });
        }
        LookupTableInstruction::unpack(&instruction.data)
    }

    fn build(&self, instruction: LookupTableInstruction, accounts: Vec<AccountMeta>) -> Instruction {
        Instruction::new_with_bincode(self.program_id, &instruction, accounts)
    }
}
