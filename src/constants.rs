/// Address Lookup Table account layout
///
/// All integers are little-endian. The metadata header is always 56 bytes,
/// followed by a packed array of 32-byte addresses.
pub mod layout {
    /// Serialized size of the lookup table metadata header
    pub const LOOKUP_TABLE_META_SIZE: usize = 56;
    /// Maximum number of addresses a single table may hold
    pub const LOOKUP_TABLE_MAX_ADDRESSES: usize = 256;
    /// Size of a serialized public key
    pub const PUBKEY_BYTES: usize = 32;

    pub const TYPE_INDEX_OFFSET: usize = 0;
    pub const DEACTIVATION_SLOT_OFFSET: usize = 4;
    pub const LAST_EXTENDED_SLOT_OFFSET: usize = 12;
    pub const LAST_EXTENDED_SLOT_START_INDEX_OFFSET: usize = 20;
    pub const AUTHORITY_OPTION_OFFSET: usize = 21;
    pub const AUTHORITY_OFFSET: usize = 22;
    /// Two reserved bytes, always written as zero
    pub const PADDING_OFFSET: usize = 54;
    pub const PADDING_SIZE: usize = 2;
}

/// Account type discriminants
pub mod account_type {
    /// Uninitialized program account
    pub const UNINITIALIZED: u32 = 0;
    /// Initialized lookup table
    pub const LOOKUP_TABLE: u32 = 1;
}

/// Deactivation slot of a table that was never deactivated
pub const ACTIVE_DEACTIVATION_SLOT: u64 = u64::MAX;

/// Program IDs
pub mod programs {
    /// Address Lookup Table native program
    pub const ADDRESS_LOOKUP_TABLE: &str = "AddressLookupTab1e1111111111111111111111111";
}
