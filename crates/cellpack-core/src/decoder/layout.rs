pub const METADATA_OFFSET: usize = 0;
pub const INTERVAL_OFFSET: usize = 1;
pub const HEADER_LEN: usize = 2;

pub const MASK_LEN: usize = 8;
pub const SHARED_MASK_OFFSET: usize = HEADER_LEN;
pub const SHARED_DATA_OFFSET: usize = SHARED_MASK_OFFSET + MASK_LEN;

pub const VERSION_BITS: u8 = 0x1F;
pub const SHARED_PRESENCE_MASK_BIT: u8 = 0x20;

pub const SUPPORTED_VERSION: u8 = 0;
