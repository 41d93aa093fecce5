use super::error::DecodeError;
use super::layout;
use super::reader::PayloadReader;
use crate::PayloadHeader;

/// Fields carried by the metadata byte. Bits 6-7 are reserved and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub version: u8,
    pub shared_presence_mask: bool,
}

pub fn parse_metadata(byte: u8) -> Metadata {
    Metadata {
        version: byte & layout::VERSION_BITS,
        shared_presence_mask: byte & layout::SHARED_PRESENCE_MASK_BIT != 0,
    }
}

/// Decode and validate the two-byte payload header.
pub fn parse_header(reader: &PayloadReader<'_>) -> Result<PayloadHeader, DecodeError> {
    if reader.len() < layout::HEADER_LEN {
        return Err(DecodeError::MalformedHeader {
            needed: layout::HEADER_LEN,
            actual: reader.len(),
        });
    }

    let metadata = parse_metadata(reader.read_u8(layout::METADATA_OFFSET)?);
    if metadata.version != layout::SUPPORTED_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            version: metadata.version,
        });
    }
    let interval_minutes = reader.read_u8(layout::INTERVAL_OFFSET)?;

    Ok(PayloadHeader {
        version: metadata.version,
        shared_presence_mask: metadata.shared_presence_mask,
        interval_minutes,
    })
}
