use super::error::DecodeError;
use super::layout;
use crate::catalog::WireType;
use crate::mask::PresenceMask;

/// Bounds-checked little-endian access to a payload buffer.
pub struct PayloadReader<'a> {
    payload: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, DecodeError> {
        let [byte] = self.read_array::<1>(offset)?;
        Ok(byte)
    }

    pub fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], DecodeError> {
        offset
            .checked_add(N)
            .and_then(|end| self.payload.get(offset..end))
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(DecodeError::TruncatedReadingData {
                offset,
                needed: N,
                actual: self.payload.len().saturating_sub(offset),
            })
    }

    pub fn read_mask(&self, offset: usize) -> Result<PresenceMask, DecodeError> {
        self.read_array::<{ layout::MASK_LEN }>(offset)
            .map(PresenceMask::from_le_bytes)
    }

    /// Read one field value, sign-extending signed wire types.
    pub fn read_raw(&self, offset: usize, wire_type: WireType) -> Result<i64, DecodeError> {
        let raw = match wire_type {
            WireType::Int8 => i64::from(i8::from_le_bytes(self.read_array(offset)?)),
            WireType::Uint16 => i64::from(u16::from_le_bytes(self.read_array(offset)?)),
            WireType::Int16 => i64::from(i16::from_le_bytes(self.read_array(offset)?)),
            WireType::Uint32 => i64::from(u32::from_le_bytes(self.read_array(offset)?)),
        };
        Ok(raw)
    }
}
