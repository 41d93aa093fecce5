use serde::Serialize;

use crate::catalog::MASK_BITS;

/// 64-bit field presence mask, held as two 32-bit halves.
///
/// Bit `i` set means the field with flag ordinal `i` is present. On the wire
/// the mask is 8 bytes: `lo` then `hi`, each little-endian.
///
/// # Examples
/// ```
/// use cellpack_core::PresenceMask;
///
/// let mask = PresenceMask::from_le_bytes([0x05, 0, 0, 0, 0, 0, 0, 0]);
/// assert!(mask.is_set(0));
/// assert!(!mask.is_set(1));
/// assert!(mask.is_set(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct PresenceMask {
    /// Bits 0..=31.
    pub lo: u32,
    /// Bits 32..=63.
    pub hi: u32,
}

impl PresenceMask {
    pub const EMPTY: PresenceMask = PresenceMask { lo: 0, hi: 0 };

    pub const fn new(lo: u32, hi: u32) -> Self {
        Self { lo, hi }
    }

    pub const fn from_bits(bits: u64) -> Self {
        Self {
            lo: bits as u32,
            hi: (bits >> 32) as u32,
        }
    }

    pub const fn from_le_bytes(bytes: [u8; 8]) -> Self {
        Self {
            lo: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            hi: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    pub const fn to_le_bytes(self) -> [u8; 8] {
        let lo = self.lo.to_le_bytes();
        let hi = self.hi.to_le_bytes();
        [lo[0], lo[1], lo[2], lo[3], hi[0], hi[1], hi[2], hi[3]]
    }

    pub const fn bits(self) -> u64 {
        (self.hi as u64) << 32 | self.lo as u64
    }

    /// Test a single bit. `bit` must be below 64.
    pub const fn is_set(self, bit: u8) -> bool {
        debug_assert!(bit < MASK_BITS);
        if bit < 32 {
            (self.lo >> bit) & 1 != 0
        } else {
            (self.hi >> (bit - 32)) & 1 != 0
        }
    }

    pub const fn is_empty(self) -> bool {
        self.lo == 0 && self.hi == 0
    }

    pub const fn count(self) -> u32 {
        self.lo.count_ones() + self.hi.count_ones()
    }

    /// Set bit ordinals in ascending order.
    pub fn set_bits(self) -> impl Iterator<Item = u8> {
        (0..MASK_BITS).filter(move |&bit| self.is_set(bit))
    }
}

impl From<u64> for PresenceMask {
    fn from(bits: u64) -> Self {
        Self::from_bits(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::PresenceMask;

    #[test]
    fn reads_little_endian_halves() {
        let mask = PresenceMask::from_le_bytes([0x78, 0x56, 0x34, 0x12, 0x01, 0x00, 0x00, 0x80]);
        assert_eq!(mask.lo, 0x1234_5678);
        assert_eq!(mask.hi, 0x8000_0001);
        assert_eq!(mask.to_le_bytes()[..4], [0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn tests_bits_in_both_halves() {
        let mask = PresenceMask::from_bits(1 << 0 | 1 << 31 | 1 << 32 | 1 << 63);
        assert!(mask.is_set(0));
        assert!(mask.is_set(31));
        assert!(mask.is_set(32));
        assert!(mask.is_set(63));
        assert!(!mask.is_set(1));
        assert!(!mask.is_set(33));
        assert_eq!(mask.count(), 4);
    }

    #[test]
    fn set_bits_ascend() {
        let mask = PresenceMask::new(0x2000_0300, 0x1);
        let bits: Vec<u8> = mask.set_bits().collect();
        assert_eq!(bits, vec![8, 9, 29, 32]);
    }

    #[test]
    fn empty_mask() {
        assert!(PresenceMask::EMPTY.is_empty());
        assert!(!PresenceMask::from_bits(1 << 40).is_empty());
        assert_eq!(PresenceMask::EMPTY.set_bits().count(), 0);
    }

    #[test]
    fn bits_round_trip() {
        let bits = 0x0123_4567_89ab_cdef;
        assert_eq!(PresenceMask::from(bits).bits(), bits);
    }
}
