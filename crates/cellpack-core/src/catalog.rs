//! Static sensor field catalog.
//!
//! Maps a presence-mask bit (the flag ordinal) to the field's name, wire type
//! and scale divisor. The table is a `const` array indexed by ordinal, so a
//! lookup is a bounds check and an index. Ordering is checked at compile time.

use std::fmt;

use serde::{Serialize, Serializer};

/// Highest flag ordinal with a catalog entry.
pub const FLAG_MAX: u8 = 29;

/// Width of a presence mask in bits.
pub const MASK_BITS: u8 = 64;

/// Fixed-width encoding of a field value on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireType {
    Int8,
    Uint16,
    Int16,
    Uint32,
}

impl WireType {
    /// Number of bytes occupied on the wire.
    pub const fn width(self) -> usize {
        match self {
            WireType::Int8 => 1,
            WireType::Uint16 | WireType::Int16 => 2,
            WireType::Uint32 => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            WireType::Int8 => "int8",
            WireType::Uint16 => "uint16",
            WireType::Int16 => "int16",
            WireType::Uint32 => "uint32",
        }
    }
}

/// Closed set of sensor fields, in flag-ordinal order.
///
/// The discriminant is the presence-mask bit. `Ord` follows the ordinal, so
/// ordered collections keyed by `SensorFlag` iterate in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SensorFlag {
    Temperature = 0,
    Humidity = 1,
    Co2 = 2,
    Tvoc = 3,
    TvocRaw = 4,
    Nox = 5,
    NoxRaw = 6,
    Pm01 = 7,
    Pm25Ch1 = 8,
    Pm25Ch2 = 9,
    Pm10 = 10,
    Pm01Sp = 11,
    Pm25SpCh1 = 12,
    Pm25SpCh2 = 13,
    Pm10Sp = 14,
    Pm03PcCh1 = 15,
    Pm03PcCh2 = 16,
    Pm05Pc = 17,
    Pm01Pc = 18,
    Pm25Pc = 19,
    Pm5Pc = 20,
    Pm10Pc = 21,
    Vbat = 22,
    Vpanel = 23,
    O3We = 24,
    O3Ae = 25,
    No2We = 26,
    No2Ae = 27,
    AfeTemp = 28,
    Signal = 29,
}

impl SensorFlag {
    /// Presence-mask bit for this field.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<SensorFlag> {
        descriptor_for(ordinal).map(|descriptor| descriptor.flag)
    }

    pub fn descriptor(self) -> &'static FieldDescriptor {
        &CATALOG[self as usize]
    }

    /// Field name as rendered in decoded output.
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl fmt::Display for SensorFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SensorFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Catalog entry for one sensor field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    pub flag: SensorFlag,
    pub name: &'static str,
    pub wire_type: WireType,
    /// Divisor turning the raw wire integer into a value in display units.
    pub scale: f64,
}

impl FieldDescriptor {
    pub const fn ordinal(&self) -> u8 {
        self.flag as u8
    }

    pub const fn width(&self) -> usize {
        self.wire_type.width()
    }

    pub fn scaled(&self, raw: i64) -> f64 {
        raw as f64 / self.scale
    }
}

const fn field(
    flag: SensorFlag,
    name: &'static str,
    wire_type: WireType,
    scale: f64,
) -> FieldDescriptor {
    FieldDescriptor {
        flag,
        name,
        wire_type,
        scale,
    }
}

const ENTRIES: [FieldDescriptor; FLAG_MAX as usize + 1] = [
    field(SensorFlag::Temperature, "temperature", WireType::Int16, 100.0),
    field(SensorFlag::Humidity, "humidity", WireType::Uint16, 100.0),
    field(SensorFlag::Co2, "co2", WireType::Uint16, 1.0),
    field(SensorFlag::Tvoc, "tvoc", WireType::Uint16, 1.0),
    field(SensorFlag::TvocRaw, "tvoc_raw", WireType::Uint16, 1.0),
    field(SensorFlag::Nox, "nox", WireType::Uint16, 1.0),
    field(SensorFlag::NoxRaw, "nox_raw", WireType::Uint16, 1.0),
    field(SensorFlag::Pm01, "pm01", WireType::Uint16, 10.0),
    field(SensorFlag::Pm25Ch1, "pm25_ch1", WireType::Uint16, 10.0),
    field(SensorFlag::Pm25Ch2, "pm25_ch2", WireType::Uint16, 10.0),
    field(SensorFlag::Pm10, "pm10", WireType::Uint16, 10.0),
    field(SensorFlag::Pm01Sp, "pm01_sp", WireType::Uint16, 10.0),
    field(SensorFlag::Pm25SpCh1, "pm25_sp_ch1", WireType::Uint16, 10.0),
    field(SensorFlag::Pm25SpCh2, "pm25_sp_ch2", WireType::Uint16, 10.0),
    field(SensorFlag::Pm10Sp, "pm10_sp", WireType::Uint16, 10.0),
    field(SensorFlag::Pm03PcCh1, "pm03_pc_ch1", WireType::Uint16, 1.0),
    field(SensorFlag::Pm03PcCh2, "pm03_pc_ch2", WireType::Uint16, 1.0),
    field(SensorFlag::Pm05Pc, "pm05_pc", WireType::Uint16, 1.0),
    field(SensorFlag::Pm01Pc, "pm01_pc", WireType::Uint16, 1.0),
    field(SensorFlag::Pm25Pc, "pm25_pc", WireType::Uint16, 1.0),
    field(SensorFlag::Pm5Pc, "pm5_pc", WireType::Uint16, 1.0),
    field(SensorFlag::Pm10Pc, "pm10_pc", WireType::Uint16, 1.0),
    field(SensorFlag::Vbat, "vbat", WireType::Uint16, 1.0),
    field(SensorFlag::Vpanel, "vpanel", WireType::Uint16, 1.0),
    // Only the o3_we scale is confirmed against device output. The other
    // electrode channels assume the same mV/1000 encoding.
    field(SensorFlag::O3We, "o3_we", WireType::Uint32, 1000.0),
    field(SensorFlag::O3Ae, "o3_ae", WireType::Uint32, 1000.0),
    field(SensorFlag::No2We, "no2_we", WireType::Uint32, 1000.0),
    field(SensorFlag::No2Ae, "no2_ae", WireType::Uint32, 1000.0),
    field(SensorFlag::AfeTemp, "afe_temp", WireType::Uint16, 10.0),
    field(SensorFlag::Signal, "signal", WireType::Int8, 1.0),
];

/// Every known field, indexed by flag ordinal.
pub static CATALOG: [FieldDescriptor; FLAG_MAX as usize + 1] = ENTRIES;

const fn catalog_is_indexed_by_ordinal() -> bool {
    let mut index = 0;
    while index < ENTRIES.len() {
        if ENTRIES[index].flag as usize != index {
            return false;
        }
        index += 1;
    }
    true
}

const _: () = assert!(catalog_is_indexed_by_ordinal());

/// Look up the descriptor for a flag ordinal.
///
/// Returns `None` for ordinals the catalog does not define.
pub fn descriptor_for(ordinal: u8) -> Option<&'static FieldDescriptor> {
    CATALOG.get(ordinal as usize)
}

/// All catalog ordinals in ascending order.
pub fn ordinals() -> impl Iterator<Item = u8> {
    0..=FLAG_MAX
}
