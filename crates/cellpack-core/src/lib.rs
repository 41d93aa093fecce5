//! Cellpack core library for decoding compact cellular telemetry payloads.
//!
//! A payload is a two-byte header followed by one or more readings. Each
//! reading carries a variable subset of sensor fields chosen by a 64-bit
//! presence mask, packed back to back in ascending flag order with no
//! padding. The header selects between one mask shared by a whole batch and
//! one mask per reading.
//!
//! The decoder is a pure function of its input buffer: no I/O, no shared
//! mutable state, and all-or-nothing results. File access is isolated in the
//! `source` module; the field table lives in [`catalog`].
//!
//! Invariants:
//! - Fields are extracted in strictly ascending flag order.
//! - Every set mask bit must have a catalog entry.
//! - In shared-mask mode every reading has the same byte length.
//! - Only payload version 0 is decoded.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use cellpack_core::{PayloadFormat, ValueMode, decode_payload_file};
//!
//! let decoded = decode_payload_file(Path::new("uplink.hex"), PayloadFormat::Auto, ValueMode::Scaled)?;
//! println!("readings: {}", decoded.reading_count);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

pub mod catalog;
mod decoder;
mod mask;
mod source;

pub use catalog::{CATALOG, FLAG_MAX, FieldDescriptor, SensorFlag, WireType, descriptor_for};
pub use decoder::{
    DecodeError, SensorFields, decode_payload, decode_payload_raw, decode_payload_with,
    decode_reading, decode_sensor_data, sensor_data_size,
};
pub use mask::PresenceMask;
pub use source::{
    FileDecodeError, PayloadFormat, SourceError, decode_payload_file, load_payload_file,
    parse_hex_payload,
};

/// Decoded payload header.
///
/// # Examples
/// ```
/// use cellpack_core::decode_payload;
///
/// let decoded = decode_payload(&[0x00, 0x0F])?;
/// assert_eq!(decoded.header.version, 0);
/// assert!(!decoded.header.shared_presence_mask);
/// assert_eq!(decoded.header.interval_minutes, 15);
/// # Ok::<(), cellpack_core::DecodeError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadHeader {
    /// Payload schema version (always 0 once decoded).
    pub version: u8,
    /// Whether one presence mask governs every reading in the batch.
    pub shared_presence_mask: bool,
    /// Sampling interval in minutes.
    pub interval_minutes: u8,
}

/// Value representation requested from the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueMode {
    /// Raw wire value divided by the field scale.
    #[default]
    Scaled,
    /// Raw wire integer, sign-extended where the wire type is signed.
    Raw,
}

/// A single decoded field value.
///
/// Serializes as a bare JSON number. Whole scaled values are written as
/// integers (`400`, not `400.0`) to match existing consumers of the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Raw(i64),
    Scaled(f64),
}

/// Largest magnitude below which every integer is exact in an `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            FieldValue::Raw(raw) => serializer.serialize_i64(raw),
            FieldValue::Scaled(value)
                if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER =>
            {
                serializer.serialize_i64(value as i64)
            }
            FieldValue::Scaled(value) => serializer.serialize_f64(value),
        }
    }
}

impl FieldValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Raw(raw) => raw as f64,
            FieldValue::Scaled(value) => value,
        }
    }

    pub fn as_raw(self) -> Option<i64> {
        match self {
            FieldValue::Raw(raw) => Some(raw),
            FieldValue::Scaled(_) => None,
        }
    }
}

/// One decoded reading: its presence mask and the fields it selects.
///
/// Fields serialize flattened next to `presenceMask`, in flag order.
///
/// # Examples
/// ```
/// use cellpack_core::{FieldValue, PresenceMask, Reading, SensorFlag};
///
/// let mut reading = Reading::new(PresenceMask::from_bits(0x04));
/// reading.fields.insert(SensorFlag::Co2, FieldValue::Scaled(400.0));
/// assert_eq!(reading.value(SensorFlag::Co2), Some(400.0));
/// assert_eq!(reading.get(SensorFlag::Temperature), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub presence_mask: PresenceMask,
    #[serde(flatten)]
    pub fields: SensorFields,
}

impl Reading {
    pub fn new(presence_mask: PresenceMask) -> Self {
        Self {
            presence_mask,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, flag: SensorFlag) -> Option<FieldValue> {
        self.fields.get(&flag).copied()
    }

    /// Field value as a float, whichever representation was decoded.
    pub fn value(&self, flag: SensorFlag) -> Option<f64> {
        self.get(flag).map(FieldValue::as_f64)
    }
}

/// Result of decoding one payload buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedPayload {
    pub header: PayloadHeader,
    /// Readings in wire order.
    pub readings: Vec<Reading>,
    pub reading_count: usize,
}

impl DecodedPayload {
    pub fn new(header: PayloadHeader, readings: Vec<Reading>) -> Self {
        Self {
            header,
            reading_count: readings.len(),
            readings,
        }
    }
}
