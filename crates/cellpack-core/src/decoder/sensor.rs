use std::collections::BTreeMap;

use tracing::trace;

use super::error::DecodeError;
use super::reader::PayloadReader;
use crate::catalog::{FieldDescriptor, SensorFlag, descriptor_for};
use crate::mask::PresenceMask;
use crate::{FieldValue, ValueMode};

/// Decoded field values keyed by flag, iterating in ordinal order.
pub type SensorFields = BTreeMap<SensorFlag, FieldValue>;

/// Decode the fields selected by `mask` starting at `offset`.
///
/// Fields are read in ascending flag order, back to back. Returns the fields
/// and the number of bytes consumed.
pub fn decode_sensor_data(
    payload: &[u8],
    offset: usize,
    mask: PresenceMask,
    mode: ValueMode,
) -> Result<(SensorFields, usize), DecodeError> {
    let reader = PayloadReader::new(payload);
    let mut fields = SensorFields::new();
    let mut cursor = offset;

    for bit in mask.set_bits() {
        let descriptor = known_descriptor(bit)?;
        let raw = reader.read_raw(cursor, descriptor.wire_type)?;
        let value = match mode {
            ValueMode::Scaled => FieldValue::Scaled(descriptor.scaled(raw)),
            ValueMode::Raw => FieldValue::Raw(raw),
        };
        trace!(field = descriptor.name, offset = cursor, raw, "decoded field");
        fields.insert(descriptor.flag, value);
        cursor += descriptor.width();
    }

    Ok((fields, cursor - offset))
}

/// Byte length of the field block described by `mask`, without reading data.
///
/// # Examples
/// ```
/// use cellpack_core::{PresenceMask, sensor_data_size};
///
/// // temperature (int16) + co2 (uint16)
/// assert_eq!(sensor_data_size(PresenceMask::from_bits(0b101)).unwrap(), 4);
/// ```
pub fn sensor_data_size(mask: PresenceMask) -> Result<usize, DecodeError> {
    mask.set_bits()
        .map(|bit| known_descriptor(bit).map(FieldDescriptor::width))
        .sum()
}

fn known_descriptor(bit: u8) -> Result<&'static FieldDescriptor, DecodeError> {
    descriptor_for(bit).ok_or(DecodeError::UnknownSensorFlag { flag: bit })
}
