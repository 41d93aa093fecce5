use super::error::DecodeError;
use super::layout;
use super::reader::PayloadReader;
use super::sensor::decode_sensor_data;
use crate::{Reading, ValueMode};

/// Decode one self-describing reading: an 8-byte mask followed by its fields.
///
/// Returns the reading and the total bytes consumed (mask included).
pub fn decode_reading(
    payload: &[u8],
    offset: usize,
    mode: ValueMode,
) -> Result<(Reading, usize), DecodeError> {
    let presence_mask = PayloadReader::new(payload).read_mask(offset)?;
    let data_offset = offset + layout::MASK_LEN;
    let (fields, data_len) = decode_sensor_data(payload, data_offset, presence_mask, mode)?;

    Ok((
        Reading {
            presence_mask,
            fields,
        },
        layout::MASK_LEN + data_len,
    ))
}
