use tracing::debug;

use super::error::DecodeError;
use super::header::parse_header;
use super::layout;
use super::reader::PayloadReader;
use super::reading::decode_reading;
use super::sensor::{decode_sensor_data, sensor_data_size};
use crate::{DecodedPayload, Reading, ValueMode};

/// Decode a payload with scaled values.
///
/// # Examples
/// ```
/// use cellpack_core::{SensorFlag, decode_payload};
///
/// let payload = [
///     0x20, 0x05, // version 0, shared mask, 5 minute interval
///     0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // temperature + co2
///     0xC4, 0x09, 0x90, 0x01,
/// ];
/// let decoded = decode_payload(&payload)?;
/// assert_eq!(decoded.reading_count, 1);
/// assert_eq!(decoded.readings[0].value(SensorFlag::Temperature), Some(25.0));
/// assert_eq!(decoded.readings[0].value(SensorFlag::Co2), Some(400.0));
/// # Ok::<(), cellpack_core::DecodeError>(())
/// ```
pub fn decode_payload(payload: &[u8]) -> Result<DecodedPayload, DecodeError> {
    decode_payload_with(payload, ValueMode::Scaled)
}

/// Decode a payload keeping raw wire integers.
pub fn decode_payload_raw(payload: &[u8]) -> Result<DecodedPayload, DecodeError> {
    decode_payload_with(payload, ValueMode::Raw)
}

pub fn decode_payload_with(
    payload: &[u8],
    mode: ValueMode,
) -> Result<DecodedPayload, DecodeError> {
    let reader = PayloadReader::new(payload);
    let header = parse_header(&reader)?;
    debug!(
        version = header.version,
        shared_presence_mask = header.shared_presence_mask,
        interval_minutes = header.interval_minutes,
        len = payload.len(),
        "decoded payload header"
    );

    let readings = if header.shared_presence_mask {
        decode_shared_batch(&reader, payload, mode)?
    } else {
        decode_per_reading(payload, mode)?
    };

    Ok(DecodedPayload::new(header, readings))
}

/// One mask at bytes 2..10, then equally sized field blocks to the end.
fn decode_shared_batch(
    reader: &PayloadReader<'_>,
    payload: &[u8],
    mode: ValueMode,
) -> Result<Vec<Reading>, DecodeError> {
    if payload.len() < layout::SHARED_DATA_OFFSET {
        return Err(DecodeError::TruncatedSharedMask {
            needed: layout::SHARED_DATA_OFFSET,
            actual: payload.len(),
        });
    }

    let shared_mask = reader.read_mask(layout::SHARED_MASK_OFFSET)?;
    let reading_size = sensor_data_size(shared_mask)?;
    if reading_size == 0 {
        return Err(DecodeError::EmptyPresenceMask);
    }

    let remaining = payload.len() - layout::SHARED_DATA_OFFSET;
    if remaining % reading_size != 0 {
        return Err(DecodeError::InvalidPayloadLength {
            remaining,
            reading_size,
        });
    }

    let reading_count = remaining / reading_size;
    debug!(
        mask = shared_mask.bits(),
        reading_size, reading_count, "decoding shared-mask batch"
    );

    let mut readings = Vec::with_capacity(reading_count);
    let mut offset = layout::SHARED_DATA_OFFSET;
    for _ in 0..reading_count {
        let (fields, consumed) = decode_sensor_data(payload, offset, shared_mask, mode)?;
        if consumed != reading_size {
            return Err(DecodeError::InternalSizeMismatch {
                expected: reading_size,
                actual: consumed,
            });
        }
        readings.push(Reading {
            presence_mask: shared_mask,
            fields,
        });
        offset += consumed;
    }

    Ok(readings)
}

/// Self-describing records (mask + fields) until the buffer is exhausted.
fn decode_per_reading(payload: &[u8], mode: ValueMode) -> Result<Vec<Reading>, DecodeError> {
    let mut readings = Vec::new();
    let mut offset = layout::HEADER_LEN;
    while offset < payload.len() {
        let (reading, consumed) = decode_reading(payload, offset, mode)?;
        readings.push(reading);
        offset += consumed;
    }
    debug!(reading_count = readings.len(), "decoded per-reading payload");
    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::{decode_payload, decode_payload_raw};
    use crate::catalog::{CATALOG, FLAG_MAX, SensorFlag};
    use crate::decoder::error::DecodeError;
    use crate::mask::PresenceMask;
    use crate::{FieldValue, PayloadHeader};

    const META_SHARED: u8 = 0x20;
    const META_PER_READING: u8 = 0x00;

    fn payload(metadata: u8, parts: &[&[u8]]) -> Vec<u8> {
        let mut payload = vec![metadata, 0x05];
        for part in parts {
            payload.extend_from_slice(part);
        }
        payload
    }

    fn mask(bits: u64) -> [u8; 8] {
        PresenceMask::from_bits(bits).to_le_bytes()
    }

    #[test]
    fn shared_single_reading() {
        let payload = payload(META_SHARED, &[&mask(0x05), &[0xC4, 0x09, 0x90, 0x01]]);
        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(
            decoded.header,
            PayloadHeader {
                version: 0,
                shared_presence_mask: true,
                interval_minutes: 5,
            }
        );
        assert_eq!(decoded.reading_count, 1);
        assert_eq!(decoded.readings[0].value(SensorFlag::Temperature), Some(25.0));
        assert_eq!(decoded.readings[0].value(SensorFlag::Co2), Some(400.0));
    }

    #[test]
    fn shared_batch() {
        let payload = payload(
            META_SHARED,
            &[&mask(0x04), &[0x90, 0x01, 0x9A, 0x01, 0xA4, 0x01]],
        );
        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(decoded.reading_count, 3);
        let co2: Vec<_> = decoded
            .readings
            .iter()
            .map(|r| r.value(SensorFlag::Co2))
            .collect();
        assert_eq!(co2, vec![Some(400.0), Some(410.0), Some(420.0)]);
        assert!(
            decoded
                .readings
                .iter()
                .all(|r| r.presence_mask == PresenceMask::from_bits(0x04))
        );
    }

    #[test]
    fn per_reading_masks() {
        let payload = payload(
            META_PER_READING,
            &[&mask(0x01), &[0xC4, 0x09], &mask(0x04), &[0x90, 0x01]],
        );
        let decoded = decode_payload(&payload).unwrap();
        assert!(!decoded.header.shared_presence_mask);
        assert_eq!(decoded.reading_count, 2);
        assert_eq!(decoded.readings[0].value(SensorFlag::Temperature), Some(25.0));
        assert_eq!(decoded.readings[0].get(SensorFlag::Co2), None);
        assert_eq!(decoded.readings[1].value(SensorFlag::Co2), Some(400.0));
    }

    #[test]
    fn pm25_two_channels() {
        let payload = payload(META_SHARED, &[&mask(0x300), &[0x7D, 0x00, 0x87, 0x00]]);
        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(decoded.readings[0].value(SensorFlag::Pm25Ch1), Some(12.5));
        assert_eq!(decoded.readings[0].value(SensorFlag::Pm25Ch2), Some(13.5));
    }

    #[test]
    fn o3_working_electrode() {
        let payload = payload(META_SHARED, &[&mask(0x0100_0000), &[0x78, 0x56, 0x34, 0x12]]);
        let decoded = decode_payload(&payload).unwrap();
        let value = decoded.readings[0].value(SensorFlag::O3We).unwrap();
        assert!((value - f64::from(0x1234_5678u32) / 1000.0).abs() < 1e-9);
    }

    #[test]
    fn signal_is_sign_extended() {
        let payload = payload(META_SHARED, &[&mask(0x2000_0000), &[0xB5]]);
        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(decoded.readings[0].value(SensorFlag::Signal), Some(-75.0));

        let raw = decode_payload_raw(&payload).unwrap();
        assert_eq!(
            raw.readings[0].get(SensorFlag::Signal),
            Some(FieldValue::Raw(-75))
        );
    }

    #[test]
    fn all_fields_in_flag_order() {
        let mut data = Vec::new();
        for (index, descriptor) in CATALOG.iter().enumerate() {
            let mut bytes = vec![0u8; descriptor.width()];
            bytes[0] = index as u8 + 1;
            data.extend_from_slice(&bytes);
        }
        assert_eq!(data.len(), 67);
        let all = (1u64 << (FLAG_MAX + 1)) - 1;
        let payload = payload(META_SHARED, &[&mask(all), &data]);

        let decoded = decode_payload_raw(&payload).unwrap();
        assert_eq!(decoded.reading_count, 1);
        for (index, (flag, value)) in decoded.readings[0].fields.iter().enumerate() {
            assert_eq!(flag.ordinal() as usize, index);
            assert_eq!(*value, FieldValue::Raw(index as i64 + 1));
        }
    }

    #[test]
    fn raw_times_scale_matches_scaled() {
        let payload = payload(
            META_SHARED,
            &[
                &mask(0x2100_0307),
                &[0x38, 0xFF, 0x70, 0x17, 0x90, 0x01, 0x7D, 0x00, 0x87, 0x00],
                &[0x78, 0x56, 0x34, 0x12, 0xB5],
            ],
        );
        let scaled = decode_payload(&payload).unwrap();
        let raw = decode_payload_raw(&payload).unwrap();
        for (scaled, raw) in scaled.readings.iter().zip(&raw.readings) {
            assert_eq!(scaled.fields.len(), raw.fields.len());
            for (flag, raw_value) in &raw.fields {
                let FieldValue::Raw(raw_value) = *raw_value else {
                    panic!("expected raw value for {flag}");
                };
                let scaled_value = scaled.value(*flag).unwrap();
                let rebuilt = scaled_value * flag.descriptor().scale;
                assert!((rebuilt - raw_value as f64).abs() < 1e-6, "{flag}");
            }
        }
    }

    #[test]
    fn shared_reading_count_times_size_is_data_len() {
        for count in 0..6usize {
            let mut data = Vec::new();
            for _ in 0..count {
                data.extend_from_slice(&[0xC4, 0x09, 0x70, 0x17, 0xB5]);
            }
            let payload = payload(META_SHARED, &[&mask(0x2000_0003), &data]);
            let decoded = decode_payload(&payload).unwrap();
            assert_eq!(decoded.reading_count, count);
            assert_eq!(decoded.reading_count * 5, payload.len() - 10);
        }
    }

    #[test]
    fn decode_is_repeatable() {
        let payload = payload(
            META_PER_READING,
            &[&mask(0x301), &[0xC4, 0x09, 0x7D, 0x00, 0x87, 0x00], &mask(0x04), &[0x90, 0x01]],
        );
        let first = decode_payload(&payload).unwrap();
        let second = decode_payload(&payload).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_decodes_agree() {
        let payload = payload(META_SHARED, &[&mask(0x04), &[0x90, 0x01, 0x9A, 0x01]]);
        let expected = decode_payload(&payload).unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| decode_payload(&payload).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn header_only_per_reading_payload_is_empty() {
        let decoded = decode_payload(&[META_PER_READING, 0x0A]).unwrap();
        assert_eq!(decoded.reading_count, 0);
        assert!(decoded.readings.is_empty());
    }

    #[test]
    fn shared_mask_without_data_is_empty() {
        let payload = payload(META_SHARED, &[&mask(0x04)]);
        let decoded = decode_payload(&payload).unwrap();
        assert_eq!(decoded.reading_count, 0);
    }

    #[test]
    fn malformed_header() {
        assert_eq!(
            decode_payload(&[]).unwrap_err(),
            DecodeError::MalformedHeader {
                needed: 2,
                actual: 0,
            }
        );
        assert!(matches!(
            decode_payload(&[META_SHARED]).unwrap_err(),
            DecodeError::MalformedHeader { actual: 1, .. }
        ));
    }

    #[test]
    fn unsupported_version() {
        let err = decode_payload(&[0x21, 0x05]).unwrap_err();
        assert_eq!(err, DecodeError::UnsupportedVersion { version: 1 });
    }

    #[test]
    fn truncated_shared_mask() {
        let err = decode_payload(&[META_SHARED, 0x05, 0x04, 0x00, 0x00]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedSharedMask {
                needed: 10,
                actual: 5,
            }
        );
    }

    #[test]
    fn empty_shared_mask() {
        let payload = payload(META_SHARED, &[&mask(0), &[0x90, 0x01]]);
        assert_eq!(
            decode_payload(&payload).unwrap_err(),
            DecodeError::EmptyPresenceMask
        );
    }

    #[test]
    fn shared_length_not_multiple() {
        let payload = payload(META_SHARED, &[&mask(0x05), &[0xC4, 0x09, 0x90, 0x01, 0x00]]);
        assert_eq!(
            decode_payload(&payload).unwrap_err(),
            DecodeError::InvalidPayloadLength {
                remaining: 5,
                reading_size: 4,
            }
        );
    }

    #[test]
    fn unknown_flag_in_shared_mask() {
        let payload = payload(META_SHARED, &[&mask(1 << 40), &[0x00, 0x00]]);
        assert_eq!(
            decode_payload(&payload).unwrap_err(),
            DecodeError::UnknownSensorFlag { flag: 40 }
        );
    }

    #[test]
    fn unknown_flag_in_per_reading_mask() {
        let payload = payload(META_PER_READING, &[&mask(1 << 30), &[0x00, 0x00]]);
        assert_eq!(
            decode_payload(&payload).unwrap_err(),
            DecodeError::UnknownSensorFlag { flag: 30 }
        );
    }

    #[test]
    fn truncated_per_reading_data() {
        let payload = payload(META_PER_READING, &[&mask(0x05), &[0xC4, 0x09, 0x90]]);
        assert_eq!(
            decode_payload(&payload).unwrap_err(),
            DecodeError::TruncatedReadingData {
                offset: 12,
                needed: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn trailing_partial_mask_is_truncation() {
        let payload = payload(META_PER_READING, &[&mask(0x04), &[0x90, 0x01], &[0x01, 0x00]]);
        assert!(matches!(
            decode_payload(&payload).unwrap_err(),
            DecodeError::TruncatedReadingData { offset: 12, .. }
        ));
    }
}
