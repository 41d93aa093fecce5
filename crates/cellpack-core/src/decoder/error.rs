use thiserror::Error;

/// Errors returned by payload decoding.
///
/// Every variant aborts the whole decode; no partial payload is produced.
///
/// # Examples
/// ```
/// use cellpack_core::{DecodeError, decode_payload};
///
/// let err = decode_payload(&[0x01, 0x05]).unwrap_err();
/// assert!(matches!(err, DecodeError::UnsupportedVersion { version: 1 }));
/// assert!(err.to_string().contains("unsupported payload version"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload too short for header: need {needed} bytes, got {actual}")]
    MalformedHeader { needed: usize, actual: usize },
    #[error("unsupported payload version: {version}")]
    UnsupportedVersion { version: u8 },
    #[error("payload too short for shared presence mask: need {needed} bytes, got {actual}")]
    TruncatedSharedMask { needed: usize, actual: usize },
    #[error("shared presence mask selects no fields")]
    EmptyPresenceMask,
    #[error(
        "invalid payload length: {remaining} data bytes is not a multiple of the {reading_size}-byte reading size"
    )]
    InvalidPayloadLength { remaining: usize, reading_size: usize },
    #[error("unknown sensor flag {flag} set in presence mask")]
    UnknownSensorFlag { flag: u8 },
    #[error("reading data truncated at offset {offset}: need {needed} bytes, got {actual}")]
    TruncatedReadingData {
        offset: usize,
        needed: usize,
        actual: usize,
    },
    #[error("internal error: decoded {actual} bytes for a {expected}-byte reading")]
    InternalSizeMismatch { expected: usize, actual: usize },
}
