//! Payload input.
//!
//! All file access lives here so the decoder stays pure. Payloads arrive
//! either as raw binary files or as hex text, the form cellular backends
//! usually log and forward.

mod file;
mod hex;

pub use file::{PayloadFormat, load_payload_file};
pub use hex::parse_hex_payload;

use std::path::Path;

use thiserror::Error;

use crate::decoder::{DecodeError, decode_payload_with};
use crate::{DecodedPayload, ValueMode};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex payload: {0}")]
    Hex(#[from] ::hex::FromHexError),
}

/// Errors from decoding a payload stored in a file.
#[derive(Debug, Error)]
pub enum FileDecodeError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Load a payload file and decode it.
pub fn decode_payload_file(
    path: &Path,
    format: PayloadFormat,
    mode: ValueMode,
) -> Result<DecodedPayload, FileDecodeError> {
    let payload = load_payload_file(path, format)?;
    Ok(decode_payload_with(&payload, mode)?)
}
