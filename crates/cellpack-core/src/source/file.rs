use std::fs;
use std::path::Path;

use tracing::debug;

use super::SourceError;
use super::hex::parse_hex_payload;

/// How a payload file's contents are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    /// Hex text for `.hex`/`.txt` files, raw bytes otherwise.
    #[default]
    Auto,
    Binary,
    Hex,
}

impl PayloadFormat {
    /// Resolve `Auto` against the file extension.
    pub fn resolve(self, path: &Path) -> PayloadFormat {
        match self {
            PayloadFormat::Auto => {
                let ext = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("")
                    .to_ascii_lowercase();
                if ext == "hex" || ext == "txt" {
                    PayloadFormat::Hex
                } else {
                    PayloadFormat::Binary
                }
            }
            other => other,
        }
    }
}

pub fn load_payload_file(path: &Path, format: PayloadFormat) -> Result<Vec<u8>, SourceError> {
    let format = format.resolve(path);
    debug!(path = %path.display(), ?format, "loading payload");
    match format {
        PayloadFormat::Hex => parse_hex_payload(&fs::read_to_string(path)?),
        PayloadFormat::Binary | PayloadFormat::Auto => Ok(fs::read(path)?),
    }
}
