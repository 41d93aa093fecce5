use super::SourceError;

/// Parse hex text into payload bytes.
///
/// ASCII whitespace anywhere in the text and a leading `0x`/`0X` are ignored.
///
/// # Examples
/// ```
/// use cellpack_core::parse_hex_payload;
///
/// let bytes = parse_hex_payload("0x20 05\n0400000000000000 9001")?;
/// assert_eq!(bytes.len(), 12);
/// assert_eq!(bytes[0], 0x20);
/// # Ok::<(), cellpack_core::SourceError>(())
/// ```
pub fn parse_hex_payload(text: &str) -> Result<Vec<u8>, SourceError> {
    let trimmed = text.trim_start();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(::hex::decode(digits)?)
}
