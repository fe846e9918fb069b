//! Decoding of the legacy single-byte code page used for fixed-length text fields in RESv3
//! files.
//!
//! The instrument's text fields are Latin-1: every byte value is its own Unicode scalar value,
//! so decoding is a direct widening rather than a table lookup.

/// Decode `bytes` as Latin-1 and strip trailing NUL padding.
///
/// Every byte has a well-defined Latin-1 scalar value, so this cannot actually fail today; it
/// still returns a `Result` so a stricter code page could be swapped in later without changing
/// call sites.
/// ```
/// # use chromres_core::codepage::decode_fixed_text;
/// let bytes = b"Buffer A\0\0\0\0";
/// assert_eq!(decode_fixed_text(bytes).unwrap(), "Buffer A");
/// ```
pub fn decode_fixed_text(bytes: &[u8]) -> Result<String, crate::errors::ResError> {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    Ok(bytes[..end].iter().map(|&b| b as char).collect())
}

/// Decode `bytes` as Latin-1 without stripping NUL bytes (used for text blocks where `\0` is
/// not a terminator but a regular, if unusual, character).
pub fn decode_text(bytes: &[u8]) -> Result<String, crate::errors::ResError> {
    Ok(bytes.iter().map(|&b| b as char).collect())
}
