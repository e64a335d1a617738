//! Input bytes, BOM stripping, encoding guardrails and text decoding.
//!
//! Catalogs are read as UTF-8 first. Bytes that are not valid UTF-8 are
//! decoded as ISO-8859-1 instead, which maps every byte to the code point of
//! the same value and therefore never fails.

use std::fmt;

/// Maximum number of bytes to scan for NUL (0x00).
pub const NUL_SCAN_LIMIT: usize = 8 * 1024;

/// UTF-8 BOM bytes.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Encoding guardrail failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingIssue {
    /// UTF-16/UTF-32 BOM detected.
    Utf16Or32Bom,
    /// NUL byte detected within the first 8KB.
    NulByte,
}

impl fmt::Display for EncodingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingIssue::Utf16Or32Bom => f.write_str("UTF-16/UTF-32 byte order mark"),
            EncodingIssue::NulByte => f.write_str("NUL byte in the first 8KB"),
        }
    }
}

/// Text encoding a catalog was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

impl TextEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "iso-8859-1",
        }
    }
}

/// Decoded catalog text plus the encoding that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
}

/// Strip a UTF-8 BOM if present. Returns the stripped slice and a flag.
#[inline]
pub fn strip_utf8_bom(input: &[u8]) -> (&[u8], bool) {
    if input.starts_with(&UTF8_BOM) {
        (&input[UTF8_BOM.len()..], true)
    } else {
        (input, false)
    }
}

/// Returns true if the input begins with a UTF-16 or UTF-32 BOM.
#[inline]
pub fn has_utf16_or_utf32_bom(input: &[u8]) -> bool {
    matches!(
        input,
        [0x00, 0x00, 0xFE, 0xFF, ..]
            | [0xFF, 0xFE, 0x00, 0x00, ..]
            | [0xFE, 0xFF, ..]
            | [0xFF, 0xFE, ..]
    )
}

/// Returns true if a NUL byte (0x00) is found within the first 8KB.
#[inline]
pub fn has_nul_in_first_8k(input: &[u8]) -> bool {
    input.iter().take(NUL_SCAN_LIMIT).any(|byte| *byte == 0)
}

/// Apply encoding guardrails and strip UTF-8 BOM if present.
///
/// Order:
/// 1) UTF-16/UTF-32 BOM => refuse
/// 2) UTF-8 BOM => strip and continue
/// 3) NUL byte in first 8KB => refuse
#[inline]
pub fn guard_input_bytes(input: &[u8]) -> Result<&[u8], EncodingIssue> {
    if has_utf16_or_utf32_bom(input) {
        return Err(EncodingIssue::Utf16Or32Bom);
    }
    let (stripped, _had_utf8_bom) = strip_utf8_bom(input);
    if has_nul_in_first_8k(stripped) {
        return Err(EncodingIssue::NulByte);
    }
    Ok(stripped)
}

/// Guard, then decode as UTF-8 with an ISO-8859-1 fallback.
pub fn decode_catalog_bytes(input: &[u8]) -> Result<DecodedText, EncodingIssue> {
    let bytes = guard_input_bytes(input)?;
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(DecodedText {
            text: text.to_string(),
            encoding: TextEncoding::Utf8,
        }),
        Err(err) => {
            tracing::warn!(
                valid_up_to = err.valid_up_to(),
                "catalog is not valid UTF-8; decoding as ISO-8859-1"
            );
            Ok(DecodedText {
                text: decode_latin1(bytes),
                encoding: TextEncoding::Latin1,
            })
        }
    }
}

/// ISO-8859-1 decode: byte N becomes U+00NN.
pub fn decode_latin1(input: &[u8]) -> String {
    input.iter().map(|&byte| char::from(byte)).collect()
}
