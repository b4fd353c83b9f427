//! Text encodings used by string records.
//!
//! The first raw byte of every string selects one of three legacy encodings.
//! `TextEncoding::decode` converts the remaining bytes to a Rust `String`
//! that ends at the first NUL, the way the device firmware reads it.
use std::fmt;

use encoding_rs::{DecoderResult, Encoding, SHIFT_JIS, UTF_16BE};

/// Selector byte for ISO-8859-1 text.
pub const ENCODING_LATIN1: u8 = 0x05;
/// Selector byte for UTF-16 big-endian text.
pub const ENCODING_UTF16BE: u8 = 0x84;
/// Selector byte for Shift-JIS text.
pub const ENCODING_SHIFT_JIS: u8 = 0x90;

/// A string payload that is not valid in its claimed encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    message: String,
}

impl ConversionError {
    fn new(message: impl Into<String>) -> Self {
        ConversionError {
            message: message.into(),
        }
    }

    /// The converter's diagnostic.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConversionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Latin1,
    Utf16Be,
    ShiftJis,
}

impl TextEncoding {
    pub fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            ENCODING_LATIN1 => Some(TextEncoding::Latin1),
            ENCODING_UTF16BE => Some(TextEncoding::Utf16Be),
            ENCODING_SHIFT_JIS => Some(TextEncoding::ShiftJis),
            _ => None,
        }
    }

    pub fn selector(self) -> u8 {
        match self {
            TextEncoding::Latin1 => ENCODING_LATIN1,
            TextEncoding::Utf16Be => ENCODING_UTF16BE,
            TextEncoding::ShiftJis => ENCODING_SHIFT_JIS,
        }
    }

    /// Conventional charset label.
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Latin1 => "ISO-8859-1",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::ShiftJis => "SHIFT_JIS",
        }
    }

    /// Decode `bytes` (the raw string without its selector byte).
    ///
    /// The whole payload must convert cleanly; the text is then cut at the
    /// first U+0000, so chunk padding never reaches the caller. For UTF-16BE
    /// a single dangling zero byte is treated as padding.
    pub fn decode(self, bytes: &[u8]) -> Result<String, ConversionError> {
        let text = match self {
            // ISO-8859-1 maps every byte to the code point of the same value.
            TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            TextEncoding::Utf16Be => {
                let bytes = match bytes.split_last() {
                    Some((&0, rest)) if bytes.len() % 2 == 1 => rest,
                    _ => bytes,
                };
                decode_strict(UTF_16BE, bytes)?
            }
            TextEncoding::ShiftJis => decode_strict(SHIFT_JIS, bytes)?,
        };
        Ok(match text.find('\0') {
            Some(end) => text[..end].to_string(),
            None => text,
        })
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decode without replacement characters: any malformed sequence is an error.
fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Result<String, ConversionError> {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .ok_or_else(|| {
            ConversionError::new(format!(
                "{} bytes of input is too large to convert",
                bytes.len()
            ))
        })?;
    let mut out = String::with_capacity(capacity);
    let (result, read) = decoder.decode_to_string_without_replacement(bytes, &mut out, true);
    match result {
        DecoderResult::InputEmpty => Ok(out),
        DecoderResult::Malformed(bad, after) => Err(ConversionError::new(format!(
            "invalid byte sequence at offset {} in conversion input",
            read.saturating_sub(usize::from(bad) + usize::from(after))
        ))),
        DecoderResult::OutputFull => Err(ConversionError::new(
            "conversion output buffer exhausted",
        )),
    }
}
