//! Utilities used by the decoders: the error type and big-endian byte readers.
use std::fmt;

use crate::meta::{ConversionError, TextEncoding};
use crate::tif::Table;

/// Why a string chain was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainBreak {
    /// A chunk after the head did not carry the continuation type.
    ///
    /// - `position` is the 1-based position in the chain (the head is 1).
    /// - `found_type` is the type nibble that was read instead.
    WrongType { position: usize, found_type: u8 },

    /// The chain grew past the device maximum, which only happens when the
    /// links form a cycle or the table is corrupted.
    Loops,
}

/// Coarse classification of a [`ParseError`].
///
/// Callers that only need to branch on what went wrong (skip the track,
/// show a placeholder, abort) can match on this instead of the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OutOfRange,
    NotPresent,
    NotAHead,
    BrokenChain,
    UnknownEncoding,
    EncodingConversionFailed,
    OutOfMemory,
    ImageTooShort,
    InvalidBlockRange,
}

/// Error type returned by every fallible decode operation.
///
/// Each variant carries the offending index or value so that the `Display`
/// output is a complete diagnostic on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An attempted read was outside the available buffer range.
    ///
    /// - `offset` is the index that was attempted to be accessed.
    /// - `needed` is the number of bytes required for the operation.
    /// - `available` is the current buffer length.
    /// - `context` is an optional string describing the logical location
    ///   (for example `"track_count"`) where the access was attempted.
    OffsetOutOfRange {
        offset: usize,
        needed: usize,
        available: usize,
        context: Option<String>,
    },

    /// The image buffer is shorter than the end of the last fixed table.
    ImageTooShort { len: usize, required: usize },

    /// A table index was outside the table's valid index domain.
    IndexOutOfRange { table: Table, index: u16 },

    /// A track slot-map position was not below the stored track count.
    SlotOutOfRange { position: u16, count: u16 },

    /// The track record exists but its slot is unoccupied.
    TrackNotPresent(u16),

    /// The string chunk at `index` is not the head of a string.
    NotStringHead { index: u16, found_type: u8 },

    /// The string chain starting at `head` is corrupted.
    BrokenChain { head: u16, reason: ChainBreak },

    /// The fragment chain starting at `first` did not terminate within
    /// `steps` fragments.
    FragmentChainLoops { first: u16, steps: usize },

    /// A fragment whose last block lies before its first block.
    InvalidBlockRange {
        fragment: u16,
        first_block: u16,
        last_block: u16,
    },

    /// The first raw byte of a string is not a known encoding selector.
    UnknownEncoding { index: u16, selector: u8 },

    /// The string payload is not valid in the encoding it claims.
    EncodingConversion {
        index: u16,
        encoding: TextEncoding,
        source: ConversionError,
    },

    /// Allocating the buffer for a raw string failed.
    OutOfMemory { index: u16, bytes: usize },
}

impl ParseError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::OffsetOutOfRange { .. }
            | ParseError::IndexOutOfRange { .. }
            | ParseError::SlotOutOfRange { .. } => ErrorKind::OutOfRange,
            ParseError::ImageTooShort { .. } => ErrorKind::ImageTooShort,
            ParseError::TrackNotPresent(_) => ErrorKind::NotPresent,
            ParseError::NotStringHead { .. } => ErrorKind::NotAHead,
            ParseError::BrokenChain { .. } | ParseError::FragmentChainLoops { .. } => {
                ErrorKind::BrokenChain
            }
            ParseError::InvalidBlockRange { .. } => ErrorKind::InvalidBlockRange,
            ParseError::UnknownEncoding { .. } => ErrorKind::UnknownEncoding,
            ParseError::EncodingConversion { .. } => ErrorKind::EncodingConversionFailed,
            ParseError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::OffsetOutOfRange {
                offset,
                needed,
                available,
                context,
            } => {
                if let Some(ctx) = context {
                    write!(
                        f,
                        "offset out of range at {}: 0x{:X} (needed {} bytes, available {})",
                        ctx, offset, needed, available
                    )
                } else {
                    write!(
                        f,
                        "offset out of range: 0x{:X} (needed {} bytes, available {})",
                        offset, needed, available
                    )
                }
            }
            ParseError::ImageTooShort { len, required } => write!(
                f,
                "track index image too short: {} bytes (need at least 0x{:X})",
                len, required
            ),
            ParseError::IndexOutOfRange { table, index } => {
                let domain = table.domain();
                write!(
                    f,
                    "{} index {} out of range ({}..={})",
                    table.name(),
                    index,
                    domain.start(),
                    domain.end()
                )
            }
            ParseError::SlotOutOfRange { position, count } => write!(
                f,
                "track slot {} out of range (track count {})",
                position, count
            ),
            ParseError::TrackNotPresent(idx) => {
                write!(f, "Track {} is not present on disc", idx)
            }
            ParseError::NotStringHead { index, found_type } => write!(
                f,
                "String table entry {} is not a head: Type {}",
                index, found_type
            ),
            ParseError::BrokenChain { head, reason } => match reason {
                ChainBreak::WrongType {
                    position,
                    found_type,
                } => write!(
                    f,
                    "{}th entry in string chain starting at {} has type {}",
                    position, head, found_type
                ),
                ChainBreak::Loops => write!(f, "string chain starting at {} loops", head),
            },
            ParseError::FragmentChainLoops { first, steps } => write!(
                f,
                "fragment chain starting at {} did not terminate after {} fragments",
                first, steps
            ),
            ParseError::InvalidBlockRange {
                fragment,
                first_block,
                last_block,
            } => write!(
                f,
                "fragment {} ends at block {} before it starts at block {}",
                fragment, last_block, first_block
            ),
            ParseError::UnknownEncoding { index, selector } => write!(
                f,
                "string {} has unknown encoding with ID {}",
                index, selector
            ),
            ParseError::EncodingConversion {
                index,
                encoding,
                source,
            } => write!(
                f,
                "convert string {} from {} to UTF-8: {}",
                index, encoding, source
            ),
            ParseError::OutOfMemory { index, bytes } => write!(
                f,
                "Can't allocate {} bytes for raw string (string idx {})",
                bytes, index
            ),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::EncodingConversion { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn out_of_range(bytes: &[u8], off: usize, needed: usize) -> ParseError {
    ParseError::OffsetOutOfRange {
        offset: off,
        needed,
        available: bytes.len(),
        context: None,
    }
}

/// Return a borrowed slice of length `len` starting at `off` from `bytes`.
///
/// Returns `Err(ParseError::OffsetOutOfRange)` when the requested range
/// exceeds the available buffer.
pub fn read_slice(bytes: &[u8], off: usize, len: usize) -> Result<&[u8], ParseError> {
    off.checked_add(len)
        .and_then(|end| bytes.get(off..end))
        .ok_or_else(|| ParseError::OffsetOutOfRange {
            offset: off,
            needed: len,
            // Report the remaining number of bytes from `off` to the end of the buffer.
            available: bytes.len().saturating_sub(off),
            context: Some("read_slice".into()),
        })
}

/// Copy `N` bytes starting at `off` into a fixed-size array.
pub fn read_array<const N: usize>(bytes: &[u8], off: usize) -> Result<[u8; N], ParseError> {
    let mut tmp = [0u8; N];
    tmp.copy_from_slice(read_slice(bytes, off, N)?);
    Ok(tmp)
}

/// Read a single byte from `bytes` at `off`.
pub fn read_u8_at(bytes: &[u8], off: usize) -> Result<u8, ParseError> {
    bytes
        .get(off)
        .copied()
        .ok_or_else(|| out_of_range(bytes, off, 1))
}

/// Read a 16-bit big-endian unsigned integer from `bytes` at `off`.
pub fn read_u16_be_at(bytes: &[u8], off: usize) -> Result<u16, ParseError> {
    read_array::<2>(bytes, off)
        .map(u16::from_be_bytes)
        .map_err(|_| out_of_range(bytes, off, 2))
}

/// Read a 32-bit big-endian unsigned integer from `bytes` at `off`.
pub fn read_u32_be_at(bytes: &[u8], off: usize) -> Result<u32, ParseError> {
    read_array::<4>(bytes, off)
        .map(u32::from_be_bytes)
        .map_err(|_| out_of_range(bytes, off, 4))
}

/// Split a packed header word into its type nibble and 12-bit link.
///
/// Fragment and string chunk records both store `type << 12 | link` as a
/// big-endian word.
pub fn split_type_link(word: u16) -> (u8, u16) {
    ((word >> 12) as u8, word & 0x0FFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_words() {
        let bytes = [0x12, 0x34, 0x56, 0x78, 0x9A];
        assert_eq!(read_u16_be_at(&bytes, 0).unwrap(), 0x1234);
        assert_eq!(read_u16_be_at(&bytes, 3).unwrap(), 0x789A);
        assert_eq!(read_u32_be_at(&bytes, 1).unwrap(), 0x3456_789A);
        assert_eq!(read_u8_at(&bytes, 4).unwrap(), 0x9A);
    }

    #[test]
    fn short_reads_report_offset() {
        let bytes = [0u8; 3];
        match read_u32_be_at(&bytes, 1) {
            Err(ParseError::OffsetOutOfRange {
                offset,
                needed,
                available,
                ..
            }) => {
                assert_eq!((offset, needed, available), (1, 4, 3));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(read_u8_at(&bytes, 3).is_err());
        assert!(read_slice(&bytes, usize::MAX, 2).is_err());
    }

    #[test]
    fn splits_type_and_link() {
        assert_eq!(split_type_link(0x8123), (8, 0x123));
        assert_eq!(split_type_link(0x1FFF), (1, 0xFFF));
        assert_eq!(split_type_link(0x0000), (0, 0));
    }

    #[test]
    fn broken_chain_message_names_position_and_type() {
        let err = ParseError::BrokenChain {
            head: 7,
            reason: ChainBreak::WrongType {
                position: 3,
                found_type: 9,
            },
        };
        assert_eq!(
            err.to_string(),
            "3th entry in string chain starting at 7 has type 9"
        );
        assert_eq!(err.kind(), ErrorKind::BrokenChain);
    }
}
