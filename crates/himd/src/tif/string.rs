use crate::binutil::{ChainBreak, ParseError, read_array, read_u16_be_at, split_type_link};
use crate::meta::TextEncoding;
use crate::tif::image::{Table, TifImage};
use crate::tif::track::TrackInfo;

pub const STRING_TYPE_UNUSED: u8 = 0;
pub const STRING_TYPE_CONTINUATION: u8 = 1;
pub const STRING_TYPE_TITLE: u8 = 8;
pub const STRING_TYPE_ARTIST: u8 = 9;
pub const STRING_TYPE_ALBUM: u8 = 10;
pub const STRING_TYPE_GROUP: u8 = 12;

/// Payload bytes carried by one string chunk.
pub const STRING_PAYLOAD_LEN: usize = 14;

/// Longest chain the device can address; anything longer is a cycle.
pub const MAX_STRING_CHUNKS: usize = 4095;

/// One 16-byte record of the string table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringChunk {
    pub payload: [u8; STRING_PAYLOAD_LEN],
    /// Type nibble: 1 for continuations, 8 and above for string heads.
    pub kind: u8,
    /// Next chunk, 0 terminates.
    pub link: u16,
}

impl StringChunk {
    pub fn is_head(&self) -> bool {
        self.kind >= 8
    }
}

/// What a string head describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringCategory {
    Title,
    Artist,
    Album,
    Group,
    Other(u8),
}

impl From<u8> for StringCategory {
    fn from(kind: u8) -> Self {
        match kind {
            STRING_TYPE_TITLE => StringCategory::Title,
            STRING_TYPE_ARTIST => StringCategory::Artist,
            STRING_TYPE_ALBUM => StringCategory::Album,
            STRING_TYPE_GROUP => StringCategory::Group,
            other => StringCategory::Other(other),
        }
    }
}

/// Concatenated chunk payloads of one string chain, selector byte included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawString {
    /// Type nibble of the head chunk.
    pub kind: u8,
    /// `14 * chunk_count` bytes in chain order.
    pub bytes: Vec<u8>,
}

impl RawString {
    pub fn chunk_count(&self) -> usize {
        self.bytes.len() / STRING_PAYLOAD_LEN
    }

    pub fn category(&self) -> StringCategory {
        StringCategory::from(self.kind)
    }
}

/// A decoded string record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedString {
    pub text: String,
    /// Type nibble of the head chunk.
    pub kind: u8,
    pub encoding: TextEncoding,
}

impl DecodedString {
    pub fn category(&self) -> StringCategory {
        StringCategory::from(self.kind)
    }
}

/// Title, artist and album of a track; `None` for unset fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackStrings {
    pub title: Option<Result<String, ParseError>>,
    pub artist: Option<Result<String, ParseError>>,
    pub album: Option<Result<String, ParseError>>,
}

impl TifImage {
    /// Read one string chunk.
    pub fn string_chunk(&self, idx: u16) -> Result<StringChunk, ParseError> {
        let rec = self.record(Table::StringChunk, idx)?;
        let (kind, link) = split_type_link(read_u16_be_at(rec, STRING_PAYLOAD_LEN)?);
        Ok(StringChunk {
            payload: read_array(rec, 0)?,
            kind,
            link,
        })
    }

    /// Validate the chain starting at `idx` and return its raw bytes.
    ///
    /// The head must have a type of 8 or above and every following chunk
    /// must be a continuation. Chains longer than [`MAX_STRING_CHUNKS`]
    /// are reported as looping.
    pub fn decode_string_raw(&self, idx: u16) -> Result<RawString, ParseError> {
        let head = self.string_chunk(idx)?;
        if !head.is_head() {
            tracing::debug!(idx, kind = head.kind, "string chunk is not a head");
            return Err(ParseError::NotStringHead {
                index: idx,
                found_type: head.kind,
            });
        }

        let kind = head.kind;
        let mut len: usize = 1;
        let mut cur = head.link;
        while cur != 0 {
            tracing::trace!(idx, cur, "string chunk");
            let chunk = self.string_chunk(cur)?;
            if chunk.kind != STRING_TYPE_CONTINUATION {
                tracing::debug!(idx, position = len + 1, kind = chunk.kind, "string chain broken");
                return Err(ParseError::BrokenChain {
                    head: idx,
                    reason: ChainBreak::WrongType {
                        position: len + 1,
                        found_type: chunk.kind,
                    },
                });
            }
            len += 1;
            if len > MAX_STRING_CHUNKS {
                tracing::debug!(idx, "string chain loops");
                return Err(ParseError::BrokenChain {
                    head: idx,
                    reason: ChainBreak::Loops,
                });
            }
            cur = chunk.link;
        }

        let size = len * STRING_PAYLOAD_LEN;
        let mut bytes: Vec<u8> = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| ParseError::OutOfMemory { index: idx, bytes: size })?;

        let mut chunk = head;
        for _ in 0..len {
            bytes.extend_from_slice(&chunk.payload);
            if chunk.link == 0 {
                break;
            }
            chunk = self.string_chunk(chunk.link)?;
        }

        Ok(RawString { kind, bytes })
    }

    /// Decode the string whose chain starts at `idx`.
    pub fn decode_string(&self, idx: u16) -> Result<DecodedString, ParseError> {
        let raw = self.decode_string_raw(idx)?;
        let (&selector, payload) = raw
            .bytes
            .split_first()
            .ok_or(ParseError::UnknownEncoding { index: idx, selector: 0 })?;
        let encoding = TextEncoding::from_selector(selector).ok_or_else(|| {
            tracing::debug!(idx, selector, "unknown string encoding");
            ParseError::UnknownEncoding {
                index: idx,
                selector,
            }
        })?;
        let text = encoding
            .decode(payload)
            .map_err(|source| ParseError::EncodingConversion {
                index: idx,
                encoding,
                source,
            })?;
        Ok(DecodedString {
            text,
            kind: raw.kind,
            encoding,
        })
    }

    /// Resolve the title, artist and album of `track`.
    pub fn track_strings(&self, track: &TrackInfo) -> TrackStrings {
        let resolve = |idx: u16| (idx != 0).then(|| self.decode_string(idx).map(|s| s.text));
        TrackStrings {
            title: resolve(track.title),
            artist: resolve(track.artist),
            album: resolve(track.album),
        }
    }
}
