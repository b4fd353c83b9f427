use std::ops::RangeInclusive;

use crate::binutil::{ParseError, read_slice, read_u16_be_at};
use crate::tif::track::TrackInfo;

/// Lowest valid track (and fragment) record index.
pub const FIRST_TRACK: u16 = 1;
/// Highest valid track (and fragment) record index.
pub const LAST_TRACK: u16 = 2345;
/// Lowest valid string chunk index.
pub const FIRST_STRING: u16 = 1;
/// Highest valid string chunk index (the 12-bit link space without 0).
pub const LAST_STRING: u16 = 4095;

const TRACK_COUNT_OFFSET: usize = 0x100;
const SLOT_MAP_OFFSET: usize = 0x102;

/// Smallest buffer that holds every table: the end of the string chunk table.
pub const MIN_IMAGE_LEN: usize = 0x40000 + 0x10 * (LAST_STRING as usize + 1);

/// The fixed-stride tables of a track index image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Track,
    Fragment,
    StringChunk,
}

impl Table {
    /// Byte offset of record 0.
    pub const fn base(self) -> usize {
        match self {
            Table::Track => 0x8000,
            Table::Fragment => 0x30000,
            Table::StringChunk => 0x40000,
        }
    }

    /// Size of one record in bytes.
    pub const fn stride(self) -> usize {
        match self {
            Table::Track => 0x50,
            Table::Fragment | Table::StringChunk => 0x10,
        }
    }

    /// Valid index domain. Index 0 is the terminator in every table and is
    /// never addressable.
    pub const fn domain(self) -> RangeInclusive<u16> {
        match self {
            // Fragments share the index space of tracks on disc.
            Table::Track | Table::Fragment => FIRST_TRACK..=LAST_TRACK,
            Table::StringChunk => FIRST_STRING..=LAST_STRING,
        }
    }

    pub fn contains(self, index: u16) -> bool {
        self.domain().contains(&index)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Table::Track => "track",
            Table::Fragment => "fragment",
            Table::StringChunk => "string chunk",
        }
    }
}

/// An in-memory track index image.
///
/// The buffer length is checked once on construction; afterwards every
/// record lookup only needs to validate the index against the table domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TifImage {
    data: Vec<u8>,
}

impl TifImage {
    /// Wrap a loaded image.
    ///
    /// Returns [`ParseError::ImageTooShort`] when the buffer cannot hold all
    /// tables. Longer buffers are accepted; trailing bytes are ignored.
    pub fn new(data: Vec<u8>) -> Result<Self, ParseError> {
        if data.len() < MIN_IMAGE_LEN {
            tracing::debug!(len = data.len(), "rejecting short track index image");
            return Err(ParseError::ImageTooShort {
                len: data.len(),
                required: MIN_IMAGE_LEN,
            });
        }
        Ok(TifImage { data })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Return the record window for `index` in `table`.
    ///
    /// The window is exactly `table.stride()` bytes long.
    pub fn record(&self, table: Table, index: u16) -> Result<&[u8], ParseError> {
        if !table.contains(index) {
            return Err(ParseError::IndexOutOfRange { table, index });
        }
        let off = table.base() + table.stride() * usize::from(index);
        read_slice(&self.data, off, table.stride())
    }

    /// Number of tracks listed in the slot map.
    pub fn track_count(&self) -> u16 {
        // The length check in `new` covers the header region.
        read_u16_be_at(&self.data, TRACK_COUNT_OFFSET).unwrap_or(0)
    }

    /// Track record index stored at slot-map `position` (0-based, playback
    /// order).
    pub fn track_slot(&self, position: u16) -> Result<u16, ParseError> {
        let count = self.track_count();
        if position >= count || position >= LAST_TRACK {
            return Err(ParseError::SlotOutOfRange { position, count });
        }
        read_u16_be_at(&self.data, SLOT_MAP_OFFSET + 2 * usize::from(position))
    }

    /// Iterate over every slot of the slot map in playback order.
    ///
    /// Each item carries its own result; a damaged slot does not stop the
    /// listing.
    pub fn tracks(&self) -> Tracks<'_> {
        let count = self.track_count();
        if count > LAST_TRACK {
            tracing::warn!(count, "track count exceeds slot map, truncating listing");
        }
        Tracks {
            image: self,
            position: 0,
            count: count.min(LAST_TRACK),
        }
    }
}

impl TryFrom<Vec<u8>> for TifImage {
    type Error = ParseError;

    fn try_from(data: Vec<u8>) -> Result<Self, Self::Error> {
        TifImage::new(data)
    }
}

impl TryFrom<&[u8]> for TifImage {
    type Error = ParseError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        TifImage::new(data.to_vec())
    }
}

/// Iterator returned by [`TifImage::tracks`].
#[derive(Debug, Clone)]
pub struct Tracks<'a> {
    image: &'a TifImage,
    position: u16,
    count: u16,
}

impl Iterator for Tracks<'_> {
    type Item = (u16, Result<TrackInfo, ParseError>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.count {
            return None;
        }
        let position = self.position;
        self.position += 1;
        let track = self
            .image
            .track_slot(position)
            .and_then(|idx| self.image.decode_track(idx));
        Some((position, track))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::from(self.count - self.position);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Tracks<'_> {}
impl std::iter::FusedIterator for Tracks<'_> {}
