use std::time::Duration;

use crate::binutil::{ParseError, read_array, read_u8_at, read_u16_be_at, read_u32_be_at};
use crate::codec::Codec;
use crate::tif::image::{Table, TifImage};

/// One decoded track record.
///
/// String fields (`title`, `artist`, `album`) are string table indices;
/// 0 means the field is not set. Resolve them with
/// [`TifImage::track_strings`] or [`TifImage::decode_string`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Record index this track was decoded from.
    pub index: u16,
    /// Encryption key block number.
    pub ekb_num: u32,
    pub title: u16,
    pub artist: u16,
    pub album: u16,
    pub track_in_album: u8,
    /// Content key (encrypted under the EKB).
    pub key: [u8; 8],
    pub mac: [u8; 8],
    pub codec_id: u8,
    /// Codec parameters: record bytes 33..36 followed by 44..46.
    pub codec_info: [u8; 5],
    /// Index of the first fragment; never 0 for a decoded track.
    pub first_fragment: u16,
    pub track_number: u16,
    /// Duration in whole seconds.
    pub seconds: u16,
    pub content_id: [u8; 20],
}

// Record layout, offsets relative to the record start.
const EKB_NUM: usize = 4;
const TITLE: usize = 8;
const ARTIST: usize = 10;
const ALBUM: usize = 12;
const TRACK_IN_ALBUM: usize = 14;
const KEY: usize = 16;
const MAC: usize = 24;
const CODEC_ID: usize = 32;
const CODEC_INFO_LO: usize = 33;
const FIRST_FRAGMENT: usize = 36;
const TRACK_NUMBER: usize = 38;
const SECONDS: usize = 40;
const CODEC_INFO_HI: usize = 44;
const CONTENT_ID: usize = 48;

impl TifImage {
    /// Decode track record `idx`.
    ///
    /// Fails with [`ParseError::IndexOutOfRange`] outside
    /// `FIRST_TRACK..=LAST_TRACK` and with [`ParseError::TrackNotPresent`]
    /// when the slot is unoccupied (first fragment 0).
    pub fn decode_track(&self, idx: u16) -> Result<TrackInfo, ParseError> {
        let rec = self.record(Table::Track, idx)?;

        let first_fragment = read_u16_be_at(rec, FIRST_FRAGMENT)?;
        if first_fragment == 0 {
            tracing::debug!(idx, "track slot is empty");
            return Err(ParseError::TrackNotPresent(idx));
        }

        let lo: [u8; 3] = read_array(rec, CODEC_INFO_LO)?;
        let hi: [u8; 2] = read_array(rec, CODEC_INFO_HI)?;

        Ok(TrackInfo {
            index: idx,
            ekb_num: read_u32_be_at(rec, EKB_NUM)?,
            title: read_u16_be_at(rec, TITLE)?,
            artist: read_u16_be_at(rec, ARTIST)?,
            album: read_u16_be_at(rec, ALBUM)?,
            track_in_album: read_u8_at(rec, TRACK_IN_ALBUM)?,
            key: read_array(rec, KEY)?,
            mac: read_array(rec, MAC)?,
            codec_id: read_u8_at(rec, CODEC_ID)?,
            codec_info: [lo[0], lo[1], lo[2], hi[0], hi[1]],
            first_fragment,
            track_number: read_u16_be_at(rec, TRACK_NUMBER)?,
            seconds: read_u16_be_at(rec, SECONDS)?,
            content_id: read_array(rec, CONTENT_ID)?,
        })
    }
}

impl TrackInfo {
    pub fn codec(&self) -> Codec {
        Codec::from_raw(self.codec_id, &self.codec_info)
    }

    /// Four character codec name, e.g. `"AT3+"`.
    pub fn codec_name(&self) -> String {
        self.codec().name()
    }

    /// Bytes per audio frame, 0 when the codec has no fixed frame size.
    pub fn frame_size(&self) -> u32 {
        self.codec().frame_size()
    }

    /// Frames per audio block, `None` for codecs that are not block aligned.
    pub fn frames_per_block(&self) -> Option<u32> {
        self.codec().frames_per_block()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.seconds))
    }
}
