//! Fixture builder shared by the integration tests.
//!
//! Writes records into a zeroed image at the documented offsets so tests
//! can describe a disc in a few lines.
#![allow(dead_code)]

use himd::{MIN_IMAGE_LEN, TifImage};

pub const TRACK_BASE: usize = 0x8000;
pub const FRAGMENT_BASE: usize = 0x30000;
pub const STRING_BASE: usize = 0x40000;

/// Raw field values of one track record.
#[derive(Debug, Clone, Default)]
pub struct TrackRecord {
    pub ekb_num: u32,
    pub title: u16,
    pub artist: u16,
    pub album: u16,
    pub track_in_album: u8,
    pub key: [u8; 8],
    pub mac: [u8; 8],
    pub codec_id: u8,
    pub codec_info: [u8; 5],
    pub first_fragment: u16,
    pub track_number: u16,
    pub seconds: u16,
    pub content_id: [u8; 20],
}

pub struct TifFixture {
    bytes: Vec<u8>,
}

impl Default for TifFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TifFixture {
    pub fn new() -> Self {
        TifFixture {
            bytes: vec![0u8; MIN_IMAGE_LEN],
        }
    }

    fn put(&mut self, off: usize, data: &[u8]) {
        self.bytes[off..off + data.len()].copy_from_slice(data);
    }

    /// Set the track count and slot map.
    pub fn slots(&mut self, slots: &[u16]) -> &mut Self {
        self.put(0x100, &(slots.len() as u16).to_be_bytes());
        for (i, idx) in slots.iter().enumerate() {
            self.put(0x102 + 2 * i, &idx.to_be_bytes());
        }
        self
    }

    pub fn track(&mut self, idx: u16, t: &TrackRecord) -> &mut Self {
        let base = TRACK_BASE + 0x50 * idx as usize;
        self.put(base + 4, &t.ekb_num.to_be_bytes());
        self.put(base + 8, &t.title.to_be_bytes());
        self.put(base + 10, &t.artist.to_be_bytes());
        self.put(base + 12, &t.album.to_be_bytes());
        self.put(base + 14, &[t.track_in_album]);
        self.put(base + 16, &t.key);
        self.put(base + 24, &t.mac);
        self.put(base + 32, &[t.codec_id]);
        self.put(base + 33, &t.codec_info[0..3]);
        self.put(base + 36, &t.first_fragment.to_be_bytes());
        self.put(base + 38, &t.track_number.to_be_bytes());
        self.put(base + 40, &t.seconds.to_be_bytes());
        self.put(base + 44, &t.codec_info[3..5]);
        self.put(base + 48, &t.content_id);
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn fragment(
        &mut self,
        idx: u16,
        key: [u8; 8],
        first_block: u16,
        last_block: u16,
        first_frame: u8,
        last_frame: u8,
        fragment_type: u8,
        next: u16,
    ) -> &mut Self {
        let base = FRAGMENT_BASE + 0x10 * idx as usize;
        self.put(base, &key);
        self.put(base + 8, &first_block.to_be_bytes());
        self.put(base + 10, &last_block.to_be_bytes());
        self.put(base + 12, &[first_frame, last_frame]);
        let word = (u16::from(fragment_type) << 12) | (next & 0x0FFF);
        self.put(base + 14, &word.to_be_bytes());
        self
    }

    /// Write one unkeyed fragment covering `first..=last` blocks.
    pub fn plain_fragment(&mut self, idx: u16, first: u16, last: u16, next: u16) -> &mut Self {
        self.fragment(idx, [0; 8], first, last, 0, 0, 1, next)
    }

    /// Write a single string chunk.
    pub fn chunk(&mut self, idx: u16, payload: &[u8], kind: u8, link: u16) -> &mut Self {
        assert!(payload.len() <= 14);
        let base = STRING_BASE + 0x10 * idx as usize;
        self.put(base, &[0u8; 14]);
        self.put(base, payload);
        let word = (u16::from(kind) << 12) | (link & 0x0FFF);
        self.put(base + 14, &word.to_be_bytes());
        self
    }

    /// Spread `raw` (selector byte included) over consecutive chunks
    /// starting at `head`. Returns the number of chunks written.
    pub fn string(&mut self, head: u16, kind: u8, raw: &[u8]) -> usize {
        let chunks: Vec<&[u8]> = if raw.is_empty() {
            vec![&[][..]]
        } else {
            raw.chunks(14).collect()
        };
        let n = chunks.len();
        for (i, payload) in chunks.into_iter().enumerate() {
            let idx = head + i as u16;
            let chunk_kind = if i == 0 { kind } else { 1 };
            let link = if i + 1 == n { 0 } else { idx + 1 };
            self.chunk(idx, payload, chunk_kind, link);
        }
        n
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn build(&self) -> TifImage {
        TifImage::new(self.bytes.clone()).expect("fixture image is full size")
    }
}

/// Encode `text` as a Latin-1 string record (selector 0x05).
pub fn latin1(text: &str) -> Vec<u8> {
    let mut out = vec![0x05];
    out.extend(text.chars().map(|c| c as u8));
    out
}

/// Encode `text` as a UTF-16BE string record (selector 0x84).
pub fn utf16be(text: &str) -> Vec<u8> {
    let mut out = vec![0x84];
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}
