//! Codec identification and frame geometry.
//!
//! A track record stores a one byte codec id plus a five byte parameter
//! blob. [`Codec::from_raw`] resolves both into a closed variant once, and
//! every derived quantity is a match over that variant.

/// Codec id of linear PCM tracks.
pub const CODEC_LPCM: u8 = 0x80;
/// Codec id of ATRAC3 tracks.
pub const CODEC_ATRAC3: u8 = 0x00;
/// Codec id shared by ATRAC3plus and MPEG tracks; the low two bits of
/// `codec_info[0]` tell them apart.
pub const CODEC_ATRAC3PLUS_OR_MPEG: u8 = 0x01;

/// Bytes per LPCM frame.
pub const LPCM_FRAME_SIZE: u32 = 64;

/// Usable payload bytes of an audio block for LPCM.
const LPCM_BLOCK_BYTES: u32 = 0x3FC0;
/// Usable payload bytes of an audio block for every other fixed-frame codec.
const BLOCK_BYTES: u32 = 0x3FBF;

/// A track's codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Lpcm,
    /// `frame_words` is `codec_info[2]`; frames are `8 * frame_words` bytes.
    Atrac3 { frame_words: u8 },
    /// `frame_words` is `codec_info[2]`; frames are `8 * (frame_words + 1)` bytes.
    Atrac3Plus { frame_words: u8 },
    /// `mode` holds the low two bits of `codec_info[0]` (1..=3). Mode 3 is
    /// plain, unencrypted MPEG audio.
    Mpeg { mode: u8 },
    Unknown(u8),
}

impl Codec {
    pub fn from_raw(codec_id: u8, codec_info: &[u8; 5]) -> Self {
        match codec_id {
            CODEC_LPCM => Codec::Lpcm,
            CODEC_ATRAC3 => Codec::Atrac3 {
                frame_words: codec_info[2],
            },
            CODEC_ATRAC3PLUS_OR_MPEG => match codec_info[0] & 3 {
                0 => Codec::Atrac3Plus {
                    frame_words: codec_info[2],
                },
                mode => Codec::Mpeg { mode },
            },
            other => Codec::Unknown(other),
        }
    }

    /// Four character display name. Unknown codecs render their id as a
    /// right-aligned decimal number.
    pub fn name(&self) -> String {
        match self {
            Codec::Lpcm => "LPCM".into(),
            Codec::Atrac3 { .. } => "AT3 ".into(),
            Codec::Atrac3Plus { .. } => "AT3+".into(),
            Codec::Mpeg { .. } => "MPEG".into(),
            Codec::Unknown(id) => format!("{:4}", id),
        }
    }

    /// Bytes per frame; 0 means the codec has no fixed frame size.
    pub fn frame_size(&self) -> u32 {
        match self {
            Codec::Lpcm => LPCM_FRAME_SIZE,
            Codec::Atrac3 { frame_words } => 8 * u32::from(*frame_words),
            Codec::Atrac3Plus { frame_words } => 8 * (u32::from(*frame_words) + 1),
            Codec::Mpeg { .. } | Codec::Unknown(_) => 0,
        }
    }

    /// Frames per audio block.
    ///
    /// `None` means the stream is not block aligned (MPEG, unknown codecs,
    /// or a degenerate zero frame size).
    pub fn frames_per_block(&self) -> Option<u32> {
        let frame_size = self.frame_size();
        if frame_size == 0 {
            return None;
        }
        match self {
            Codec::Lpcm => Some(LPCM_BLOCK_BYTES / frame_size),
            _ => Some(BLOCK_BYTES / frame_size),
        }
    }

    /// Plain MPEG audio is stored without device encryption.
    pub fn is_plain_mpeg(&self) -> bool {
        matches!(self, Codec::Mpeg { mode: 3 })
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}
