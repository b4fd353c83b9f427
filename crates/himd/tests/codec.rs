mod common;

use common::{TifFixture, TrackRecord};
use himd::Codec;
use himd::codec::{CODEC_ATRAC3, CODEC_ATRAC3PLUS_OR_MPEG, CODEC_LPCM};

fn decode(codec_id: u8, codec_info: [u8; 5]) -> himd::TrackInfo {
    let mut fx = TifFixture::new();
    fx.track(
        1,
        &TrackRecord {
            codec_id,
            codec_info,
            first_fragment: 1,
            ..Default::default()
        },
    );
    fx.build().decode_track(1).unwrap()
}

#[test]
fn lpcm_geometry() {
    let t = decode(CODEC_LPCM, [0; 5]);
    assert_eq!(t.codec(), Codec::Lpcm);
    assert_eq!(t.codec_name(), "LPCM");
    assert_eq!(t.frame_size(), 64);
    // 0x3FC0 / 64
    assert_eq!(t.frames_per_block(), Some(255));
}

#[test]
fn atrac3_geometry() {
    // 132 kbps: 0x30 * 8 = 384 byte frames
    let t = decode(CODEC_ATRAC3, [0x00, 0x00, 0x30, 0, 0]);
    assert_eq!(t.codec_name(), "AT3 ");
    assert_eq!(t.frame_size(), 384);
    // 0x3FBF / 384 = 16319 / 384
    assert_eq!(t.frames_per_block(), Some(42));
}

#[test]
fn atrac3plus_geometry() {
    // 256 kbps: (0x3F + 1) * 8 = 512 byte frames
    let t = decode(CODEC_ATRAC3PLUS_OR_MPEG, [0x28, 0x5C, 0x3F, 0, 0]);
    assert_eq!(t.codec(), Codec::Atrac3Plus { frame_words: 0x3F });
    assert_eq!(t.codec_name(), "AT3+");
    assert_eq!(t.frame_size(), 512);
    // 16319 / 512
    assert_eq!(t.frames_per_block(), Some(31));
}

#[test]
fn mpeg_has_no_frame_geometry() {
    for low_bits in 1u8..=3 {
        let t = decode(CODEC_ATRAC3PLUS_OR_MPEG, [0x04 | low_bits, 0, 0x3F, 0, 0]);
        assert_eq!(t.codec(), Codec::Mpeg { mode: low_bits });
        assert_eq!(t.codec_name(), "MPEG");
        assert_eq!(t.frame_size(), 0);
        assert_eq!(t.frames_per_block(), None);
    }
}

#[test]
fn unknown_codec_renders_its_id() {
    let t = decode(0x7B, [0x12; 5]);
    assert_eq!(t.codec(), Codec::Unknown(0x7B));
    assert_eq!(t.codec_name(), " 123");
    assert_eq!(t.frame_size(), 0);
    assert_eq!(t.frames_per_block(), None);
}
