#![doc = include_str!("../README.md")]
//! himd — decoder for the track index of Hi-MD portable recorders
//!
//! A Hi-MD disc describes its audio in a single binary table of contents,
//! the track index file (TIF). This crate interprets a loaded TIF image:
//!
//! - Track records: codec, key material, string references and the head of
//!   the fragment chain of every track slot.
//! - Fragment chains: the linked list of block runs that make up a track's
//!   audio, walked lazily with a step budget so that cyclic chains end in
//!   an error instead of a hang.
//! - String chains: linked 14-byte chunks holding titles, artists and album
//!   names in Latin-1, UTF-16BE or Shift-JIS.
//! - Policy derived from the metadata: codec names, frame geometry, and
//!   whether a track may be extracted without decryption.
//!
//! Loading the image (from disc or a file) is up to the caller. Every
//! decoder borrows the image read-only and returns its own `Result`; no
//! error state is kept between calls.
//!
//! Example: listing the tracks of an image
//!
//! ```rust
//! use himd::{ErrorKind, MIN_IMAGE_LEN, TifImage};
//!
//! // A blank image: no tracks, every slot empty.
//! let image = TifImage::new(vec![0u8; MIN_IMAGE_LEN]).expect("image is long enough");
//! assert_eq!(image.track_count(), 0);
//! assert_eq!(image.tracks().count(), 0);
//!
//! // Slot 1 exists but is unoccupied.
//! let err = image.decode_track(1).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::NotPresent);
//! ```
//!
//! Example: walking a track's metadata
//!
//! ```no_run
//! use himd::TifImage;
//!
//! let bytes: Vec<u8> = std::fs::read("TRKIDX01.HMA").unwrap();
//! let image = TifImage::new(bytes).unwrap();
//! for (position, track) in image.tracks() {
//!     let Ok(track) = track else { continue };
//!     let strings = image.track_strings(&track);
//!     let title = strings.title.and_then(Result::ok).unwrap_or_default();
//!     println!(
//!         "{:3} {} {} {} blocks, uploadable: {}",
//!         position + 1,
//!         track.codec_name(),
//!         title,
//!         image.total_blocks(&track).unwrap_or(0),
//!         image.is_uploadable(&track),
//!     );
//! }
//! ```
mod binutil;
pub mod codec;
pub mod meta;
pub mod tif;

pub use binutil::{ChainBreak, ErrorKind, ParseError};
pub use codec::Codec;
pub use meta::{ConversionError, TextEncoding};
pub use tif::{
    DecodedString, FIRST_STRING, FIRST_TRACK, FragmentChain, FragmentInfo, LAST_STRING,
    LAST_TRACK, MIN_IMAGE_LEN, RawString, StringCategory, StringChunk, Table, TifImage,
    TrackInfo, TrackStrings, Tracks,
};
