//! Track index (TIF) image access and record decoders.
//!
//! The image is a flat buffer holding a slot map followed by three
//! fixed-stride tables (tracks, fragments, string chunks). `TifImage`
//! validates the buffer once and every decoder below borrows it
//! read-only, so any number of readers may share one image.
mod fragment;
mod image;
mod string;
mod track;
mod upload;

pub use fragment::{FragmentChain, FragmentInfo, DEFAULT_FRAGMENT_STEP_LIMIT};
pub use image::{
    FIRST_STRING, FIRST_TRACK, LAST_STRING, LAST_TRACK, MIN_IMAGE_LEN, Table, TifImage, Tracks,
};
pub use string::{
    DecodedString, MAX_STRING_CHUNKS, RawString, STRING_PAYLOAD_LEN, StringCategory, StringChunk,
    STRING_TYPE_ALBUM, STRING_TYPE_ARTIST, STRING_TYPE_CONTINUATION, STRING_TYPE_GROUP,
    STRING_TYPE_TITLE, STRING_TYPE_UNUSED, TrackStrings,
};
pub use track::TrackInfo;
pub use upload::LEGACY_EKB_NUMBER;
