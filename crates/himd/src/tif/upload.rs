use crate::tif::fragment::DEFAULT_FRAGMENT_STEP_LIMIT;
use crate::tif::image::TifImage;
use crate::tif::track::TrackInfo;

/// EKB number of tracks written without device encryption.
pub const LEGACY_EKB_NUMBER: u32 = 0x0001_0012;

const ZERO_KEY: [u8; 8] = [0; 8];

impl TifImage {
    /// Whether the audio of `track` can be extracted as-is.
    ///
    /// Plain MPEG tracks always qualify. Any other track qualifies only when
    /// it carries the all-zero content key under the legacy EKB and every
    /// fragment of its chain carries the all-zero key as well. A fragment
    /// chain that cannot be walked makes the track not uploadable.
    pub fn is_uploadable(&self, track: &TrackInfo) -> bool {
        self.is_uploadable_with_limit(track, DEFAULT_FRAGMENT_STEP_LIMIT)
    }

    /// [`TifImage::is_uploadable`] with an explicit fragment walk budget.
    pub fn is_uploadable_with_limit(&self, track: &TrackInfo, limit: usize) -> bool {
        if track.codec().is_plain_mpeg() {
            return true;
        }
        if track.key != ZERO_KEY || track.ekb_num != LEGACY_EKB_NUMBER {
            return false;
        }
        for fragment in self.walk_fragments(track.first_fragment).with_step_limit(limit) {
            match fragment {
                Ok(f) if f.key == ZERO_KEY => {}
                Ok(f) => {
                    tracing::debug!(track = track.index, fragment = f.index, "fragment is keyed");
                    return false;
                }
                Err(e) => {
                    tracing::debug!(track = track.index, error = %e, "treating track as protected");
                    return false;
                }
            }
        }
        true
    }
}
