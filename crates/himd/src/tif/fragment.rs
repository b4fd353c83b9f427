use crate::binutil::{ParseError, read_array, read_u8_at, read_u16_be_at, split_type_link};
use crate::tif::image::{Table, TifImage};
use crate::tif::track::TrackInfo;

/// Default number of fragments a walk may visit before the chain is
/// considered cyclic: the whole 12-bit link space.
pub const DEFAULT_FRAGMENT_STEP_LIMIT: usize = 0x0FFF;

/// One decoded fragment record: a contiguous run of audio blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentInfo {
    /// Record index this fragment was decoded from.
    pub index: u16,
    pub key: [u8; 8],
    pub first_block: u16,
    pub last_block: u16,
    /// First frame used within `first_block`.
    pub first_frame: u8,
    /// Last frame used within `last_block`.
    pub last_frame: u8,
    pub fragment_type: u8,
    /// Link to the next fragment, 0 terminates the chain.
    pub next: u16,
}

impl FragmentInfo {
    /// Number of blocks covered, `None` if the range is reversed.
    pub fn block_count(&self) -> Option<u32> {
        (self.last_block >= self.first_block)
            .then(|| u32::from(self.last_block - self.first_block) + 1)
    }
}

impl TifImage {
    /// Decode a single fragment record.
    pub fn decode_fragment(&self, idx: u16) -> Result<FragmentInfo, ParseError> {
        let rec = self.record(Table::Fragment, idx)?;
        let (fragment_type, next) = split_type_link(read_u16_be_at(rec, 14)?);
        Ok(FragmentInfo {
            index: idx,
            key: read_array(rec, 0)?,
            first_block: read_u16_be_at(rec, 8)?,
            last_block: read_u16_be_at(rec, 10)?,
            first_frame: read_u8_at(rec, 12)?,
            last_frame: read_u8_at(rec, 13)?,
            fragment_type,
            next,
        })
    }

    /// Walk the fragment chain starting at `first`.
    ///
    /// The walk is lazy and restartable: cloning the iterator or calling this
    /// again yields the same sequence.
    pub fn walk_fragments(&self, first: u16) -> FragmentChain<'_> {
        FragmentChain::new(self, first)
    }

    /// Total number of audio blocks in the track's fragment chain.
    pub fn total_blocks(&self, track: &TrackInfo) -> Result<u32, ParseError> {
        self.total_blocks_with_limit(track, DEFAULT_FRAGMENT_STEP_LIMIT)
    }

    /// [`TifImage::total_blocks`] with an explicit walk budget.
    pub fn total_blocks_with_limit(
        &self,
        track: &TrackInfo,
        limit: usize,
    ) -> Result<u32, ParseError> {
        let mut total: u32 = 0;
        for fragment in self.walk_fragments(track.first_fragment).with_step_limit(limit) {
            let fragment = fragment?;
            let blocks = fragment
                .block_count()
                .ok_or(ParseError::InvalidBlockRange {
                    fragment: fragment.index,
                    first_block: fragment.first_block,
                    last_block: fragment.last_block,
                })?;
            total = total.saturating_add(blocks);
        }
        Ok(total)
    }
}

/// Lazy iterator over a fragment chain.
///
/// Yields one `Ok` per fragment in playback order. A lookup failure or an
/// exhausted step budget is yielded once as `Err` and ends the iteration.
#[derive(Debug, Clone)]
pub struct FragmentChain<'a> {
    image: &'a TifImage,
    first: u16,
    next: u16,
    steps: usize,
    limit: usize,
    done: bool,
}

impl<'a> FragmentChain<'a> {
    pub fn new(image: &'a TifImage, first: u16) -> Self {
        FragmentChain {
            image,
            first,
            next: first,
            steps: 0,
            limit: DEFAULT_FRAGMENT_STEP_LIMIT,
            done: false,
        }
    }

    /// Replace the step budget. A chain longer than `limit` fragments is
    /// reported as [`ParseError::FragmentChainLoops`].
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Fragments visited so far.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl Iterator for FragmentChain<'_> {
    type Item = Result<FragmentInfo, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next == 0 {
            return None;
        }
        if self.steps >= self.limit {
            self.done = true;
            tracing::debug!(first = self.first, steps = self.steps, "fragment chain loops");
            return Some(Err(ParseError::FragmentChainLoops {
                first: self.first,
                steps: self.steps,
            }));
        }
        match self.image.decode_fragment(self.next) {
            Ok(fragment) => {
                tracing::trace!(index = fragment.index, next = fragment.next, "fragment");
                self.steps += 1;
                self.next = fragment.next;
                Some(Ok(fragment))
            }
            Err(e) => {
                self.done = true;
                tracing::debug!(first = self.first, error = %e, "fragment chain broken");
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for FragmentChain<'_> {}
