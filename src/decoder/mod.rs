//! Audio decode collaborators and per-batch recovery

pub mod dv;
pub mod recovery;

pub use dv::{DvAudioDecoder, DvAudioFormat, Quantization};
pub use recovery::{AudioRecoveryUnit, GroupRecovery};

use crate::core::SampleBuffer;
use crate::error::AudioResult;
use crate::source::FrameSegment;

/// Per-frame audio decoded from one segment, grouped by channel group
#[derive(Debug, Clone, Default)]
pub struct DecodedSegment {
    groups: Vec<Vec<SampleBuffer>>,
}

impl DecodedSegment {
    /// Wrap decoded audio as `groups[group][frame]`
    pub fn new(groups: Vec<Vec<SampleBuffer>>) -> Self {
        DecodedSegment { groups }
    }

    /// Number of channel groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Per-frame buffers of one group; an empty buffer means no audio for that frame
    pub fn group(&self, group: usize) -> Option<&[SampleBuffer]> {
        self.groups.get(group).map(Vec::as_slice)
    }
}

/// Trait for audio decode capabilities
///
/// Implementations see exactly the frames of one segment and keep no state
/// that depends on previously decoded segments.
pub trait AudioDecoder {
    /// Decode `channel_groups` groups of audio, one buffer per frame of `segment`
    fn decode(
        &mut self,
        segment: &FrameSegment,
        channel_groups: usize,
    ) -> AudioResult<DecodedSegment>;
}
