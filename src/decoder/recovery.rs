use super::{AudioDecoder, DecodedSegment};
use crate::core::{Channels, SampleBuffer};
use crate::error::{AudioError, AudioResult};
use crate::processor::Batch;
use crate::source::FrameSegment;
use log::warn;
use std::collections::BTreeSet;

/// Audio recovered for one channel group of one batch
#[derive(Debug, Clone)]
pub struct GroupRecovery {
    /// Channel group index
    pub group: usize,
    /// Recovered audio with silence standing in for missing frames
    pub samples: SampleBuffer,
    /// Samples actually decoded; backfill is not counted
    pub actual_sample_count: u64,
    /// Silence inserted for missing frames
    pub backfilled_sample_count: u64,
    /// Absolute numbers of frames that yielded no audio
    pub missing_frames: BTreeSet<u64>,
    /// The decoder failed outright and the whole batch was backfilled
    pub decode_failed: bool,
}

impl GroupRecovery {
    fn new(group: usize, channels: Channels) -> Self {
        GroupRecovery {
            group,
            samples: SampleBuffer::empty(channels),
            actual_sample_count: 0,
            backfilled_sample_count: 0,
            missing_frames: BTreeSet::new(),
            decode_failed: false,
        }
    }

    /// Fill the slot of batch frame `relative` with its share of the expected samples
    ///
    /// Shares are dithered so a run of missing frames adds up to the batch's
    /// expected count instead of accumulating rounding error.
    fn backfill(&mut self, batch: &Batch, relative: u64) -> AudioResult<()> {
        let share = |r: u64| {
            let n = batch.frame_count as u128;
            ((2 * r as u128 * batch.expected_sample_count as u128 + n) / (2 * n)) as u64
        };
        let count = share(relative + 1) - share(relative);

        self.samples
            .append(&SampleBuffer::silence(count as usize, self.samples.channels()))?;
        self.backfilled_sample_count += count;
        self.missing_frames.insert(batch.start_frame + relative);
        Ok(())
    }
}

/// Runs the decode capability on an isolated segment and gathers its audio
/// per channel group
#[derive(Debug, Clone, Copy)]
pub struct AudioRecoveryUnit {
    channel_groups: usize,
    channels: Channels,
}

impl AudioRecoveryUnit {
    /// Create a recovery unit for `channel_groups` groups of `channels` each
    pub fn new(channel_groups: usize, channels: Channels) -> Self {
        AudioRecoveryUnit {
            channel_groups,
            channels,
        }
    }

    /// Recover every channel group of `batch`
    ///
    /// Never fails: a decoder error turns the whole batch into missing frames.
    pub fn recover<D>(
        &self,
        decoder: &mut D,
        segment: &FrameSegment,
        batch: &Batch,
    ) -> Vec<GroupRecovery>
    where
        D: AudioDecoder + ?Sized,
    {
        let decoded = decoder
            .decode(segment, self.channel_groups)
            .and_then(|decoded| self.collect(&decoded, batch));

        match decoded {
            Ok(groups) => groups,
            Err(e) => {
                warn!(
                    "Frames {}..{}: {}; treating batch as missing",
                    batch.start_frame,
                    batch.end_frame(),
                    e
                );
                (0..self.channel_groups)
                    .map(|group| self.missing_group(group, batch))
                    .collect()
            }
        }
    }

    fn collect(&self, decoded: &DecodedSegment, batch: &Batch) -> AudioResult<Vec<GroupRecovery>> {
        if decoded.group_count() != self.channel_groups {
            return Err(AudioError::DecodeError(format!(
                "Decoder returned {} channel groups, expected {}",
                decoded.group_count(),
                self.channel_groups
            )));
        }

        let mut groups = Vec::with_capacity(self.channel_groups);
        for group in 0..self.channel_groups {
            let frames = decoded.group(group).unwrap_or_default();
            if frames.len() != batch.frame_count as usize {
                return Err(AudioError::DecodeError(format!(
                    "Decoder returned {} frames for group {}, expected {}",
                    frames.len(),
                    group,
                    batch.frame_count
                )));
            }

            let mut recovery = GroupRecovery::new(group, self.channels);
            for (relative, buffer) in frames.iter().enumerate() {
                if buffer.is_empty() {
                    recovery.backfill(batch, relative as u64)?;
                } else {
                    recovery.samples.append(buffer)?;
                    recovery.actual_sample_count += buffer.sample_count() as u64;
                }
            }

            if !recovery.missing_frames.is_empty() {
                warn!(
                    "Group {}: no audio in frames {:?}",
                    group, recovery.missing_frames
                );
            }
            groups.push(recovery);
        }
        Ok(groups)
    }

    fn missing_group(&self, group: usize, batch: &Batch) -> GroupRecovery {
        let mut recovery = GroupRecovery::new(group, self.channels);
        recovery.decode_failed = true;
        recovery.backfilled_sample_count = batch.expected_sample_count;
        recovery.samples =
            SampleBuffer::silence(batch.expected_sample_count as usize, self.channels);
        recovery.missing_frames = (batch.start_frame..batch.end_frame()).collect();
        recovery
    }
}
