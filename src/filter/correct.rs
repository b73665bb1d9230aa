use super::Resampler;
use crate::core::SampleBuffer;
use crate::decoder::GroupRecovery;
use crate::processor::Batch;
use log::{debug, warn};
use std::collections::BTreeSet;

/// How a batch's audio was brought to its expected length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionKind {
    /// Length already matched; samples emitted unchanged
    PassThrough,
    /// Silence appended or excess dropped at the tail
    PadOrTruncate,
    /// Stretched or compressed by the resample capability
    Resample,
    /// Resampling failed; the batch was replaced by silence
    ResampleFailed,
}

impl CorrectionKind {
    /// Marker used in the ledger
    pub fn marker(&self) -> &'static str {
        match self {
            CorrectionKind::PassThrough => "pass_through",
            CorrectionKind::PadOrTruncate => "pad_or_truncate",
            CorrectionKind::Resample => "resample",
            CorrectionKind::ResampleFailed => "resample_failed",
        }
    }
}

/// Corrected audio of one channel group for one batch
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Batch the audio belongs to
    pub batch: Batch,
    /// Channel group index
    pub group: usize,
    /// Samples actually decoded
    pub actual_sample_count: u64,
    /// Silence inserted for missing frames before correction
    pub backfilled_sample_count: u64,
    /// Frames that yielded no audio
    pub missing_frames: BTreeSet<u64>,
    /// The decoder failed for the whole batch
    pub decode_failed: bool,
    /// Correction that was applied
    pub correction_applied: CorrectionKind,
    /// Audio of exactly `batch.expected_sample_count` samples
    pub corrected_samples: SampleBuffer,
}

impl BatchResult {
    /// Decoded minus expected samples
    pub fn diff_sample_count(&self) -> i64 {
        self.actual_sample_count as i64 - self.batch.expected_sample_count as i64
    }
}

/// Forces each batch's audio to its expected sample count with the least
/// invasive correction
pub struct DriftCorrector<R: Resampler> {
    resampler: R,
    small_diff_threshold: u64,
}

impl<R: Resampler> DriftCorrector<R> {
    /// Create a corrector delegating large differences to `resampler`
    pub fn new(resampler: R, small_diff_threshold: u64) -> Self {
        DriftCorrector {
            resampler,
            small_diff_threshold,
        }
    }

    /// Correction needed to turn `available` samples into `expected`
    pub fn decide(available: u64, expected: u64, small_diff_threshold: u64) -> CorrectionKind {
        match available.abs_diff(expected) {
            0 => CorrectionKind::PassThrough,
            d if d <= small_diff_threshold => CorrectionKind::PadOrTruncate,
            _ => CorrectionKind::Resample,
        }
    }

    /// Correct one group's recovered audio
    ///
    /// The decision is made on the recovered buffer, which already holds
    /// silence in place of missing frames.
    pub fn correct(&mut self, batch: &Batch, recovery: GroupRecovery) -> BatchResult {
        let GroupRecovery {
            group,
            samples,
            actual_sample_count,
            backfilled_sample_count,
            missing_frames,
            decode_failed,
        } = recovery;

        let expected = batch.expected_sample_count;
        let available = samples.sample_count() as u64;
        let channels = samples.channels();

        let (correction_applied, corrected_samples) =
            match Self::decide(available, expected, self.small_diff_threshold) {
                CorrectionKind::PassThrough => (CorrectionKind::PassThrough, samples),
                CorrectionKind::PadOrTruncate => {
                    let mut samples = samples;
                    samples.resize(expected as usize);
                    (CorrectionKind::PadOrTruncate, samples)
                }
                _ => match self.resampler.resample(&samples, expected as usize) {
                    Ok(resampled)
                        if resampled.sample_count() as u64 == expected
                            && resampled.channels() == channels =>
                    {
                        (CorrectionKind::Resample, resampled)
                    }
                    Ok(resampled) => {
                        warn!(
                            "Frames {}..{} group {}: resampler returned {} samples, \
                             wanted {}; emitting silence",
                            batch.start_frame,
                            batch.end_frame(),
                            group,
                            resampled.sample_count(),
                            expected
                        );
                        (
                            CorrectionKind::ResampleFailed,
                            SampleBuffer::silence(expected as usize, channels),
                        )
                    }
                    Err(e) => {
                        warn!(
                            "Frames {}..{} group {}: {}; emitting silence",
                            batch.start_frame,
                            batch.end_frame(),
                            group,
                            e
                        );
                        (
                            CorrectionKind::ResampleFailed,
                            SampleBuffer::silence(expected as usize, channels),
                        )
                    }
                },
            };

        debug!(
            "Frames {}..{} group {}: {} of {} samples, {}",
            batch.start_frame,
            batch.end_frame(),
            group,
            available,
            expected,
            correction_applied.marker()
        );

        BatchResult {
            batch: *batch,
            group,
            actual_sample_count,
            backfilled_sample_count,
            missing_frames,
            decode_failed,
            correction_applied,
            corrected_samples,
        }
    }
}
