//! Batch planning, drift accounting and the resync pipeline

pub mod assemble;
pub mod pipeline;
pub mod plan;
pub mod stats;

pub use assemble::StreamAssembler;
pub use pipeline::{ResyncOutput, Resyncer};
pub use plan::{Batch, BatchPlanner};
pub use stats::{DriftLedgerRow, StatsRecorder};

use crate::filter::{BatchResult, CorrectionKind};

/// Summary of a resync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    /// Total video frames processed
    pub frames_processed: u64,
    /// Total batches processed
    pub batches_processed: u64,
    /// Samples written per channel group
    pub samples_emitted: Vec<u64>,
    /// Frame/group pairs that yielded no audio
    pub missing_frames: u64,
    /// Group batches lost to decoder failures
    pub decode_failures: u64,
    /// Group batches corrected by pad/truncate
    pub padded_or_truncated: u64,
    /// Group batches corrected by resampling
    pub resampled: u64,
    /// Group batches replaced by silence after a resample failure
    pub resample_failures: u64,
}

impl ProcessingStats {
    fn new(channel_groups: usize) -> Self {
        ProcessingStats {
            samples_emitted: vec![0; channel_groups],
            ..Default::default()
        }
    }

    fn add(&mut self, result: &BatchResult) {
        if let Some(emitted) = self.samples_emitted.get_mut(result.group) {
            *emitted += result.corrected_samples.sample_count() as u64;
        }
        self.missing_frames += result.missing_frames.len() as u64;
        if result.decode_failed {
            self.decode_failures += 1;
        }
        match result.correction_applied {
            CorrectionKind::PassThrough => {}
            CorrectionKind::PadOrTruncate => self.padded_or_truncated += 1,
            CorrectionKind::Resample => self.resampled += 1,
            CorrectionKind::ResampleFailed => self.resample_failures += 1,
        }
    }
}
