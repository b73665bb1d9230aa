//! Resample collaborators and drift correction

pub mod correct;
pub mod resample;

pub use correct::{BatchResult, CorrectionKind, DriftCorrector};
pub use resample::{LinearResampler, SincResampler};

use crate::core::SampleBuffer;
use crate::error::AudioResult;

/// Trait for resample capabilities
pub trait Resampler {
    /// Stretch or compress `input` to exactly `target_count` samples per channel
    fn resample(&mut self, input: &SampleBuffer, target_count: usize) -> AudioResult<SampleBuffer>;
}

impl<R: Resampler + ?Sized> Resampler for Box<R> {
    fn resample(&mut self, input: &SampleBuffer, target_count: usize) -> AudioResult<SampleBuffer> {
        (**self).resample(input, target_count)
    }
}
