use crate::core::RationalRate;
use crate::core::rational::gcd;
use crate::error::{AudioError, AudioResult};

/// Contiguous run of video frames processed as one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    /// First frame of the batch
    pub start_frame: u64,
    /// Number of frames in the batch
    pub frame_count: u32,
    /// Audio samples the batch should hold at the nominal rate
    pub expected_sample_count: u64,
    /// Final batch shorter than the planned size; its expected count was rounded
    pub partial: bool,
}

impl Batch {
    /// One past the last frame of the batch
    pub fn end_frame(&self) -> u64 {
        self.start_frame + self.frame_count as u64
    }
}

/// Splits a video timeline into the smallest batches that hold a whole
/// number of audio samples
///
/// NTSC video at 30000/1001 fps with 32 kHz audio gives 16016 samples every
/// 15 frames; no shorter run of frames has an integral sample count.
#[derive(Debug, Clone, Copy)]
pub struct BatchPlanner {
    frame_count: u32,
    expected_sample_count: u64,
}

impl BatchPlanner {
    /// Derive the batch size for a rate pair
    pub fn new(video_rate: RationalRate, audio_rate: RationalRate) -> AudioResult<Self> {
        let overflow = || {
            AudioError::InvalidRate(format!(
                "Rate pair {} fps / {} Hz overflows batch planning",
                video_rate, audio_rate
            ))
        };

        // samples per frame = (audio.num * video.den) / (audio.den * video.num)
        let numerator = audio_rate
            .numerator()
            .checked_mul(video_rate.denominator())
            .ok_or_else(overflow)?;
        let denominator = audio_rate
            .denominator()
            .checked_mul(video_rate.numerator())
            .ok_or_else(overflow)?;
        let g = gcd(numerator, denominator);

        let frame_count = u32::try_from(denominator / g).map_err(|_| overflow())?;

        Ok(BatchPlanner {
            frame_count,
            expected_sample_count: numerator / g,
        })
    }

    /// Frames in every full batch
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Samples in every full batch
    pub fn expected_sample_count(&self) -> u64 {
        self.expected_sample_count
    }

    /// Expected samples for a run of `frames` frames, rounded half up
    ///
    /// Ties always round up, never to even: NTSC at 44.1 kHz with a
    /// 50-frame tail expects 73574 samples, not 73573.
    pub fn expected_for(&self, frames: u32) -> u64 {
        let fc = self.frame_count as u128;
        let scaled = 2 * frames as u128 * self.expected_sample_count as u128 + fc;
        (scaled / (2 * fc)) as u64
    }

    /// Cover `total_frames` frames with batches in file order
    pub fn plan(&self, total_frames: u64) -> Vec<Batch> {
        let step = self.frame_count as u64;
        (0..total_frames)
            .step_by(step as usize)
            .map(|start_frame| {
                let frame_count = step.min(total_frames - start_frame) as u32;
                Batch {
                    start_frame,
                    frame_count,
                    expected_sample_count: self.expected_for(frame_count),
                    partial: frame_count < self.frame_count,
                }
            })
            .collect()
    }
}
