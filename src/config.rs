//! Run configuration

use crate::core::{Channels, RationalRate};
use crate::error::{AudioError, AudioResult};

/// Largest pad/truncate correction, in samples, applied without resampling
pub const DEFAULT_SMALL_DIFF_THRESHOLD: u64 = 2;

/// Size of one DIF block in bytes
pub const DIF_BLOCK_SIZE: u64 = 80;

/// Number of DIF blocks in one DIF sequence
pub const DIF_BLOCKS_PER_SEQUENCE: u64 = 150;

/// Size of one DIF sequence in bytes
pub const DIF_SEQUENCE_SIZE: u64 = DIF_BLOCK_SIZE * DIF_BLOCKS_PER_SEQUENCE;

/// DV television system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DvSystem {
    /// 525 lines, 60 fields (NTSC)
    Ntsc,
    /// 625 lines, 50 fields (PAL/SECAM)
    Pal,
}

impl DvSystem {
    /// Exact video frame rate
    pub fn frame_rate(&self) -> RationalRate {
        match self {
            DvSystem::Ntsc => RationalRate::NTSC,
            DvSystem::Pal => RationalRate::PAL,
        }
    }

    /// DIF sequences per DIF channel in one frame
    pub fn dif_sequences(&self) -> u64 {
        match self {
            DvSystem::Ntsc => 10,
            DvSystem::Pal => 12,
        }
    }

    /// Bytes per frame for the given number of DIF channels (1 for 25 Mbit/s DV)
    pub fn frame_size(&self, dif_channels: u64) -> u64 {
        self.dif_sequences() * DIF_SEQUENCE_SIZE * dif_channels
    }

    /// Get system name
    pub fn name(&self) -> &'static str {
        match self {
            DvSystem::Ntsc => "525/60 (NTSC)",
            DvSystem::Pal => "625/50 (PAL)",
        }
    }
}

/// Parameters of one resync run
#[derive(Debug, Clone)]
pub struct ResyncConfig {
    /// Declared video frame rate
    pub video_rate: RationalRate,
    /// Nominal audio sample rate
    pub audio_rate: RationalRate,
    /// Bytes per video frame in the elementary stream
    pub frame_size: u64,
    /// Number of independent channel groups
    pub channel_groups: usize,
    /// Channel layout of each group
    pub channels: Channels,
    /// Largest difference corrected by pad/truncate instead of resampling
    pub small_diff_threshold: u64,
}

impl ResyncConfig {
    /// Create a config with one stereo channel group and the default threshold
    pub fn new(video_rate: RationalRate, audio_rate: RationalRate, frame_size: u64) -> Self {
        ResyncConfig {
            video_rate,
            audio_rate,
            frame_size,
            channel_groups: 1,
            channels: Channels::Stereo,
            small_diff_threshold: DEFAULT_SMALL_DIFF_THRESHOLD,
        }
    }

    /// Set the number of channel groups
    pub fn with_channel_groups(mut self, channel_groups: usize) -> Self {
        self.channel_groups = channel_groups;
        self
    }

    /// Set the channel layout of every group
    pub fn with_channels(mut self, channels: Channels) -> Self {
        self.channels = channels;
        self
    }

    /// Set the pad/truncate threshold
    pub fn with_small_diff_threshold(mut self, threshold: u64) -> Self {
        self.small_diff_threshold = threshold;
        self
    }

    /// Check the config is usable
    pub fn validate(&self) -> AudioResult<()> {
        if self.frame_size == 0 {
            return Err(AudioError::ConfigError(
                "Frame size must be non-zero".to_string(),
            ));
        }
        if self.channel_groups == 0 {
            return Err(AudioError::ConfigError(
                "At least one channel group is required".to_string(),
            ));
        }
        Ok(())
    }
}
