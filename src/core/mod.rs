//! Core audio and rate types

/// Sample buffers and channel layouts
pub mod audio;
/// Exact rational rates
pub mod rational;

pub use audio::{Channels, SampleBuffer};
pub use rational::RationalRate;
