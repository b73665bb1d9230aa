#![warn(missing_docs)]

//! # DV-Resync: Frame-Locked Audio Resynchronization
//!
//! Restores audio/video sync in raw DV tape transfers recorded with an
//! unlocked audio clock.
//!
//! The video timeline is split into the smallest batches of frames that hold
//! a whole number of audio samples. Each batch is read straight from its
//! byte offset in the source file, its audio is decoded in isolation, and
//! the result is forced to exactly the expected sample count before being
//! appended to the output. A per-batch ledger records every correction.
//!
//! ## Quick Start
//!
//! ```ignore
//! use dv_resync::decoder::{dv, DvAudioDecoder};
//! use dv_resync::encoder::WavEncoder;
//! use dv_resync::filter::SincResampler;
//! use dv_resync::processor::Resyncer;
//!
//! let format = dv::probe_file("tape.dv")?;
//! let config = format.to_config()?;
//! let encoders = (0..config.channel_groups)
//!     .map(|g| {
//!         let path = WavEncoder::group_path("tape.wav", g);
//!         WavEncoder::new(path, format.sample_rate, config.channels)
//!     })
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! let mut engine = Resyncer::new(config, DvAudioDecoder::new(format), SincResampler::new())?;
//! let output = engine.run("tape.dv", encoders)?;
//! output.ledger.save_csv("tape.csv")?;
//! ```

/// Run configuration
pub mod config;
/// Core audio and rate types
pub mod core;
/// Audio decode collaborators and recovery
pub mod decoder;
/// Output stream encoders
pub mod encoder;
/// Error types for resync operations
pub mod error;
/// Resample collaborators and drift correction
pub mod filter;
/// Batch planning, ledger and pipeline
pub mod processor;
/// Raw stream addressing and extraction
pub mod source;

pub use config::{DvSystem, ResyncConfig};
pub use core::{Channels, RationalRate, SampleBuffer};
pub use error::{AudioError, AudioResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
