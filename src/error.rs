use std::io;
use thiserror::Error;

/// Result type for resync operations
pub type AudioResult<T> = Result<T, AudioError>;

/// Error types for the resynchronization engine
#[derive(Error, Debug)]
pub enum AudioError {
    /// IO error (file operations, disk access)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Input is not an elementary stream at the declared geometry
    #[error("Format error: {0}")]
    Format(String),

    /// The source file ended before a batch could be read in full
    #[error(
        "Truncated read at frame {start_frame} (byte offset {byte_offset}): \
         expected {expected} bytes, got {got}"
    )]
    TruncatedRead {
        /// First frame of the batch being read
        start_frame: u64,
        /// Byte offset the read started at
        byte_offset: u64,
        /// Number of bytes the batch needs
        expected: u64,
        /// Number of bytes actually available
        got: u64,
    },

    /// Decoding failed
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Encoding failed
    #[error("Encode error: {0}")]
    EncodeError(String),

    /// Resampling operation failed
    #[error("Resampling error: {0}")]
    ResamplingError(String),

    /// Invalid channel configuration
    #[error("Invalid channel configuration: expected {expected}, got {got}")]
    InvalidChannels {
        /// Expected number of channels
        expected: u32,
        /// Got number of channels
        got: u32,
    },

    /// Invalid frame or sample rate
    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    /// Buffer-related error
    #[error("Buffer error: {0}")]
    BufferError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A batch arrived out of file order
    #[error("Ordering error: {0}")]
    OrderingError(String),

    /// Output totals do not add up to the planned duration
    #[error("Assembly error: {0}")]
    AssemblyError(String),
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => AudioError::Io(e),
            e => AudioError::EncodeError(e.to_string()),
        }
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(err: rubato::ResampleError) -> Self {
        AudioError::ResamplingError(err.to_string())
    }
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(err: rubato::ResamplerConstructionError) -> Self {
        AudioError::ResamplingError(err.to_string())
    }
}
