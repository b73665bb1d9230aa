//! Output stream encoders

pub mod memory;
pub mod wav;

pub use memory::MemoryEncoder;
pub use wav::WavEncoder;

use crate::core::SampleBuffer;
use crate::error::AudioResult;

/// Trait for per-channel-group output streams
pub trait Encoder {
    /// Append a buffer to the stream
    fn encode(&mut self, buffer: &SampleBuffer) -> AudioResult<()>;

    /// Finalize encoding (flush any remaining data)
    fn finalize(&mut self) -> AudioResult<()> {
        Ok(())
    }
}
