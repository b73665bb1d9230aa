use crate::core::{Channels, SampleBuffer};
use crate::error::{AudioError, AudioResult};

/// Encoder that keeps the stream in memory
#[derive(Debug, Clone)]
pub struct MemoryEncoder {
    buffer: SampleBuffer,
    finalized: bool,
}

impl MemoryEncoder {
    /// Create an empty in-memory stream
    pub fn new(channels: Channels) -> Self {
        MemoryEncoder {
            buffer: SampleBuffer::empty(channels),
            finalized: false,
        }
    }

    /// Everything written so far
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Whether `finalize` has been called
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

impl super::Encoder for MemoryEncoder {
    fn encode(&mut self, buffer: &SampleBuffer) -> AudioResult<()> {
        if self.finalized {
            return Err(AudioError::EncodeError("Encoder already finalized".to_string()));
        }
        self.buffer.append(buffer)
    }

    fn finalize(&mut self) -> AudioResult<()> {
        self.finalized = true;
        Ok(())
    }
}
