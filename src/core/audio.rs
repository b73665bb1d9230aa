use crate::error::{AudioError, AudioResult};

/// Channel configuration of one channel group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// Mono (1 channel)
    Mono = 1,
    /// Stereo (2 channels)
    Stereo = 2,
}

impl Channels {
    /// Get the number of channels
    pub fn count(&self) -> u32 {
        *self as u32
    }

    /// Get channel layout name
    pub fn name(&self) -> &'static str {
        match self {
            Channels::Mono => "Mono",
            Channels::Stereo => "Stereo",
        }
    }
}

/// Owned buffer of interleaved signed 16-bit samples for one channel group
///
/// A "sample" in counts below is one sample per channel (one interleaved
/// tuple), matching how sample rates are counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    /// Interleaved samples
    samples: Vec<i16>,
    /// Channel layout of the interleaving
    channels: Channels,
}

impl SampleBuffer {
    /// Wrap interleaved samples
    pub fn new(samples: Vec<i16>, channels: Channels) -> AudioResult<Self> {
        if samples.len() % channels.count() as usize != 0 {
            return Err(AudioError::BufferError(format!(
                "{} samples not divisible by {} channels",
                samples.len(),
                channels.count()
            )));
        }

        Ok(SampleBuffer { samples, channels })
    }

    /// Empty buffer
    pub fn empty(channels: Channels) -> Self {
        SampleBuffer {
            samples: Vec::new(),
            channels,
        }
    }

    /// Buffer of `sample_count` zero-valued samples per channel
    pub fn silence(sample_count: usize, channels: Channels) -> Self {
        SampleBuffer {
            samples: vec![0; sample_count * channels.count() as usize],
            channels,
        }
    }

    /// Get reference to the interleaved samples
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Get channel configuration
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Number of samples per channel
    pub fn sample_count(&self) -> usize {
        self.samples.len() / self.channels.count() as usize
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append another buffer of the same layout
    pub fn append(&mut self, other: &SampleBuffer) -> AudioResult<()> {
        if other.channels != self.channels {
            return Err(AudioError::InvalidChannels {
                expected: self.channels.count(),
                got: other.channels.count(),
            });
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    /// Force the length to `sample_count`, truncating or appending silence at the end
    pub fn resize(&mut self, sample_count: usize) {
        self.samples
            .resize(sample_count * self.channels.count() as usize, 0);
    }

    /// Split into one normalized (-1.0..1.0) vector per channel
    pub fn to_planar(&self) -> Vec<Vec<f64>> {
        let num_channels = self.channels.count() as usize;
        let mut planes = vec![Vec::with_capacity(self.sample_count()); num_channels];
        for tuple in self.samples.chunks_exact(num_channels) {
            for (plane, &sample) in planes.iter_mut().zip(tuple) {
                plane.push(sample as f64 / 32768.0);
            }
        }
        planes
    }

    /// Interleave normalized per-channel vectors back into 16-bit samples
    ///
    /// All planes must have the same length.
    pub fn from_planar(planes: &[Vec<f64>], channels: Channels) -> AudioResult<Self> {
        if planes.len() != channels.count() as usize {
            return Err(AudioError::InvalidChannels {
                expected: channels.count(),
                got: planes.len() as u32,
            });
        }
        let len = planes.first().map(Vec::len).unwrap_or(0);
        if planes.iter().any(|p| p.len() != len) {
            return Err(AudioError::BufferError(
                "Channel planes have different lengths".to_string(),
            ));
        }

        let mut samples = Vec::with_capacity(len * planes.len());
        for i in 0..len {
            for plane in planes {
                let scaled = (plane[i] * 32768.0).round().clamp(-32768.0, 32767.0);
                samples.push(scaled as i16);
            }
        }

        Ok(SampleBuffer { samples, channels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        assert_eq!(Channels::Mono.count(), 1);
        assert_eq!(Channels::Stereo.count(), 2);
        assert_eq!(Channels::Stereo.name(), "Stereo");
    }

    #[test]
    fn test_buffer_creation() {
        let buffer = SampleBuffer::new(vec![1, 2, 3, 4], Channels::Stereo).unwrap();
        assert_eq!(buffer.sample_count(), 2);
        assert_eq!(buffer.channels(), Channels::Stereo);
    }

    #[test]
    fn test_buffer_invalid_samples() {
        // Odd number of samples for stereo should fail
        assert!(SampleBuffer::new(vec![1, 2, 3], Channels::Stereo).is_err());
    }

    #[test]
    fn test_resize_only_touches_tail() {
        let mut buffer = SampleBuffer::new(vec![5, -5, 7, -7], Channels::Stereo).unwrap();
        buffer.resize(3);
        assert_eq!(buffer.samples(), &[5, -5, 7, -7, 0, 0]);
        buffer.resize(1);
        assert_eq!(buffer.samples(), &[5, -5]);
    }

    #[test]
    fn test_append_rejects_mixed_layouts() {
        let mut stereo = SampleBuffer::silence(2, Channels::Stereo);
        let mono = SampleBuffer::silence(2, Channels::Mono);
        assert!(stereo.append(&mono).is_err());
        stereo.append(&SampleBuffer::silence(1, Channels::Stereo)).unwrap();
        assert_eq!(stereo.sample_count(), 3);
    }

    #[test]
    fn test_planar_conversion() {
        let buffer = SampleBuffer::new(vec![16384, -16384, 0, 32767], Channels::Stereo).unwrap();
        let planes = buffer.to_planar();
        assert_eq!(planes.len(), 2);
        assert_eq!(planes[0], vec![0.5, 0.0]);
        let back = SampleBuffer::from_planar(&planes, Channels::Stereo).unwrap();
        assert_eq!(back, buffer);
    }
}
