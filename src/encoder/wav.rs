use crate::core::{Channels, SampleBuffer};
use crate::error::{AudioError, AudioResult};
use hound::{WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// 16-bit PCM WAV encoder for one channel group
pub struct WavEncoder {
    writer: Option<WavWriter<BufWriter<File>>>,
    sample_rate: u32,
    channels: Channels,
}

impl WavEncoder {
    /// Create a new WAV encoder to file
    pub fn new<P: AsRef<Path>>(path: P, sample_rate: u32, channels: Channels) -> AudioResult<Self> {
        let spec = WavSpec {
            channels: channels.count() as u16,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = WavWriter::create(path, spec)?;

        Ok(WavEncoder {
            writer: Some(writer),
            sample_rate,
            channels,
        })
    }

    /// Path of channel group `group` derived from a base output path
    ///
    /// `out.wav` becomes `out_0.wav`, `out_1.wav`, ...
    pub fn group_path<P: AsRef<Path>>(base: P, group: usize) -> PathBuf {
        let base = base.as_ref();
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match base.extension() {
            Some(ext) => format!("{}_{}.{}", stem, group, ext.to_string_lossy()),
            None => format!("{}_{}", stem, group),
        };
        base.with_file_name(name)
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the channel configuration
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Samples per channel written so far
    pub fn samples_written(&self) -> u32 {
        self.writer.as_ref().map(|w| w.duration()).unwrap_or(0)
    }
}

impl super::Encoder for WavEncoder {
    fn encode(&mut self, buffer: &SampleBuffer) -> AudioResult<()> {
        if buffer.channels() != self.channels {
            return Err(AudioError::InvalidChannels {
                expected: self.channels.count(),
                got: buffer.channels().count(),
            });
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| AudioError::EncodeError("Encoder already finalized".to_string()))?;

        for &sample in buffer.samples() {
            writer.write_sample(sample)?;
        }

        Ok(())
    }

    fn finalize(&mut self) -> AudioResult<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use tempfile::NamedTempFile;

    #[test]
    fn test_wav_encoder_write() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut encoder = WavEncoder::new(temp_file.path(), 32000, Channels::Stereo).unwrap();

        let buffer = SampleBuffer::new(vec![0, 100, -100, 32767], Channels::Stereo).unwrap();
        encoder.encode(&buffer).unwrap();
        assert_eq!(encoder.samples_written(), 2);
        encoder.finalize().unwrap();

        let mut reader = hound::WavReader::open(temp_file.path()).unwrap();
        assert_eq!(reader.spec().sample_rate, 32000);
        assert_eq!(reader.spec().bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 100, -100, 32767]);
    }

    #[test]
    fn test_wav_encoder_invalid_channels() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut encoder = WavEncoder::new(temp_file.path(), 48000, Channels::Stereo).unwrap();

        let buffer = SampleBuffer::silence(4, Channels::Mono);
        assert!(encoder.encode(&buffer).is_err());
    }

    #[test]
    fn test_encode_after_finalize() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut encoder = WavEncoder::new(temp_file.path(), 48000, Channels::Stereo).unwrap();
        encoder.finalize().unwrap();
        assert!(encoder.encode(&SampleBuffer::silence(1, Channels::Stereo)).is_err());
    }

    #[test]
    fn test_group_path() {
        assert_eq!(WavEncoder::group_path("out/tape.wav", 1), PathBuf::from("out/tape_1.wav"));
        assert_eq!(WavEncoder::group_path("tape", 0), PathBuf::from("tape_0"));
    }
}
