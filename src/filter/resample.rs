use crate::config::DEFAULT_SMALL_DIFF_THRESHOLD;
use crate::core::SampleBuffer;
use crate::error::{AudioError, AudioResult};
use rubato::{
    Resampler as _, SincFixedIn, SincInterpolationParameters, SincInterpolationType,
    WindowFunction,
};

/// Linear interpolation resampler with exact output length
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearResampler;

impl LinearResampler {
    /// Create a linear resampler
    pub fn new() -> Self {
        LinearResampler
    }

    /// Interpolate one channel to `output_len` samples, keeping both endpoints
    fn linear_resample(input: &[f64], output_len: usize) -> Vec<f64> {
        if input.is_empty() || output_len == 0 {
            return Vec::new();
        }
        if input.len() == 1 || output_len == 1 {
            return vec![input[0]; output_len];
        }

        let step = (input.len() - 1) as f64 / (output_len - 1) as f64;
        let mut output = Vec::with_capacity(output_len);

        for i in 0..output_len {
            let input_pos = i as f64 * step;
            let input_idx = input_pos.floor() as usize;

            if input_idx + 1 < input.len() {
                let frac = input_pos - input_idx as f64;
                output.push(input[input_idx] * (1.0 - frac) + input[input_idx + 1] * frac);
            } else {
                output.push(input[input.len() - 1]);
            }
        }

        output
    }
}

impl super::Resampler for LinearResampler {
    fn resample(&mut self, input: &SampleBuffer, target_count: usize) -> AudioResult<SampleBuffer> {
        if input.is_empty() {
            return Err(AudioError::ResamplingError(
                "Cannot resample an empty buffer".to_string(),
            ));
        }

        let planes: Vec<Vec<f64>> = input
            .to_planar()
            .iter()
            .map(|plane| Self::linear_resample(plane, target_count))
            .collect();

        SampleBuffer::from_planar(&planes, input.channels())
    }
}

/// Band-limited sinc resampler backed by rubato
///
/// The filter leaves its output a few samples off the requested length; the
/// remainder is trimmed or padded at the tail as long as it stays within
/// `max_fine_tune` samples.
pub struct SincResampler {
    max_fine_tune: usize,
}

impl SincResampler {
    /// Create a resampler with high quality defaults
    pub fn new() -> Self {
        SincResampler {
            max_fine_tune: DEFAULT_SMALL_DIFF_THRESHOLD as usize,
        }
    }

    /// Set the largest tail adjustment accepted after filtering
    pub fn with_max_fine_tune(mut self, max_fine_tune: usize) -> Self {
        self.max_fine_tune = max_fine_tune;
        self
    }

    fn parameters() -> SincInterpolationParameters {
        SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        }
    }
}

impl Default for SincResampler {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Resampler for SincResampler {
    fn resample(&mut self, input: &SampleBuffer, target_count: usize) -> AudioResult<SampleBuffer> {
        let input_len = input.sample_count();
        if input_len == 0 || target_count == 0 {
            return Err(AudioError::ResamplingError(format!(
                "Cannot resample {} samples to {}",
                input_len, target_count
            )));
        }

        let ratio = target_count as f64 / input_len as f64;
        let channels = input.channels().count() as usize;
        let mut resampler =
            SincFixedIn::<f64>::new(ratio, 1.1, Self::parameters(), input_len, channels)?;

        let delay = resampler.output_delay();
        let wanted = delay + target_count;
        let waves_in = input.to_planar();
        let mut planes = resampler.process(&waves_in[..], None)?;

        // Flush the filter tail until the delayed output is complete
        for _ in 0..4 {
            if planes[0].len() >= wanted {
                break;
            }
            let tail = resampler.process_partial(None::<&[Vec<f64>]>, None)?;
            for (plane, rest) in planes.iter_mut().zip(tail) {
                plane.extend(rest);
            }
        }

        let produced = planes[0].len().saturating_sub(delay);
        if produced + self.max_fine_tune < target_count {
            return Err(AudioError::ResamplingError(format!(
                "Resampler produced {} samples, wanted {}",
                produced, target_count
            )));
        }

        for plane in planes.iter_mut() {
            plane.drain(..delay.min(plane.len()));
            plane.resize(target_count, 0.0);
        }

        SampleBuffer::from_planar(&planes, input.channels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Channels;
    use crate::filter::Resampler;

    #[test]
    fn test_linear_resample_keeps_endpoints() {
        let output = LinearResampler::linear_resample(&[0.0, 1.0], 5);
        assert_eq!(output, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_linear_resample_shrinks() {
        let output = LinearResampler::linear_resample(&[0.0, 0.5, 1.0, 0.5, 0.0], 3);
        assert_eq!(output, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_linear_exact_length() {
        let samples = (0..200).map(|i| i as i16).collect();
        let input = SampleBuffer::new(samples, Channels::Stereo).unwrap();
        let output = LinearResampler::new().resample(&input, 93).unwrap();
        assert_eq!(output.sample_count(), 93);
        assert_eq!(output.channels(), Channels::Stereo);
        // Left channel starts at 0, right at 1
        assert_eq!(&output.samples()[..2], &[0, 1]);
    }

    #[test]
    fn test_linear_rejects_empty() {
        let input = SampleBuffer::empty(Channels::Stereo);
        assert!(LinearResampler::new().resample(&input, 10).is_err());
    }

    #[test]
    fn test_sinc_exact_length() {
        let samples: Vec<i16> = (0..2000)
            .flat_map(|i| {
                let v = ((i as f64 * 0.05).sin() * 8000.0) as i16;
                [v, v]
            })
            .collect();
        let input = SampleBuffer::new(samples, Channels::Stereo).unwrap();

        let mut resampler = SincResampler::new();
        let stretched = resampler.resample(&input, 2030).unwrap();
        assert_eq!(stretched.sample_count(), 2030);
        let squeezed = resampler.resample(&input, 1970).unwrap();
        assert_eq!(squeezed.sample_count(), 1970);
    }

    #[test]
    fn test_sinc_rejects_empty() {
        let input = SampleBuffer::empty(Channels::Stereo);
        assert!(SincResampler::new().resample(&input, 10).is_err());
    }
}
