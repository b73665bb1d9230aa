use crate::core::RationalRate;
use crate::error::{AudioError, AudioResult};

/// Byte position of one video frame in the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAddress {
    /// Zero-based frame number
    pub frame_number: u64,
    /// Offset of the first byte of the frame
    pub byte_offset: u64,
    /// Size of the frame in bytes
    pub byte_length: u64,
}

/// Frame-number to byte-offset map of a raw elementary video stream
///
/// Every frame of a raw DV stream has the same size, so addresses are
/// computed rather than stored.
#[derive(Debug, Clone)]
pub struct FrameAddressIndex {
    frame_size: u64,
    frame_count: u64,
    frame_rate: RationalRate,
}

impl FrameAddressIndex {
    /// Index a stream of `file_size` bytes made of `frame_size`-byte frames
    pub fn new(file_size: u64, frame_size: u64, frame_rate: RationalRate) -> AudioResult<Self> {
        if frame_size == 0 {
            return Err(AudioError::Format("Frame size must be non-zero".to_string()));
        }
        if file_size % frame_size != 0 {
            return Err(AudioError::Format(format!(
                "File size {} is not a multiple of the {}-byte frame size ({} trailing bytes)",
                file_size,
                frame_size,
                file_size % frame_size
            )));
        }

        Ok(FrameAddressIndex {
            frame_size,
            frame_count: file_size / frame_size,
            frame_rate,
        })
    }

    /// Number of frames in the stream
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Bytes per frame
    pub fn frame_size(&self) -> u64 {
        self.frame_size
    }

    /// Declared frame rate
    pub fn frame_rate(&self) -> RationalRate {
        self.frame_rate
    }

    /// Address of a frame, `None` past the end of the stream
    pub fn address(&self, frame_number: u64) -> Option<FrameAddress> {
        (frame_number < self.frame_count).then(|| FrameAddress {
            frame_number,
            byte_offset: frame_number * self.frame_size,
            byte_length: self.frame_size,
        })
    }

    /// All frame addresses in file order
    pub fn iter(&self) -> impl Iterator<Item = FrameAddress> + '_ {
        (0..self.frame_count).filter_map(move |n| self.address(n))
    }

    /// Presentation time of a frame in seconds
    pub fn frame_start_secs(&self, frame_number: u64) -> f64 {
        self.frame_rate.count_to_secs(frame_number as i64)
    }

    /// Duration of one frame in seconds
    pub fn frame_duration_secs(&self) -> f64 {
        self.frame_rate.count_to_secs(1)
    }

    /// Duration of the whole stream in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frame_start_secs(self.frame_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses() {
        let index = FrameAddressIndex::new(360_000, 120_000, RationalRate::NTSC).unwrap();
        assert_eq!(index.frame_count(), 3);

        let third = index.address(2).unwrap();
        assert_eq!(third.byte_offset, 240_000);
        assert_eq!(third.byte_length, 120_000);
        assert!(index.address(3).is_none());

        let offsets: Vec<u64> = index.iter().map(|a| a.byte_offset).collect();
        assert_eq!(offsets, vec![0, 120_000, 240_000]);
    }

    #[test]
    fn test_rejects_partial_frame() {
        let result = FrameAddressIndex::new(120_001, 120_000, RationalRate::NTSC);
        assert!(matches!(result, Err(AudioError::Format(_))));
    }

    #[test]
    fn test_rejects_zero_frame_size() {
        assert!(FrameAddressIndex::new(0, 0, RationalRate::PAL).is_err());
    }

    #[test]
    fn test_durations() {
        let index = FrameAddressIndex::new(25 * 144_000, 144_000, RationalRate::PAL).unwrap();
        assert!((index.frame_duration_secs() - 0.04).abs() < 1e-12);
        assert!((index.duration_secs() - 1.0).abs() < 1e-12);
    }
}
