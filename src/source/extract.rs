use super::index::FrameAddressIndex;
use crate::error::{AudioError, AudioResult};
use crate::processor::Batch;
use log::debug;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Bytes of a contiguous run of whole frames, detached from the source file
#[derive(Debug, Clone)]
pub struct FrameSegment {
    start_frame: u64,
    frame_size: u64,
    data: Vec<u8>,
}

impl FrameSegment {
    /// Wrap raw frame bytes; `data` must hold whole frames
    pub fn new(start_frame: u64, frame_size: u64, data: Vec<u8>) -> AudioResult<Self> {
        if frame_size == 0 || data.len() as u64 % frame_size != 0 {
            return Err(AudioError::BufferError(format!(
                "{} bytes is not a whole number of {}-byte frames",
                data.len(),
                frame_size
            )));
        }
        Ok(FrameSegment {
            start_frame,
            frame_size,
            data,
        })
    }

    /// Absolute number of the first frame
    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    /// Bytes per frame
    pub fn frame_size(&self) -> u64 {
        self.frame_size
    }

    /// Number of frames held
    pub fn frame_count(&self) -> u64 {
        self.data.len() as u64 / self.frame_size
    }

    /// Raw bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Frames with their absolute frame numbers
    pub fn frames(&self) -> impl Iterator<Item = (u64, &[u8])> + '_ {
        self.data
            .chunks_exact(self.frame_size as usize)
            .enumerate()
            .map(move |(i, frame)| (self.start_frame + i as u64, frame))
    }
}

/// Random-access reader that pulls each batch straight from the source file
///
/// Every extraction seeks to an absolute offset so no decoder state carries
/// over from one batch to the next.
pub struct FrameBufferExtractor {
    file: File,
    index: FrameAddressIndex,
}

impl FrameBufferExtractor {
    /// Open the DV source file
    pub fn open<P: AsRef<Path>>(path: P, index: FrameAddressIndex) -> AudioResult<Self> {
        let file = File::open(path)?;
        Ok(FrameBufferExtractor { file, index })
    }

    /// Copy the frames of `batch` into an isolated segment
    pub fn extract(&mut self, batch: &Batch) -> AudioResult<FrameSegment> {
        let start = self.index.address(batch.start_frame).ok_or_else(|| {
            AudioError::Format(format!(
                "Batch starts at frame {} but the stream has {} frames",
                batch.start_frame,
                self.index.frame_count()
            ))
        })?;
        let expected = batch.frame_count as u64 * self.index.frame_size();

        self.file.seek(SeekFrom::Start(start.byte_offset))?;
        let mut data = Vec::with_capacity(expected as usize);
        (&mut self.file).take(expected).read_to_end(&mut data)?;

        if (data.len() as u64) < expected {
            return Err(AudioError::TruncatedRead {
                start_frame: batch.start_frame,
                byte_offset: start.byte_offset,
                expected,
                got: data.len() as u64,
            });
        }

        debug!(
            "Extracted frames {}..{} ({} bytes at offset {})",
            batch.start_frame,
            batch.start_frame + batch.frame_count as u64,
            expected,
            start.byte_offset
        );

        FrameSegment::new(batch.start_frame, self.index.frame_size(), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RationalRate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn batch(start_frame: u64, frame_count: u32) -> Batch {
        Batch {
            start_frame,
            frame_count,
            expected_sample_count: 0,
            partial: false,
        }
    }

    fn numbered_file(frames: u8, frame_size: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for n in 0..frames {
            file.write_all(&vec![n; frame_size]).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_extract_reads_absolute_positions() {
        let file = numbered_file(6, 4);
        let index = FrameAddressIndex::new(24, 4, RationalRate::PAL).unwrap();
        let mut extractor = FrameBufferExtractor::open(file.path(), index).unwrap();

        // Out of order on purpose: each read must seek on its own
        let later = extractor.extract(&batch(3, 2)).unwrap();
        let earlier = extractor.extract(&batch(0, 2)).unwrap();

        assert_eq!(later.start_frame(), 3);
        assert_eq!(later.data(), &[3, 3, 3, 3, 4, 4, 4, 4]);
        assert_eq!(earlier.data(), &[0, 0, 0, 0, 1, 1, 1, 1]);

        let numbers: Vec<u64> = later.frames().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![3, 4]);
    }

    #[test]
    fn test_truncated_source() {
        let file = numbered_file(2, 4);
        // Index claims more frames than the file holds
        let index = FrameAddressIndex::new(16, 4, RationalRate::PAL).unwrap();
        let mut extractor = FrameBufferExtractor::open(file.path(), index).unwrap();

        let err = extractor.extract(&batch(1, 3)).unwrap_err();
        match err {
            AudioError::TruncatedRead {
                start_frame,
                byte_offset,
                expected,
                got,
            } => {
                assert_eq!(start_frame, 1);
                assert_eq!(byte_offset, 4);
                assert_eq!(expected, 12);
                assert_eq!(got, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_batch_past_end() {
        let file = numbered_file(2, 4);
        let index = FrameAddressIndex::new(8, 4, RationalRate::PAL).unwrap();
        let mut extractor = FrameBufferExtractor::open(file.path(), index).unwrap();
        assert!(matches!(
            extractor.extract(&batch(2, 1)),
            Err(AudioError::Format(_))
        ));
    }

    #[test]
    fn test_segment_requires_whole_frames() {
        assert!(FrameSegment::new(0, 4, vec![0; 6]).is_err());
        assert_eq!(FrameSegment::new(0, 4, vec![0; 8]).unwrap().frame_count(), 2);
    }
}
