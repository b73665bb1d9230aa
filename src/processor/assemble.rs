use crate::encoder::Encoder;
use crate::error::{AudioError, AudioResult};
use crate::filter::BatchResult;

struct GroupStream<E> {
    encoder: E,
    next_frame: u64,
    emitted: u64,
}

/// Concatenates corrected batches into one continuous stream per channel group
pub struct StreamAssembler<E: Encoder> {
    streams: Vec<GroupStream<E>>,
}

impl<E: Encoder> StreamAssembler<E> {
    /// One encoder per channel group, in group order
    pub fn new(encoders: Vec<E>) -> Self {
        StreamAssembler {
            streams: encoders
                .into_iter()
                .map(|encoder| GroupStream {
                    encoder,
                    next_frame: 0,
                    emitted: 0,
                })
                .collect(),
        }
    }

    /// Samples written so far for a group
    pub fn emitted(&self, group: usize) -> u64 {
        self.streams.get(group).map(|s| s.emitted).unwrap_or(0)
    }

    /// Append a corrected batch to its group's stream
    pub fn append(&mut self, result: BatchResult) -> AudioResult<()> {
        let group = result.group;
        let stream = self.streams.get_mut(group).ok_or_else(|| {
            AudioError::AssemblyError(format!("No output stream for channel group {}", group))
        })?;

        if result.batch.start_frame != stream.next_frame {
            return Err(AudioError::OrderingError(format!(
                "Group {} stream expected frame {}, got batch at frame {}",
                group, stream.next_frame, result.batch.start_frame
            )));
        }

        let count = result.corrected_samples.sample_count() as u64;
        if count != result.batch.expected_sample_count {
            return Err(AudioError::AssemblyError(format!(
                "Frames {}..{} group {}: {} corrected samples, expected {}",
                result.batch.start_frame,
                result.batch.end_frame(),
                group,
                count,
                result.batch.expected_sample_count
            )));
        }

        stream.encoder.encode(&result.corrected_samples)?;
        stream.emitted += count;
        stream.next_frame = result.batch.end_frame();
        Ok(())
    }

    /// Finalize every stream and check each holds `planned_samples` samples
    pub fn finish(self, planned_samples: u64) -> AudioResult<Vec<E>> {
        let mut encoders = Vec::with_capacity(self.streams.len());
        for (group, mut stream) in self.streams.into_iter().enumerate() {
            stream.encoder.finalize()?;
            if stream.emitted != planned_samples {
                return Err(AudioError::AssemblyError(format!(
                    "Group {} emitted {} samples, video duration needs {}",
                    group, stream.emitted, planned_samples
                )));
            }
            encoders.push(stream.encoder);
        }
        Ok(encoders)
    }
}
