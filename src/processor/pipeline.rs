use super::{BatchPlanner, ProcessingStats, StatsRecorder, StreamAssembler};
use crate::config::ResyncConfig;
use crate::decoder::{AudioDecoder, AudioRecoveryUnit};
use crate::encoder::Encoder;
use crate::error::{AudioError, AudioResult};
use crate::filter::{DriftCorrector, Resampler};
use crate::source::{FrameAddressIndex, FrameBufferExtractor};
use log::{info, warn};
use std::path::Path;

/// Everything a finished run produces
pub struct ResyncOutput<E> {
    /// Run summary
    pub stats: ProcessingStats,
    /// Drift ledger
    pub ledger: StatsRecorder,
    /// Finalized output streams, one per channel group
    pub encoders: Vec<E>,
}

/// Frame-locked audio resynchronization engine
///
/// Makes a single forward pass over the video timeline. Each batch is read
/// from its absolute position in the source, decoded in isolation, corrected
/// to its exact expected length, logged and appended to the output.
pub struct Resyncer<D: AudioDecoder, R: Resampler> {
    config: ResyncConfig,
    decoder: D,
    corrector: DriftCorrector<R>,
}

impl<D: AudioDecoder, R: Resampler> Resyncer<D, R> {
    /// Create an engine from a validated config and its collaborators
    pub fn new(config: ResyncConfig, decoder: D, resampler: R) -> AudioResult<Self> {
        config.validate()?;
        let corrector = DriftCorrector::new(resampler, config.small_diff_threshold);
        Ok(Resyncer {
            config,
            decoder,
            corrector,
        })
    }

    /// Resync the audio of `input` into `encoders`
    pub fn run<P, E>(&mut self, input: P, encoders: Vec<E>) -> AudioResult<ResyncOutput<E>>
    where
        P: AsRef<Path>,
        E: Encoder,
    {
        let input = input.as_ref();
        let config = &self.config;
        if encoders.len() != config.channel_groups {
            return Err(AudioError::ConfigError(format!(
                "{} output streams given for {} channel groups",
                encoders.len(),
                config.channel_groups
            )));
        }

        let file_size = std::fs::metadata(input)?.len();
        let index = FrameAddressIndex::new(file_size, config.frame_size, config.video_rate)?;
        let planner = BatchPlanner::new(config.video_rate, config.audio_rate)?;
        let batches = planner.plan(index.frame_count());

        info!(
            "{}: {} frames ({:.2}s) at {} fps, {} Hz audio in {} group(s)",
            input.display(),
            index.frame_count(),
            index.duration_secs(),
            config.video_rate,
            config.audio_rate,
            config.channel_groups
        );
        info!(
            "Batches of {} frames / {} samples ({} batches)",
            planner.frame_count(),
            planner.expected_sample_count(),
            batches.len()
        );
        if let Some(last) = batches.last().filter(|b| b.partial) {
            warn!(
                "Final batch at frame {} has {} of {} frames; expecting {} samples (rounded)",
                last.start_frame,
                last.frame_count,
                planner.frame_count(),
                last.expected_sample_count
            );
        }

        let mut extractor = FrameBufferExtractor::open(input, index)?;
        let recovery = AudioRecoveryUnit::new(config.channel_groups, config.channels);
        let mut ledger = StatsRecorder::new(config.channel_groups, config.audio_rate);
        let mut assembler = StreamAssembler::new(encoders);
        let mut stats = ProcessingStats::new(config.channel_groups);

        for (n, batch) in batches.iter().enumerate() {
            if n % 10 == 0 {
                info!("Processing frames at {}...", batch.start_frame);
            }

            let segment = extractor.extract(batch)?;
            for group in recovery.recover(&mut self.decoder, &segment, batch) {
                let result = self.corrector.correct(batch, group);
                ledger.record(&result)?;
                stats.add(&result);
                assembler.append(result)?;
            }

            stats.frames_processed += batch.frame_count as u64;
            stats.batches_processed += 1;
        }

        let planned_samples = batches.iter().map(|b| b.expected_sample_count).sum();
        let encoders = assembler.finish(planned_samples)?;

        for group in 0..ledger.group_count() {
            if let Some(last) = ledger.rows(group).last() {
                info!(
                    "Group {}: accumulated drift {} samples ({:.6}s)",
                    group,
                    last.audio_accumulated_diff_sample_count,
                    last.audio_accumulated_diff_seconds
                );
            }
        }
        info!(
            "Done: {} frames, {} missing, {} padded/truncated, {} resampled, {} failed",
            stats.frames_processed,
            stats.missing_frames,
            stats.padded_or_truncated,
            stats.resampled,
            stats.resample_failures
        );

        Ok(ResyncOutput {
            stats,
            ledger,
            encoders,
        })
    }
}
