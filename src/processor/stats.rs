use crate::core::RationalRate;
use crate::error::{AudioError, AudioResult};
use crate::filter::BatchResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Ledger entry for one channel group of one batch
#[derive(Debug, Clone, PartialEq)]
pub struct DriftLedgerRow {
    /// First frame of the batch
    pub video_start_frame_number: u64,
    /// Frames in the batch
    pub video_frame_count: u32,
    /// Samples actually decoded
    pub audio_actual_sample_count: u64,
    /// Samples the batch should hold
    pub audio_expected_sample_count: u64,
    /// Actual minus expected
    pub audio_diff_sample_count: i64,
    /// Running sum of the diff over this group's batches so far
    pub audio_accumulated_diff_sample_count: i64,
    /// Running sum expressed in seconds at the nominal sample rate
    pub audio_accumulated_diff_seconds: f64,
    /// Frames that yielded no audio
    pub audio_missing_frames: Vec<u64>,
    /// Correction and anomaly markers
    pub flags: Vec<&'static str>,
}

/// Append-only drift ledger, one independent column of rows per channel group
#[derive(Debug, Clone)]
pub struct StatsRecorder {
    audio_rate: RationalRate,
    groups: Vec<Vec<DriftLedgerRow>>,
}

impl StatsRecorder {
    /// Create an empty ledger
    pub fn new(channel_groups: usize, audio_rate: RationalRate) -> Self {
        StatsRecorder {
            audio_rate,
            groups: vec![Vec::new(); channel_groups],
        }
    }

    /// Append the row for one batch result
    ///
    /// Results of a group must arrive in file order with no gaps.
    pub fn record(&mut self, result: &BatchResult) -> AudioResult<&DriftLedgerRow> {
        let audio_rate = self.audio_rate;
        let rows = self.groups.get_mut(result.group).ok_or_else(|| {
            AudioError::OrderingError(format!("No ledger for channel group {}", result.group))
        })?;

        let (next_frame, accumulated) = rows
            .last()
            .map(|r| {
                (
                    r.video_start_frame_number + r.video_frame_count as u64,
                    r.audio_accumulated_diff_sample_count,
                )
            })
            .unwrap_or((0, 0));
        if result.batch.start_frame != next_frame {
            return Err(AudioError::OrderingError(format!(
                "Group {} ledger expected frame {}, got batch at frame {}",
                result.group, next_frame, result.batch.start_frame
            )));
        }

        let diff = result.diff_sample_count();
        let accumulated = accumulated + diff;

        let mut flags = vec![result.correction_applied.marker()];
        if result.batch.partial {
            flags.push("partial_batch");
        }
        if result.decode_failed {
            flags.push("decode_error");
        }

        rows.push(DriftLedgerRow {
            video_start_frame_number: result.batch.start_frame,
            video_frame_count: result.batch.frame_count,
            audio_actual_sample_count: result.actual_sample_count,
            audio_expected_sample_count: result.batch.expected_sample_count,
            audio_diff_sample_count: diff,
            audio_accumulated_diff_sample_count: accumulated,
            audio_accumulated_diff_seconds: audio_rate.count_to_secs(accumulated),
            audio_missing_frames: result.missing_frames.iter().copied().collect(),
            flags,
        });

        Ok(&rows[rows.len() - 1])
    }

    /// Number of channel groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Rows of one channel group in file order
    pub fn rows(&self, group: usize) -> &[DriftLedgerRow] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or_default()
    }

    /// Write the ledger as CSV, one line per batch with columns per group
    pub fn write_csv<W: Write>(&self, mut writer: W) -> AudioResult<()> {
        let batches = self.groups.first().map(Vec::len).unwrap_or(0);
        if self.groups.iter().any(|rows| rows.len() != batches) {
            return Err(AudioError::OrderingError(
                "Channel groups have different numbers of ledger rows".to_string(),
            ));
        }

        let mut header = vec![
            "video_start_frame_number".to_string(),
            "video_frame_count".to_string(),
        ];
        for group in 0..self.groups.len() {
            for column in [
                "actual_sample_count",
                "expected_sample_count",
                "diff_sample_count",
                "accumulated_diff_sample_count",
                "accumulated_diff_seconds",
                "missing_frames",
                "flags",
            ] {
                header.push(format!("audio_{}_{}", group, column));
            }
        }
        writeln!(writer, "{}", header.join(","))?;

        for batch in 0..batches {
            let first = &self.groups[0][batch];
            let mut fields = vec![
                first.video_start_frame_number.to_string(),
                first.video_frame_count.to_string(),
            ];
            for rows in &self.groups {
                let row = &rows[batch];
                let missing: Vec<String> =
                    row.audio_missing_frames.iter().map(u64::to_string).collect();
                fields.push(row.audio_actual_sample_count.to_string());
                fields.push(row.audio_expected_sample_count.to_string());
                fields.push(row.audio_diff_sample_count.to_string());
                fields.push(row.audio_accumulated_diff_sample_count.to_string());
                fields.push(row.audio_accumulated_diff_seconds.to_string());
                fields.push(missing.join(" "));
                fields.push(row.flags.join(" "));
            }
            writeln!(writer, "{}", fields.join(","))?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write the ledger CSV to a file
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> AudioResult<()> {
        self.write_csv(BufWriter::new(File::create(path)?))
    }
}
