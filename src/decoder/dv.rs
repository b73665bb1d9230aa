//! Native DV (IEC 61834 / SMPTE 314M) audio extraction
//!
//! A raw DV frame is a series of DIF sequences of 150 blocks each: one
//! header, two subcode and three VAUX blocks, then nine repetitions of one
//! audio block followed by fifteen video blocks. Each audio block carries a
//! 5-byte AAUX pack and 72 bytes of shuffled PCM.

use super::{AudioDecoder, DecodedSegment};
use crate::config::{DIF_BLOCK_SIZE, DIF_SEQUENCE_SIZE, DvSystem, ResyncConfig};
use crate::core::{Channels, RationalRate, SampleBuffer};
use crate::error::{AudioError, AudioResult};
use crate::source::FrameSegment;
use log::debug;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;

const AAUX_SOURCE_PACK: u8 = 0x50;
const SECTION_HEADER: u8 = 0;
const SECTION_AUDIO: u8 = 3;
const AUDIO_BLOCKS_PER_SEQUENCE: usize = 9;
/// Header, two subcode and three VAUX blocks precede the first audio block
const AUDIO_SECTION_OFFSET: usize = 6 * DIF_BLOCK_SIZE as usize;
/// One audio block plus fifteen video blocks
const AUDIO_BLOCK_STRIDE: usize = 16 * DIF_BLOCK_SIZE as usize;
const AUDIO_DATA: Range<usize> = 8..80;
/// Frames scanned by `probe_file` looking for audio
const PROBE_FRAME_LIMIT: u64 = 300;

const SHUFFLE_525: [[usize; 9]; 10] = [
    [0, 30, 60, 20, 50, 80, 10, 40, 70],
    [6, 36, 66, 26, 56, 86, 16, 46, 76],
    [12, 42, 72, 2, 32, 62, 22, 52, 82],
    [18, 48, 78, 8, 38, 68, 28, 58, 88],
    [24, 54, 84, 14, 44, 74, 4, 34, 64],
    [1, 31, 61, 21, 51, 81, 11, 41, 71],
    [7, 37, 67, 27, 57, 87, 17, 47, 77],
    [13, 43, 73, 3, 33, 63, 23, 53, 83],
    [19, 49, 79, 9, 39, 69, 29, 59, 89],
    [25, 55, 85, 15, 45, 75, 5, 35, 65],
];

const SHUFFLE_625: [[usize; 9]; 12] = [
    [0, 36, 72, 26, 62, 98, 16, 52, 88],
    [6, 42, 78, 32, 68, 104, 22, 58, 94],
    [12, 48, 84, 2, 38, 74, 28, 64, 100],
    [18, 54, 90, 8, 44, 80, 34, 70, 106],
    [24, 60, 96, 14, 50, 86, 4, 40, 76],
    [30, 66, 102, 20, 56, 92, 10, 46, 82],
    [1, 37, 73, 27, 63, 99, 17, 53, 89],
    [7, 43, 79, 33, 69, 105, 23, 59, 95],
    [13, 49, 85, 3, 39, 75, 29, 65, 101],
    [19, 55, 91, 9, 45, 81, 35, 71, 107],
    [25, 61, 97, 15, 51, 87, 5, 41, 77],
    [31, 67, 103, 21, 57, 93, 11, 47, 83],
];

/// Audio sample quantization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantization {
    /// 16-bit linear, one stereo pair per DIF channel
    Linear16,
    /// 12-bit nonlinear, two stereo pairs per DIF channel (32 kHz only)
    Nonlinear12,
}

impl Quantization {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Quantization::Linear16),
            1 => Some(Quantization::Nonlinear12),
            _ => None,
        }
    }

    /// Get quantization name
    pub fn name(&self) -> &'static str {
        match self {
            Quantization::Linear16 => "16-bit linear",
            Quantization::Nonlinear12 => "12-bit nonlinear",
        }
    }
}

/// Audio layout of a raw DV stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DvAudioFormat {
    /// Television system
    pub system: DvSystem,
    /// DIF channels per frame (1 for 25 Mbit/s DV, 2 for DV50)
    pub dif_channels: u64,
    /// Nominal sample rate in Hz
    pub sample_rate: u32,
    /// Sample quantization
    pub quantization: Quantization,
    /// Number of stereo channel groups
    pub channel_groups: usize,
}

impl DvAudioFormat {
    /// Bytes per frame
    pub fn frame_size(&self) -> u64 {
        self.system.frame_size(self.dif_channels)
    }

    /// Engine config matching this format
    pub fn to_config(&self) -> AudioResult<ResyncConfig> {
        Ok(ResyncConfig::new(
            self.system.frame_rate(),
            RationalRate::from_integer(self.sample_rate as u64)?,
            self.frame_size(),
        )
        .with_channel_groups(self.channel_groups)
        .with_channels(Channels::Stereo))
    }
}

/// Fields of an AAUX source pack that matter for extraction
#[derive(Debug, Clone, Copy)]
struct SourcePack {
    af_size: u8,
    frequency: u8,
    quantization: u8,
    stype: u8,
}

impl SourcePack {
    fn parse(pack: &[u8]) -> Option<Self> {
        if pack.len() < 5 || pack[0] != AAUX_SOURCE_PACK {
            return None;
        }
        Some(SourcePack {
            af_size: pack[1] & 0x3f,
            frequency: (pack[4] >> 3) & 0x07,
            quantization: pack[4] & 0x07,
            stype: pack[3] & 0x1f,
        })
    }

    fn sample_rate(&self) -> Option<u32> {
        match self.frequency {
            0 => Some(48000),
            1 => Some(44100),
            2 => Some(32000),
            _ => None,
        }
    }
}

fn shuffle(system: DvSystem, sequence: usize, block: usize) -> usize {
    match system {
        DvSystem::Ntsc => SHUFFLE_525[sequence][block],
        DvSystem::Pal => SHUFFLE_625[sequence][block],
    }
}

fn audio_stride(system: DvSystem) -> usize {
    match system {
        DvSystem::Ntsc => 90,
        DvSystem::Pal => 108,
    }
}

/// Fewest samples a frame can carry at a given frequency code
fn min_samples(system: DvSystem, frequency: u8) -> usize {
    match (system, frequency) {
        (DvSystem::Ntsc, 0) => 1580,
        (DvSystem::Ntsc, 1) => 1452,
        (DvSystem::Ntsc, _) => 1053,
        (DvSystem::Pal, 0) => 1896,
        (DvSystem::Pal, 1) => 1742,
        (DvSystem::Pal, _) => 1264,
    }
}

/// Expand a 12-bit nonlinear sample to 16 bits
fn expand_12bit(sample: u16) -> i16 {
    let sample = if sample < 0x800 { sample } else { sample | 0xf000 };
    let shift = (sample & 0xf00) >> 8;

    let result = if !(0x2..=0xd).contains(&shift) {
        sample
    } else if shift < 0x8 {
        let shift = shift - 1;
        sample.wrapping_sub(256 * shift) << shift
    } else {
        let shift = 0xe - shift;
        (sample.wrapping_add(256 * shift + 1) << shift).wrapping_sub(1)
    };
    result as i16
}

fn system_from_header(frame: &[u8]) -> AudioResult<DvSystem> {
    if frame.len() < DIF_SEQUENCE_SIZE as usize || frame[0] >> 5 != SECTION_HEADER {
        return Err(AudioError::Format(
            "Data does not start with a DIF header block".to_string(),
        ));
    }
    Ok(if frame[3] & 0x80 == 0 {
        DvSystem::Ntsc
    } else {
        DvSystem::Pal
    })
}

/// First AAUX source pack in the given DIF sequences of one DIF channel
fn find_source_pack(
    frame: &[u8],
    system: DvSystem,
    dif_channel: usize,
    sequences: Range<usize>,
) -> Option<SourcePack> {
    let channel_base = dif_channel * system.dif_sequences() as usize * DIF_SEQUENCE_SIZE as usize;
    for sequence in sequences {
        let sequence_base =
            channel_base + sequence * DIF_SEQUENCE_SIZE as usize + AUDIO_SECTION_OFFSET;
        for block in 0..AUDIO_BLOCKS_PER_SEQUENCE {
            let offset = sequence_base + block * AUDIO_BLOCK_STRIDE;
            let dif = frame.get(offset..offset + DIF_BLOCK_SIZE as usize)?;
            if dif[0] >> 5 != SECTION_AUDIO {
                continue;
            }
            if let Some(pack) = SourcePack::parse(&dif[3..8]) {
                return Some(pack);
            }
        }
    }
    None
}

/// Derive the audio format from the leading DIF sequence of a frame
pub fn probe_frame(frame: &[u8]) -> AudioResult<DvAudioFormat> {
    let system = system_from_header(frame)?;
    let pack = find_source_pack(frame, system, 0, 0..1)
        .ok_or_else(|| AudioError::Format("No AAUX source pack in frame".to_string()))?;

    let sample_rate = pack.sample_rate().ok_or_else(|| {
        AudioError::Format(format!("Unsupported audio frequency code {}", pack.frequency))
    })?;
    let quantization = Quantization::from_code(pack.quantization).ok_or_else(|| {
        AudioError::Format(format!("Unsupported audio quantization code {}", pack.quantization))
    })?;
    let dif_channels = match pack.stype {
        0 => 1,
        2 => 2,
        other => {
            return Err(AudioError::Format(format!(
                "Unsupported audio block layout (STYPE {})",
                other
            )));
        }
    };
    let channel_groups = match quantization {
        Quantization::Linear16 => dif_channels as usize,
        Quantization::Nonlinear12 => 2 * dif_channels as usize,
    };

    Ok(DvAudioFormat {
        system,
        dif_channels,
        sample_rate,
        quantization,
        channel_groups,
    })
}

/// Find the audio format of a raw DV file from its first frame carrying audio
pub fn probe_file<P: AsRef<Path>>(path: P) -> AudioResult<DvAudioFormat> {
    let mut file = File::open(path)?;
    let mut sequence = vec![0u8; DIF_SEQUENCE_SIZE as usize];
    file.read_exact(&mut sequence)?;
    let system = system_from_header(&sequence)?;
    // Step by one DIF channel so DV50 frame halves are visited too
    let step = system.frame_size(1);

    let mut last_err = None;
    for n in 0..PROBE_FRAME_LIMIT {
        file.seek(SeekFrom::Start(n * step))?;
        if file.read_exact(&mut sequence).is_err() {
            break;
        }
        match probe_frame(&sequence) {
            Ok(format) => {
                debug!("Probed DV audio format at byte {}: {:?}", n * step, format);
                return Ok(format);
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| AudioError::Format("File holds no DV frames".to_string())))
}

/// Decode capability for raw DV frames
pub struct DvAudioDecoder {
    format: DvAudioFormat,
}

impl DvAudioDecoder {
    /// Create a decoder expecting `format` in every frame
    pub fn new(format: DvAudioFormat) -> Self {
        DvAudioDecoder { format }
    }

    fn decode_group(
        &self,
        frame_number: u64,
        frame: &[u8],
        group: usize,
    ) -> AudioResult<SampleBuffer> {
        let system = self.format.system;
        let sequences = system.dif_sequences() as usize;
        let half = sequences / 2;

        let (dif_channel, range) = match self.format.quantization {
            Quantization::Linear16 => (group, 0..sequences),
            Quantization::Nonlinear12 => {
                let start = (group % 2) * half;
                (group / 2, start..start + half)
            }
        };

        let Some(pack) = find_source_pack(frame, system, dif_channel, range.clone()) else {
            return Ok(SampleBuffer::empty(Channels::Stereo));
        };

        let sample_rate = pack.sample_rate();
        let quantization = Quantization::from_code(pack.quantization);
        if sample_rate != Some(self.format.sample_rate)
            || quantization != Some(self.format.quantization)
        {
            return Err(AudioError::DecodeError(format!(
                "Frame {} group {}: audio format changed to frequency code {} / \
                 quantization code {}",
                frame_number, group, pack.frequency, pack.quantization
            )));
        }

        let sample_count = min_samples(system, pack.frequency) + pack.af_size as usize;
        let mut pcm = vec![0i16; sample_count * 2];
        let stride = audio_stride(system);
        let channel_base = dif_channel * sequences * DIF_SEQUENCE_SIZE as usize;

        for sequence in range {
            let sequence_base =
                channel_base + sequence * DIF_SEQUENCE_SIZE as usize + AUDIO_SECTION_OFFSET;
            for block in 0..AUDIO_BLOCKS_PER_SEQUENCE {
                let start = sequence_base + block * AUDIO_BLOCK_STRIDE;
                let dif = &frame[start..start + DIF_BLOCK_SIZE as usize];
                match self.format.quantization {
                    Quantization::Linear16 => {
                        for d in AUDIO_DATA.step_by(2) {
                            let of = shuffle(system, sequence, block) + (d - 8) / 2 * stride;
                            if of >= pcm.len() {
                                continue;
                            }
                            let raw = u16::from_be_bytes([dif[d], dif[d + 1]]);
                            // 0x8000 marks an uncorrectable sample
                            pcm[of] = if raw == 0x8000 { 0 } else { raw as i16 };
                        }
                    }
                    Quantization::Nonlinear12 => {
                        let sequence = sequence % half;
                        for d in AUDIO_DATA.step_by(3) {
                            let left = (dif[d] as u16) << 4 | (dif[d + 2] as u16) >> 4;
                            let right = (dif[d + 1] as u16) << 4 | (dif[d + 2] as u16) & 0x0f;
                            let row = (d - 8) / 3 * stride;

                            let of = shuffle(system, sequence, block) + row;
                            if of < pcm.len() {
                                pcm[of] = if left == 0x800 { 0 } else { expand_12bit(left) };
                            }
                            let of = shuffle(system, sequence + half, block) + row;
                            if of < pcm.len() {
                                pcm[of] = if right == 0x800 { 0 } else { expand_12bit(right) };
                            }
                        }
                    }
                }
            }
        }

        SampleBuffer::new(pcm, Channels::Stereo)
    }
}

impl AudioDecoder for DvAudioDecoder {
    fn decode(
        &mut self,
        segment: &FrameSegment,
        channel_groups: usize,
    ) -> AudioResult<DecodedSegment> {
        if channel_groups != self.format.channel_groups {
            return Err(AudioError::DecodeError(format!(
                "Requested {} channel groups, stream carries {}",
                channel_groups, self.format.channel_groups
            )));
        }
        if segment.frame_size() != self.format.frame_size() {
            return Err(AudioError::DecodeError(format!(
                "Segment frame size {} does not match DV frame size {}",
                segment.frame_size(),
                self.format.frame_size()
            )));
        }

        let mut groups = vec![Vec::with_capacity(segment.frame_count() as usize); channel_groups];
        for (frame_number, frame) in segment.frames() {
            for (group, frames) in groups.iter_mut().enumerate() {
                frames.push(self.decode_group(frame_number, frame, group)?);
            }
        }

        Ok(DecodedSegment::new(groups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// One DIF channel's worth of empty DIF sequences with audio block ids,
    /// plus an AAUX source pack in block 3 of every sequence if `pack` is set
    fn empty_dif_channel(system: DvSystem, pack: Option<[u8; 5]>) -> Vec<u8> {
        let mut frame = vec![0u8; system.frame_size(1) as usize];
        for sequence in 0..system.dif_sequences() as usize {
            let base = sequence * DIF_SEQUENCE_SIZE as usize;
            frame[base] = 0x1f;
            frame[base + 3] = if system == DvSystem::Pal { 0xbf } else { 0x3f };

            for block in 0..AUDIO_BLOCKS_PER_SEQUENCE {
                let offset = base + AUDIO_SECTION_OFFSET + block * AUDIO_BLOCK_STRIDE;
                frame[offset] = 0x70;
                if let (3, Some(pack)) = (block, pack) {
                    frame[offset + 3..offset + 8].copy_from_slice(&pack);
                }
            }
        }
        frame
    }

    /// Byte offset of an audio DIF block within one DIF channel
    fn audio_block_offset(sequence: usize, block: usize) -> usize {
        sequence * DIF_SEQUENCE_SIZE as usize + AUDIO_SECTION_OFFSET + block * AUDIO_BLOCK_STRIDE
    }

    /// One DIF channel of 16-bit audio; `sample` gives the interleaved
    /// value at each index
    fn build_linear_channel(
        system: DvSystem,
        frequency: u8,
        af_size: u8,
        stype: u8,
        sample: impl Fn(usize) -> i16,
    ) -> Vec<u8> {
        let pack = [AAUX_SOURCE_PACK, 0x80 | af_size, 0x00, 0xc0 | stype, frequency << 3];
        let mut frame = empty_dif_channel(system, Some(pack));
        let sample_count = min_samples(system, frequency) + af_size as usize;

        for sequence in 0..system.dif_sequences() as usize {
            for block in 0..AUDIO_BLOCKS_PER_SEQUENCE {
                let offset = audio_block_offset(sequence, block);
                for d in AUDIO_DATA.step_by(2) {
                    let of = shuffle(system, sequence, block) + (d - 8) / 2 * audio_stride(system);
                    if of < sample_count * 2 {
                        let bytes = sample(of).to_be_bytes();
                        frame[offset + d..offset + d + 2].copy_from_slice(&bytes);
                    }
                }
            }
        }
        frame
    }

    /// Build one 25 Mbit/s frame with 16-bit audio
    fn build_frame(
        system: DvSystem,
        frequency: u8,
        af_size: u8,
        with_audio: bool,
        sample: impl Fn(usize) -> i16,
    ) -> Vec<u8> {
        if with_audio {
            build_linear_channel(system, frequency, af_size, 0, sample)
        } else {
            empty_dif_channel(system, None)
        }
    }

    /// Build one 25 Mbit/s frame with 12-bit 32 kHz audio in two stereo
    /// groups; `sample(group, index)` gives the raw 12-bit code
    fn build_12bit_frame(
        system: DvSystem,
        af_size: u8,
        sample: impl Fn(usize, usize) -> u16,
    ) -> Vec<u8> {
        let pack = [AAUX_SOURCE_PACK, 0x80 | af_size, 0x00, 0xc0, (2 << 3) | 1];
        let mut frame = empty_dif_channel(system, Some(pack));
        let slots = (min_samples(system, 2) + af_size as usize) * 2;
        let half = system.dif_sequences() as usize / 2;
        let code = |group: usize, of: usize| if of < slots { sample(group, of) } else { 0 };

        for sequence in 0..2 * half {
            let (group, local) = (sequence / half, sequence % half);
            for block in 0..AUDIO_BLOCKS_PER_SEQUENCE {
                let offset = audio_block_offset(sequence, block);
                for d in AUDIO_DATA.step_by(3) {
                    let row = (d - 8) / 3 * audio_stride(system);
                    let left = code(group, shuffle(system, local, block) + row);
                    let right = code(group, shuffle(system, local + half, block) + row);
                    frame[offset + d] = (left >> 4) as u8;
                    frame[offset + d + 1] = (right >> 4) as u8;
                    frame[offset + d + 2] = (((left & 0x0f) << 4) | (right & 0x0f)) as u8;
                }
            }
        }
        frame
    }

    fn ntsc_48k() -> DvAudioFormat {
        DvAudioFormat {
            system: DvSystem::Ntsc,
            dif_channels: 1,
            sample_rate: 48000,
            quantization: Quantization::Linear16,
            channel_groups: 1,
        }
    }

    #[test]
    fn test_shuffle_covers_every_slot_once() {
        for system in [DvSystem::Ntsc, DvSystem::Pal] {
            let mut seen = HashSet::new();
            for sequence in 0..system.dif_sequences() as usize {
                for block in 0..AUDIO_BLOCKS_PER_SEQUENCE {
                    for d in AUDIO_DATA.step_by(2) {
                        let row = (d - 8) / 2 * audio_stride(system);
                        let of = shuffle(system, sequence, block) + row;
                        assert!(seen.insert(of), "{:?} slot {} used twice", system, of);
                    }
                }
            }
            assert_eq!(seen.len(), audio_stride(system) * 36);
            assert!(seen.iter().all(|&of| of < audio_stride(system) * 36));
        }
    }

    #[test]
    fn test_expand_12bit() {
        assert_eq!(expand_12bit(0x000), 0);
        assert_eq!(expand_12bit(0x100), 256);
        assert_eq!(expand_12bit(0x7ff), 32704);
        assert_eq!(expand_12bit(0xfff), -1);
    }

    #[test]
    fn test_probe_ntsc_frame() {
        let frame = build_frame(DvSystem::Ntsc, 0, 20, true, |_| 0);
        let format = probe_frame(&frame).unwrap();
        assert_eq!(format, ntsc_48k());
        assert_eq!(format.frame_size(), 120_000);

        let config = format.to_config().unwrap();
        assert_eq!(config.video_rate, RationalRate::NTSC);
        assert_eq!(config.audio_rate.numerator(), 48000);
    }

    #[test]
    fn test_probe_pal_frame() {
        let frame = build_frame(DvSystem::Pal, 2, 16, true, |_| 0);
        let format = probe_frame(&frame).unwrap();
        assert_eq!(format.system, DvSystem::Pal);
        assert_eq!(format.sample_rate, 32000);
        assert_eq!(format.frame_size(), 144_000);
    }

    #[test]
    fn test_probe_rejects_non_dv() {
        assert!(probe_frame(&[0xffu8; 12_000]).is_err());
        assert!(probe_frame(&[0u8; 100]).is_err());
    }

    #[test]
    fn test_probe_file_skips_silent_frames() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&build_frame(DvSystem::Ntsc, 0, 20, false, |_| 0)).unwrap();
        file.write_all(&build_frame(DvSystem::Ntsc, 0, 20, true, |_| 0)).unwrap();
        file.flush().unwrap();

        assert_eq!(probe_file(file.path()).unwrap(), ntsc_48k());
    }

    #[test]
    fn test_decode_deshuffles_samples() {
        let frame = build_frame(DvSystem::Ntsc, 0, 22, true, |i| i as i16 - 1000);
        let segment = FrameSegment::new(7, 120_000, frame).unwrap();
        let mut decoder = DvAudioDecoder::new(ntsc_48k());

        let decoded = decoder.decode(&segment, 1).unwrap();
        let frames = decoded.group(0).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].sample_count(), 1602);
        let expected: Vec<i16> = (0..3204).map(|i| i as i16 - 1000).collect();
        assert_eq!(frames[0].samples(), expected.as_slice());
    }

    #[test]
    fn test_decode_error_code_becomes_zero() {
        let frame = build_frame(DvSystem::Ntsc, 0, 20, true, |i| if i == 5 { i16::MIN } else { 1 });
        let segment = FrameSegment::new(0, 120_000, frame).unwrap();
        let decoded = DvAudioDecoder::new(ntsc_48k()).decode(&segment, 1).unwrap();
        let samples = decoded.group(0).unwrap()[0].samples();
        assert_eq!(samples[4], 1);
        assert_eq!(samples[5], 0);
    }

    #[test]
    fn test_frame_without_audio_is_empty() {
        let mut data = build_frame(DvSystem::Ntsc, 0, 20, true, |_| 3);
        data.extend(build_frame(DvSystem::Ntsc, 0, 20, false, |_| 3));
        let segment = FrameSegment::new(0, 120_000, data).unwrap();

        let decoded = DvAudioDecoder::new(ntsc_48k()).decode(&segment, 1).unwrap();
        let frames = decoded.group(0).unwrap();
        assert_eq!(frames[0].sample_count(), 1600);
        assert!(frames[1].is_empty());
    }

    #[test]
    fn test_format_change_fails_segment() {
        // 44.1 kHz frame in a 48 kHz stream
        let frame = build_frame(DvSystem::Ntsc, 1, 20, true, |_| 0);
        let segment = FrameSegment::new(0, 120_000, frame).unwrap();
        let result = DvAudioDecoder::new(ntsc_48k()).decode(&segment, 1);
        assert!(matches!(result, Err(AudioError::DecodeError(_))));
    }

    #[test]
    fn test_decode_12bit_two_groups() {
        // Codes below 0x200 and above 0xeff expand unchanged
        let code = |group: usize, i: usize| match (group, i) {
            (0, 0) => 0x7ff,
            (1, 1) => 0x800,
            (0, _) => (i % 0x200) as u16,
            _ => 0xfff - (i % 0x100) as u16,
        };
        let frame = build_12bit_frame(DvSystem::Ntsc, 20, code);

        let format = probe_frame(&frame).unwrap();
        assert_eq!(format.quantization, Quantization::Nonlinear12);
        assert_eq!(format.sample_rate, 32000);
        assert_eq!(format.dif_channels, 1);
        assert_eq!(format.channel_groups, 2);

        let segment = FrameSegment::new(0, 120_000, frame).unwrap();
        let decoded = DvAudioDecoder::new(format).decode(&segment, 2).unwrap();

        let first = decoded.group(0).unwrap()[0].samples();
        assert_eq!(first.len(), 1073 * 2);
        assert_eq!(first[0], 32704);
        for (i, &value) in first.iter().enumerate().skip(1) {
            assert_eq!(value, (i % 0x200) as i16, "group 0 index {}", i);
        }

        let second = decoded.group(1).unwrap()[0].samples();
        assert_eq!(second.len(), 1073 * 2);
        assert_eq!(second[1], 0);
        for (i, &value) in second.iter().enumerate().filter(|&(i, _)| i != 1) {
            assert_eq!(value, -1 - (i % 0x100) as i16, "group 1 index {}", i);
        }
    }

    #[test]
    fn test_decode_dv50_groups_follow_dif_channels() {
        let mut frame = build_linear_channel(DvSystem::Ntsc, 0, 20, 2, |i| i as i16);
        frame.extend(build_linear_channel(DvSystem::Ntsc, 0, 20, 2, |i| -(i as i16) - 1));
        assert_eq!(frame.len(), 240_000);

        let format = probe_frame(&frame).unwrap();
        assert_eq!(format.dif_channels, 2);
        assert_eq!(format.channel_groups, 2);
        assert_eq!(format.frame_size(), 240_000);

        let segment = FrameSegment::new(0, 240_000, frame).unwrap();
        let decoded = DvAudioDecoder::new(format).decode(&segment, 2).unwrap();

        let first: Vec<i16> = (0..3200).map(|i| i as i16).collect();
        let second: Vec<i16> = (0..3200).map(|i| -(i as i16) - 1).collect();
        assert_eq!(decoded.group(0).unwrap()[0].samples(), first.as_slice());
        assert_eq!(decoded.group(1).unwrap()[0].samples(), second.as_slice());
    }

    #[test]
    fn test_group_count_mismatch() {
        let frame = build_frame(DvSystem::Ntsc, 0, 20, true, |_| 0);
        let segment = FrameSegment::new(0, 120_000, frame).unwrap();
        assert!(DvAudioDecoder::new(ntsc_48k()).decode(&segment, 2).is_err());
    }
}
