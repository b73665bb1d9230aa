//! DV-Resync Command Line Interface
//!
//! Resamples unlocked DV audio batch by batch so it stays locked to the
//! video frames over the whole tape.

use clap::{Parser, Subcommand, ValueEnum};
use dv_resync::decoder::{DvAudioDecoder, DvAudioFormat, dv};
use dv_resync::encoder::WavEncoder;
use dv_resync::filter::{LinearResampler, Resampler, SincResampler};
use dv_resync::processor::{BatchPlanner, Resyncer};
use dv_resync::source::FrameAddressIndex;
use dv_resync::{AudioResult, RationalRate, ResyncConfig};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dv-resync")]
#[command(about = "Lock unlocked DV audio to its video frames", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the audio/video layout of a raw DV file
    Probe {
        /// Raw DV file (not in a container)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Resynchronize audio and write one WAV per channel group
    Resync {
        /// Raw DV file (not in a container)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output WAV base name; group N is written to <stem>_N.<ext>
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// CSV file for the per-batch drift ledger
        #[arg(short, long, value_name = "FILE")]
        stats: Option<PathBuf>,

        /// Largest sample difference fixed by padding/truncating instead of resampling
        #[arg(short, long, default_value_t = dv_resync::config::DEFAULT_SMALL_DIFF_THRESHOLD)]
        threshold: u64,

        /// Resampler used for larger differences
        #[arg(short, long, value_enum, default_value_t = ResamplerKind::Sinc)]
        resampler: ResamplerKind,

        /// Override the video frame rate (e.g. 30000/1001 or 25)
        #[arg(long)]
        frame_rate: Option<RationalRate>,

        /// Override the audio sample rate in Hz
        #[arg(long, value_name = "HZ")]
        sample_rate: Option<u32>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ResamplerKind {
    /// Band-limited sinc interpolation
    Sinc,
    /// Linear interpolation
    Linear,
}

fn probe(input: PathBuf) -> AudioResult<()> {
    let format = dv::probe_file(&input)?;
    let config = format.to_config()?;
    let file_size = std::fs::metadata(&input)?.len();
    let index = FrameAddressIndex::new(file_size, config.frame_size, config.video_rate)?;
    let planner = BatchPlanner::new(config.video_rate, config.audio_rate)?;

    println!("File:            {}", input.display());
    println!("System:          {}", format.system.name());
    println!(
        "Frame rate:      {} ({:.3} fps)",
        config.video_rate,
        config.video_rate.as_f64()
    );
    println!("Frame size:      {} bytes", config.frame_size);
    println!("Frames:          {}", index.frame_count());
    println!("Duration:        {:.3} s", index.duration_secs());
    println!(
        "Audio:           {} Hz, {}, {}",
        format.sample_rate,
        format.quantization.name(),
        config.channels.name()
    );
    println!("Channel groups:  {}", format.channel_groups);
    println!(
        "Batch:           {} frames / {} samples",
        planner.frame_count(),
        planner.expected_sample_count()
    );
    Ok(())
}

/// Probed config with the command line overrides applied
fn engine_config(
    format: &DvAudioFormat,
    threshold: u64,
    frame_rate: Option<RationalRate>,
    sample_rate: u32,
) -> AudioResult<ResyncConfig> {
    let mut config = format.to_config()?.with_small_diff_threshold(threshold);
    if let Some(rate) = frame_rate {
        config.video_rate = rate;
    }
    config.audio_rate = RationalRate::from_integer(sample_rate as u64)?;
    config.validate()?;
    Ok(config)
}

fn resync(
    input: PathBuf,
    output: PathBuf,
    stats: Option<PathBuf>,
    threshold: u64,
    resampler: ResamplerKind,
    frame_rate: Option<RationalRate>,
    sample_rate: Option<u32>,
) -> AudioResult<()> {
    let format = dv::probe_file(&input)?;
    let sample_rate = sample_rate.unwrap_or(format.sample_rate);
    let config = engine_config(&format, threshold, frame_rate, sample_rate)?;
    info!(
        "{}, {} Hz {}, {} channel group(s)",
        format.system.name(),
        sample_rate,
        format.quantization.name(),
        format.channel_groups
    );

    let encoders = (0..config.channel_groups)
        .map(|group| {
            let path = WavEncoder::group_path(&output, group);
            info!("Channel group {} -> {}", group, path.display());
            WavEncoder::new(path, sample_rate, config.channels)
        })
        .collect::<AudioResult<Vec<_>>>()?;

    let resampler: Box<dyn Resampler> = match resampler {
        ResamplerKind::Sinc => {
            Box::new(SincResampler::new().with_max_fine_tune(threshold as usize))
        }
        ResamplerKind::Linear => Box::new(LinearResampler::new()),
    };

    let mut engine = Resyncer::new(config, DvAudioDecoder::new(format), resampler)?;
    let result = engine.run(&input, encoders)?;

    if let Some(path) = stats {
        result.ledger.save_csv(&path)?;
        info!("Wrote drift ledger to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    info!("dv-resync {}", dv_resync::VERSION);

    match cli.command {
        Commands::Probe { input } => probe(input)?,
        Commands::Resync {
            input,
            output,
            stats,
            threshold,
            resampler,
            frame_rate,
            sample_rate,
        } => resync(
            input,
            output,
            stats,
            threshold,
            resampler,
            frame_rate,
            sample_rate,
        )?,
    }

    Ok(())
}
