use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use voiceshift::io::{read_wav_file, write_wav_file, MonoClip, WavEncoding};
use voiceshift::{ratio_to_semitones, semitones_to_ratio, PitchDetector, ProcessorConfig};

#[derive(Parser)]
#[command(name = "voiceshift")]
#[command(about = "Pitch and formant shifting for voice recordings", long_about = None)]
struct Cli {
    /// Input WAV file (multi-channel input is downmixed to mono)
    input: PathBuf,
    /// Output WAV file (mono)
    output: PathBuf,
    /// Pitch ratio, 2.0 = one octave up
    #[arg(short, long, conflicts_with = "semitones")]
    pitch: Option<f32>,
    /// Pitch shift in semitones
    #[arg(short, long, allow_hyphen_values = true)]
    semitones: Option<f32>,
    /// Formant ratio, above 1.0 sounds smaller, below 1.0 larger
    #[arg(short, long, default_value_t = 1.0)]
    formant: f32,
    /// JSON processor configuration; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Block size override
    #[arg(long)]
    block_size: Option<usize>,
    /// Write 32-bit float samples instead of 16-bit PCM
    #[arg(long)]
    float: bool,
    /// Print the median detected pitch of input and output
    #[arg(long)]
    report_pitch: bool,
}

fn load_config(path: Option<&Path>) -> Result<ProcessorConfig> {
    let Some(path) = path else {
        return Ok(ProcessorConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
}

/// Median pitch over all voiced frames, if any.
fn median_pitch(samples: &[f32], config: &ProcessorConfig) -> Option<f32> {
    let mut detector = PitchDetector::new(config.window_size, config.sample_rate);
    let mut pitches: Vec<f32> = samples
        .windows(config.window_size)
        .step_by(config.hop_size)
        .filter_map(|frame| detector.detect(frame))
        .map(|est| est.frequency_hz)
        .collect();
    if pitches.is_empty() {
        return None;
    }
    pitches.sort_by(f32::total_cmp);
    Some(pitches[pitches.len() / 2])
}

fn describe_pitch(label: &str, pitch: Option<f32>) {
    match pitch {
        Some(hz) => eprintln!("{} pitch: {:.1} Hz", label, hz),
        None => eprintln!("{} pitch: unvoiced", label),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(block_size) = cli.block_size {
        config.block_size = block_size;
    }

    let clip = read_wav_file(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    config.sample_rate = clip.sample_rate;
    config.validate()?;

    let pitch = match (cli.pitch, cli.semitones) {
        (Some(ratio), _) => ratio,
        (None, Some(semitones)) => semitones_to_ratio(semitones),
        (None, None) => 1.0,
    };
    if !pitch.is_finite() || pitch <= 0.0 {
        bail!("pitch ratio must be a positive number, got {}", pitch);
    }

    eprintln!(
        "Input: {} ({} Hz, {} ch, {:.2}s)",
        cli.input.display(),
        clip.sample_rate,
        clip.source_channels,
        clip.duration_secs()
    );
    eprintln!(
        "Pitch: {:.4} ({:+.2} semitones), formant: {:.4}",
        pitch,
        ratio_to_semitones(pitch),
        cli.formant
    );
    log::debug!("configuration: {:?}", config);

    let shifted = voiceshift::render(&clip.samples, &config, pitch, cli.formant)?;

    if cli.report_pitch {
        describe_pitch("Input", median_pitch(&clip.samples, &config));
        describe_pitch("Output", median_pitch(&shifted, &config));
    }

    let encoding = if cli.float {
        WavEncoding::Float32
    } else {
        WavEncoding::Int16
    };
    let out = MonoClip::new(shifted, clip.sample_rate);
    write_wav_file(&cli.output, &out, encoding)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    eprintln!("Wrote {} samples to {}", out.samples.len(), cli.output.display());

    Ok(())
}
