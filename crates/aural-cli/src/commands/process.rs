//! File-based reverb processing command.

use super::linear_to_db;
use anyhow::Context;
use aural_core::peak;
use aural_engine::{Algorithm, Engine, EngineConfig, ReverbRequest, output_file_name};
use aural_io::Waveform;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file [default: <INPUT>_<ALGORITHM>_reverb.wav next to the input]
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Reverb algorithm: simple, schroeder or rir
    #[arg(short, long, default_value = "simple")]
    algorithm: String,

    /// Impulse response WAV file for `rir` (a synthetic one is used otherwise)
    #[arg(short, long)]
    impulse: Option<PathBuf>,

    /// Engine configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wet/dry ratio 0.0-1.0, overriding the algorithm default
    #[arg(short, long)]
    mix: Option<f32>,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let algorithm: Algorithm = args.algorithm.parse()?;

    let mut config = EngineConfig::discover(args.config.as_deref())?;
    if let Some(path) = args.impulse {
        config.impulse_response = Some(path);
    }
    // One file at one rate: resample on demand instead of preloading
    config.preload_rates.clear();

    let engine = Engine::new(config)?;

    let mut request = ReverbRequest::from_config(algorithm, engine.config());
    if let Some(mix) = args.mix {
        request = request.with_mix(mix);
    }

    println!("Reading {}...", args.input.display());
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let input = aural_io::decode(&bytes)?;
    println!(
        "  {} ch, {} Hz, {}-bit, {:.2}s",
        input.num_channels(),
        input.sample_rate(),
        input.bits_per_sample(),
        input.duration_secs()
    );

    println!("Applying {algorithm} reverb (mix {:.2})...", request.mix());
    let output = engine.process_waveform(&input, &request)?;

    let output_path = args
        .output
        .unwrap_or_else(|| default_output(&args.input, algorithm));
    aural_io::write_file(&output_path, &output)
        .with_context(|| format!("cannot write {}", output_path.display()))?;

    println!("\nStats:");
    print_stats("Input: ", &input);
    print_stats("Output:", &output);
    println!("\nWrote {}", output_path.display());

    Ok(())
}

fn default_output(input: &Path, algorithm: Algorithm) -> PathBuf {
    input.with_file_name(output_file_name(&input.to_string_lossy(), algorithm))
}

fn print_stats(label: &str, waveform: &Waveform) {
    let level = waveform
        .channels()
        .iter()
        .map(|ch| peak(ch))
        .fold(0.0f32, f32::max);
    println!(
        "  {label} {} frames, peak {:.1} dB",
        waveform.frames(),
        linear_to_db(level)
    );
}
