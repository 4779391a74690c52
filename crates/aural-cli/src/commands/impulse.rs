//! Synthetic impulse-response generation.

use anyhow::Context;
use aural_engine::{SYNTHETIC_IMPULSE_SECS, SYNTHETIC_RT60_SECS};
use aural_io::{Waveform, write_file};
use aural_reverb::ImpulseResponse;
use clap::Args;
use std::path::PathBuf;

/// Write an exponentially decaying noise burst usable as a room response.
#[derive(Args)]
pub struct ImpulseArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Length in seconds
    #[arg(long, default_value_t = SYNTHETIC_IMPULSE_SECS)]
    duration: f32,

    /// Time for the tail to fall by 60 dB, in seconds
    #[arg(long, default_value_t = SYNTHETIC_RT60_SECS)]
    rt60: f32,

    /// Number of channels
    #[arg(long, default_value = "2")]
    channels: usize,

    /// Output bit depth (8, 16, 24 or 32)
    #[arg(long, default_value = "24")]
    bit_depth: u16,
}

/// Run the impulse command.
pub fn run(args: ImpulseArgs) -> anyhow::Result<()> {
    let ir = ImpulseResponse::synthetic(args.sample_rate, args.duration, args.rt60, args.channels)?;
    let waveform = Waveform::pcm(args.sample_rate, args.bit_depth, ir.channels().to_vec())?;

    write_file(&args.output, &waveform)
        .with_context(|| format!("cannot write {}", args.output.display()))?;

    println!(
        "Wrote {} ({} ch, {} Hz, {}-bit, {} frames, RT60 {:.2}s)",
        args.output.display(),
        ir.num_channels(),
        ir.sample_rate(),
        args.bit_depth,
        ir.frames(),
        args.rt60
    );
    Ok(())
}
