//! Aural CLI - offline reverberation of WAV files.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aural")]
#[command(author, version, about = "Aural reverberation engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a reverb to a WAV file
    Process(commands::process::ProcessArgs),

    /// Display WAV file metadata
    Info(commands::info::InfoArgs),

    /// Generate a synthetic room impulse response
    Impulse(commands::impulse::ImpulseArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays a clean report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Impulse(args) => commands::impulse::run(args),
    }
}
