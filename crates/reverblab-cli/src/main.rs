//! ReverbLab CLI - run the FDN reverb over WAV files and measure it.

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reverblab")]
#[command(author, version, about = "Multichannel FDN reverb", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the reverb, appending its tail
    Process(commands::process::ProcessArgs),

    /// Render a preset's impulse response and measure its decay
    Impulse(commands::impulse::ImpulseArgs),

    /// List, show, and export presets
    Presets(commands::presets::PresetsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Impulse(args) => commands::impulse::run(args),
        Commands::Presets(args) => commands::presets::run(args),
    }
}
