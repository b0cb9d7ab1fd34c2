//! Preset management commands.

use super::common::{describe_params, load_preset};
use clap::{Args, Subcommand};
use reverblab_config::{FACTORY_PRESET_NAMES, get_factory_preset, parse_param_assignment};
use reverblab_fx::ParamId;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List factory presets
    List,

    /// Show the parameters and engine options of a preset
    Show {
        /// Preset name or path
        name: String,
    },

    /// Write a preset to a TOML file
    Export {
        /// Preset name or path to start from
        name: String,

        /// Output TOML file
        output: PathBuf,

        /// Parameter override (e.g., "rt60=3.5"); repeatable
        #[arg(long, value_parser = parse_param_assignment, number_of_values = 1)]
        param: Vec<(ParamId, f32)>,

        /// Name stored in the exported preset
        #[arg(long)]
        rename: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command {
        PresetsCommand::List => list_presets(),
        PresetsCommand::Show { name } => show_preset(&name),
        PresetsCommand::Export {
            name,
            output,
            param,
            rename,
            force,
        } => export_preset(&name, &output, &param, rename, force),
    }
}

fn list_presets() -> anyhow::Result<()> {
    println!("Factory Presets:");
    println!("================");
    for id in FACTORY_PRESET_NAMES {
        if let Some(preset) = get_factory_preset(id) {
            let desc = preset.description.as_deref().unwrap_or("");
            println!("  {:12} {:12} - {}", id, preset.name, desc);
        }
    }
    Ok(())
}

fn show_preset(name: &str) -> anyhow::Result<()> {
    let preset = load_preset(name, &[])?;

    println!("Preset: {}", preset.name);
    println!("{}", "=".repeat(8 + preset.name.len()));
    if let Some(desc) = &preset.description {
        println!("Description: {desc}");
    }

    println!("\nParameters:");
    for line in describe_params(&preset) {
        println!("{line}");
    }

    let engine = &preset.engine;
    println!("\nEngine:");
    println!("  damping placement  {}", engine.damping_placement);
    println!("  decay reference    {} dB", engine.decay_reference_db);
    println!("  diffusion layout   {}", engine.diffusion_layout);
    println!("  seed               {}", engine.seed);

    Ok(())
}

fn export_preset(
    name: &str,
    output: &Path,
    overrides: &[(ParamId, f32)],
    rename: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "'{}' already exists. Use --force to overwrite.",
            output.display()
        );
    }

    let mut preset = load_preset(name, overrides)?;
    if let Some(new_name) = rename {
        preset.name = new_name;
    }
    preset.save(output)?;
    tracing::info!(preset = %preset.name, path = %output.display(), "preset exported");
    println!("Saved '{}' to {}", preset.name, output.display());
    Ok(())
}
