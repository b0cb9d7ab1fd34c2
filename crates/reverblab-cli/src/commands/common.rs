//! Helpers shared by the commands.

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use reverblab_config::{Preset, resolve_preset};
use reverblab_core::linear_to_db;
use reverblab_fx::{ParamId, ReverbLabFx, SharedParams};

/// Resolve a preset by path or factory name and apply overrides on top.
pub fn load_preset(name_or_path: &str, overrides: &[(ParamId, f32)]) -> anyhow::Result<Preset> {
    let mut preset = resolve_preset(name_or_path)?;
    for &(id, value) in overrides {
        preset = preset.with_param(id, value);
    }
    preset
        .validate()
        .with_context(|| format!("preset '{}'", preset.name))?;
    Ok(preset)
}

/// Build and initialize the effect for a preset.
pub fn build_effect(
    preset: &Preset,
    sample_rate: f32,
    block_size: usize,
) -> anyhow::Result<ReverbLabFx> {
    let params = SharedParams::from_values(preset.param_values()?);
    let mut fx: ReverbLabFx = ReverbLabFx::with_config(params, preset.reverb_config()?);
    fx.init(sample_rate, block_size)?;
    Ok(fx)
}

/// One line per parameter: name, formatted value, key.
pub fn describe_params(preset: &Preset) -> Vec<String> {
    ParamId::ALL
        .iter()
        .map(|&id| {
            let desc = id.descriptor();
            format!(
                "  {:<16} {:>12}   ({})",
                desc.name,
                desc.format(preset.param(id)),
                desc.key
            )
        })
        .collect()
}

/// Progress bar over `len` frames.
pub fn progress_bar(len: u64) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

/// RMS level in dB.
pub fn rms_db(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return linear_to_db(0.0);
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    linear_to_db((sum / samples.len() as f64).sqrt() as f32)
}

/// Peak level in dB.
pub fn peak_db(samples: &[f32]) -> f32 {
    linear_to_db(samples.iter().fold(0.0f32, |p, s| p.max(s.abs())))
}
