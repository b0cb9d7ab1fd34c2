//! Preset file format and operations.

use reverblab_core::{
    DampingPlacement, DampingSettings, DecayReference, DiffusionLayout, ReverbConfig,
};
use reverblab_fx::{ParamId, ParamValues};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;
use crate::validation::{
    self, ValidationResult, damping_placement_name, decay_reference_db, diffusion_layout_name,
    parse_damping_placement, parse_diffusion_layout,
};

/// A reverb preset: host-level parameters plus engine options.
///
/// Parameters left out of the file take their defaults.
///
/// # TOML Format
///
/// ```toml
/// name = "Hall"
/// description = "Large concert hall"
///
/// [params]
/// rt60 = 2.4
/// hf_cutoff = 6000.0
/// hf_attenuation = 6.0
/// dry_wet = 35.0
/// room_size = 120.0
///
/// [engine]
/// damping_placement = "feedback"
/// decay_reference_db = -60
/// diffusion_layout = "halving"
/// seed = 0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameter values by key.
    #[serde(default)]
    pub params: BTreeMap<String, f64>,

    /// Engine options fixed at configuration time.
    #[serde(default)]
    pub engine: EngineSettings,
}

/// Engine options, stored by name so preset files stay readable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// `"feedback"` or `"diffusion"`.
    pub damping_placement: String,
    /// `-60` or `-45`.
    pub decay_reference_db: i32,
    /// `"halving"` or `"equal"`.
    pub diffusion_layout: String,
    /// Seed for the diffusion topology.
    pub seed: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            damping_placement: damping_placement_name(DampingPlacement::default()).to_string(),
            decay_reference_db: decay_reference_db(DecayReference::default()),
            diffusion_layout: diffusion_layout_name(DiffusionLayout::default()).to_string(),
            seed: 0,
        }
    }
}

impl EngineSettings {
    /// Damping placement, validated.
    pub fn damping_placement(&self) -> ValidationResult<DampingPlacement> {
        parse_damping_placement(&self.damping_placement)
    }

    /// Decay reference, validated.
    pub fn decay_reference(&self) -> ValidationResult<DecayReference> {
        validation::decay_reference_from_db(self.decay_reference_db)
    }

    /// Diffusion layout, validated.
    pub fn diffusion_layout(&self) -> ValidationResult<DiffusionLayout> {
        parse_diffusion_layout(&self.diffusion_layout)
    }
}

/// Widen through the shortest decimal form so `0.1f32` is written as `0.1`.
fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(f64::from(value))
}

impl Preset {
    /// Create a preset with every parameter at its default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            params: BTreeMap::new(),
            engine: EngineSettings::default(),
        }
    }

    /// Capture a full set of parameter values.
    pub fn from_values(name: impl Into<String>, values: &ParamValues) -> Self {
        let mut preset = Self::new(name);
        for (id, value) in values.iter() {
            preset
                .params
                .insert(id.descriptor().key.to_string(), widen(value));
        }
        preset
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set a parameter.
    pub fn with_param(mut self, id: ParamId, value: f32) -> Self {
        self.params
            .insert(id.descriptor().key.to_string(), widen(value));
        self
    }

    /// Replace the engine options.
    pub fn with_engine(mut self, engine: EngineSettings) -> Self {
        self.engine = engine;
        self
    }

    /// Set a parameter by key after validating it. Returns the parameter it
    /// resolved to.
    pub fn set_param(&mut self, key: &str, value: f32) -> ValidationResult<ParamId> {
        let id = validation::validate_param(key, value)?;
        self.params
            .insert(id.descriptor().key.to_string(), widen(value));
        Ok(id)
    }

    /// Value of one parameter, or its default if the preset leaves it out.
    pub fn param(&self, id: ParamId) -> f32 {
        self.params
            .get(id.descriptor().key)
            .map_or(id.descriptor().default, |&v| v as f32)
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let preset: Preset = toml::from_str(&content)?;
        Ok(preset)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating missing parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate every parameter and engine option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_preset(self)?;
        Ok(())
    }

    /// Validated parameter values.
    pub fn param_values(&self) -> Result<ParamValues, ConfigError> {
        self.validate()?;
        let mut values = ParamValues::default();
        for id in ParamId::ALL {
            values.set(id, self.param(id))?;
        }
        Ok(values)
    }

    /// Reverberator configuration for this preset.
    ///
    /// An HF attenuation above 0 dB selects shelf damping, 0 dB a lowpass
    /// at the HF cutoff.
    pub fn reverb_config(&self) -> Result<ReverbConfig, ConfigError> {
        let values = self.param_values()?;
        let cutoff = values.get(ParamId::HfCutoff);
        let attenuation = values.get(ParamId::HfAttenuation);
        let damping = if attenuation > 0.0 {
            DampingSettings::shelf(cutoff, attenuation)
        } else {
            DampingSettings::lowpass(cutoff)
        };

        Ok(ReverbConfig {
            room_size_ms: values.get(ParamId::RoomSize),
            rt60: values.get(ParamId::Rt60),
            damping,
            damping_placement: self.engine.damping_placement()?,
            decay_reference: self.engine.decay_reference()?,
            diffusion_layout: self.engine.diffusion_layout()?,
            seed: self.engine.seed,
            ..ReverbConfig::default()
        })
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
