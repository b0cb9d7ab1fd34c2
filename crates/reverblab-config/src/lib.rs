//! Configuration and preset management for the reverblab reverberator.
//!
//! # Features
//!
//! - **Presets**: Load and save reverb presets as TOML
//! - **Validation**: Parameter ranges and engine options, with every failure
//!   reported
//! - **Factory Presets**: Built-in room, hall, cathedral, and plate settings
//!
//! # Example
//!
//! ```rust,no_run
//! use reverblab_config::{Preset, get_factory_preset};
//!
//! // Start from a factory preset and tweak it
//! let mut preset = get_factory_preset("hall").unwrap();
//! preset.set_param("rt60", 3.2).unwrap();
//! preset.name = "Longer Hall".to_string();
//! preset.save("longer_hall.toml").unwrap();
//!
//! // Build the engine configuration from it
//! let config = Preset::load("longer_hall.toml").unwrap().reverb_config().unwrap();
//! assert_eq!(config.rt60, 3.2);
//! ```

mod error;
mod preset;

/// Parameter and engine-option validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset, resolve_preset,
};
pub use preset::{EngineSettings, Preset};
pub use validation::{
    ValidationError, ValidationResult, parse_param_assignment, validate_param, validate_preset,
};
