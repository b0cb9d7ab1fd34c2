//! Factory presets bundled with the library.
//!
//! These are embedded at compile time and always available, so a preset
//! name can be used anywhere a preset file path is accepted.

use std::path::Path;

use crate::{ConfigError, Preset};

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &["init", "room", "hall", "cathedral", "dark_plate"];

static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("init", INIT_PRESET),
    ("room", ROOM_PRESET),
    ("hall", HALL_PRESET),
    ("cathedral", CATHEDRAL_PRESET),
    ("dark_plate", DARK_PLATE_PRESET),
];

/// Every parameter at its default.
const INIT_PRESET: &str = r#"
name = "Init"
description = "Default parameters"
"#;

const ROOM_PRESET: &str = r#"
name = "Room"
description = "Small live room with a short, bright decay"

[params]
rt60 = 0.6
hf_cutoff = 12000.0
hf_attenuation = 3.0
stereo_width = 1.0
dry_wet = 25.0
output_gain = 0.0
room_size = 30.0
"#;

const HALL_PRESET: &str = r#"
name = "Hall"
description = "Large concert hall with gently damped highs"

[params]
rt60 = 2.4
hf_cutoff = 6000.0
hf_attenuation = 6.0
stereo_width = 1.2
dry_wet = 35.0
output_gain = 0.0
room_size = 120.0
"#;

const CATHEDRAL_PRESET: &str = r#"
name = "Cathedral"
description = "Huge stone space, very long decay"

[params]
rt60 = 7.5
hf_cutoff = 4000.0
hf_attenuation = 9.0
stereo_width = 1.5
dry_wet = 45.0
output_gain = -3.0
room_size = 250.0

[engine]
diffusion_layout = "equal"
"#;

const DARK_PLATE_PRESET: &str = r#"
name = "Dark Plate"
description = "Dense plate-style tail rolled off with a lowpass"

[params]
rt60 = 1.8
hf_cutoff = 2500.0
hf_attenuation = 0.0
stereo_width = 1.0
dry_wet = 40.0
output_gain = 0.0
room_size = 45.0

[engine]
damping_placement = "feedback"
decay_reference_db = -45
seed = 7
"#;

/// Get all factory presets.
///
/// # Example
///
/// ```rust
/// use reverblab_config::factory_presets;
///
/// for preset in factory_presets() {
///     println!("{}: {}", preset.name, preset.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by id or display name, case-insensitive.
///
/// # Example
///
/// ```rust
/// use reverblab_config::get_factory_preset;
///
/// let hall = get_factory_preset("Hall").unwrap();
/// assert_eq!(hall.name, "Hall");
/// assert!(get_factory_preset("bunker").is_none());
/// ```
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let name_lower = name.to_lowercase();

    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(id, toml)| Some((id, Preset::from_toml(toml).ok()?)))
        .find(|(id, preset)| **id == name_lower || preset.name.to_lowercase() == name_lower)
        .map(|(_, preset)| preset)
}

/// Get the ids of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a name matches a factory preset (case-insensitive).
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}

/// Load a preset from a TOML file if `name_or_path` points at one,
/// otherwise look it up among the factory presets.
pub fn resolve_preset(name_or_path: &str) -> Result<Preset, ConfigError> {
    let path = Path::new(name_or_path);
    if path.is_file() {
        return Preset::load(path);
    }
    get_factory_preset(name_or_path)
        .ok_or_else(|| ConfigError::PresetNotFound(name_or_path.to_string()))
}
