//! Integration tests for reverblab-config.
//!
//! Presets go to disk and back, then drive the effect.

use reverblab_config::{ConfigError, Preset, factory_presets, get_factory_preset, resolve_preset};
use reverblab_fx::{ParamId, ReverbLabFx, SharedParams};
use tempfile::TempDir;

#[test]
fn test_save_and_load_preset() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("hall.toml");

    let mut preset = get_factory_preset("hall").unwrap();
    preset.set_param("rt60", 3.2).unwrap();
    preset.save(&path).unwrap();

    let loaded = Preset::load(&path).unwrap();
    assert_eq!(loaded, preset);
    assert_eq!(loaded.param(ParamId::Rt60), 3.2);

    // A path takes precedence over factory names
    assert_eq!(resolve_preset(path.to_str().unwrap()).unwrap(), preset);
}

#[test]
fn test_load_errors() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.toml");
    assert!(matches!(
        Preset::load(&missing),
        Err(ConfigError::ReadFile { .. })
    ));

    let garbled = temp.path().join("garbled.toml");
    std::fs::write(&garbled, "name = [").unwrap();
    assert!(matches!(
        Preset::load(&garbled),
        Err(ConfigError::TomlParse(_))
    ));
}

#[test]
fn test_factory_presets_drive_effect() {
    for preset in factory_presets() {
        let values = preset.param_values().unwrap();
        let config = preset.reverb_config().unwrap();
        let mut fx: ReverbLabFx = ReverbLabFx::with_config(SharedParams::from_values(values), config);
        fx.init(48000.0, 256).unwrap();

        assert_eq!(fx.reverb().config().rt60, preset.param(ParamId::Rt60));
        assert_eq!(
            fx.reverb().config().room_size_ms,
            preset.param(ParamId::RoomSize)
        );

        // Long enough for the largest room's first feedback arrival
        let mut peak = 0.0f32;
        let first = fx.process_frame([1.0, 1.0]);
        assert!(first.iter().all(|s| s.is_finite()));
        for _ in 0..48000 {
            let [l, r] = fx.process_frame([0.0, 0.0]);
            assert!(l.is_finite() && r.is_finite(), "{}", preset.name);
            peak = peak.max(l.abs()).max(r.abs());
        }
        assert!(peak > 0.0, "{} produced no tail", preset.name);
    }
}
