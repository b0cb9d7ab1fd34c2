//! Parameter and engine-option validation.
//!
//! Parameter keys are the [`ParamId`] keys (`rt60`, `hf_cutoff`, ...).
//! Lookup ignores case and treats `-` like `_`, so `HF-Cutoff` names the
//! same parameter as `hf_cutoff`.
//!
//! # Example
//!
//! ```rust
//! use reverblab_config::{parse_param_assignment, validate_param, ValidationError};
//! use reverblab_fx::ParamId;
//!
//! assert_eq!(validate_param("rt60", 2.5), Ok(ParamId::Rt60));
//! assert!(matches!(
//!     validate_param("dry_wet", 150.0),
//!     Err(ValidationError::OutOfRange { .. })
//! ));
//! assert_eq!(parse_param_assignment("room-size=120"), Ok((ParamId::RoomSize, 120.0)));
//! ```

use reverblab_core::{DampingPlacement, DecayReference, DiffusionLayout};
use reverblab_fx::ParamId;
use thiserror::Error;

use crate::preset::Preset;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Unknown parameter key.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Parameter key.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Engine option with an unrecognized value.
    #[error("invalid {option} '{value}', expected one of: {expected}")]
    InvalidOption {
        /// Option name.
        option: &'static str,
        /// The value given.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },

    /// Invalid `key=value` syntax.
    #[error("invalid format for parameter '{param}': {reason}")]
    InvalidFormat {
        /// The text that failed to parse.
        param: String,
        /// Description of the format error.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('-', "_")
}

/// Resolve a parameter key.
pub fn param_id(key: &str) -> ValidationResult<ParamId> {
    ParamId::from_key(&normalize_key(key))
        .ok_or_else(|| ValidationError::UnknownParameter(key.to_string()))
}

/// Check that `key` names a parameter and `value` lies within its range.
///
/// Non-finite values are always out of range.
pub fn validate_param(key: &str, value: f32) -> ValidationResult<ParamId> {
    let id = param_id(key)?;
    let desc = id.descriptor();
    if value.is_finite() && (desc.min..=desc.max).contains(&value) {
        Ok(id)
    } else {
        Err(ValidationError::OutOfRange {
            param: desc.key.to_string(),
            value,
            min: desc.min,
            max: desc.max,
        })
    }
}

/// Parse and validate a `key=value` assignment.
pub fn parse_param_assignment(assignment: &str) -> ValidationResult<(ParamId, f32)> {
    let (key, value) =
        assignment
            .split_once('=')
            .ok_or_else(|| ValidationError::InvalidFormat {
                param: assignment.to_string(),
                reason: "expected key=value".to_string(),
            })?;
    let value: f32 = value
        .trim()
        .parse()
        .map_err(|e| ValidationError::InvalidFormat {
            param: key.trim().to_string(),
            reason: format!("{e}"),
        })?;
    let id = validate_param(key, value)?;
    Ok((id, value))
}

const PLACEMENTS: &str = "feedback, diffusion";
const LAYOUTS: &str = "halving, equal";
const REFERENCES: &str = "-60, -45";

/// Parse a damping placement name.
pub fn parse_damping_placement(name: &str) -> ValidationResult<DampingPlacement> {
    match normalize_key(name).as_str() {
        "feedback" => Ok(DampingPlacement::Feedback),
        "diffusion" => Ok(DampingPlacement::Diffusion),
        _ => Err(ValidationError::InvalidOption {
            option: "damping placement",
            value: name.to_string(),
            expected: PLACEMENTS,
        }),
    }
}

/// Name of a damping placement, as accepted by [`parse_damping_placement`].
pub fn damping_placement_name(placement: DampingPlacement) -> &'static str {
    match placement {
        DampingPlacement::Feedback => "feedback",
        DampingPlacement::Diffusion => "diffusion",
    }
}

/// Parse a diffusion layout name.
pub fn parse_diffusion_layout(name: &str) -> ValidationResult<DiffusionLayout> {
    match normalize_key(name).as_str() {
        "halving" => Ok(DiffusionLayout::Halving),
        "equal" => Ok(DiffusionLayout::Equal),
        _ => Err(ValidationError::InvalidOption {
            option: "diffusion layout",
            value: name.to_string(),
            expected: LAYOUTS,
        }),
    }
}

/// Name of a diffusion layout, as accepted by [`parse_diffusion_layout`].
pub fn diffusion_layout_name(layout: DiffusionLayout) -> &'static str {
    match layout {
        DiffusionLayout::Halving => "halving",
        DiffusionLayout::Equal => "equal",
    }
}

/// Decay reference for a level in dB: `-60` or `-45`.
pub fn decay_reference_from_db(db: i32) -> ValidationResult<DecayReference> {
    match db {
        -60 => Ok(DecayReference::Minus60Db),
        -45 => Ok(DecayReference::Minus45Db),
        _ => Err(ValidationError::InvalidOption {
            option: "decay reference",
            value: db.to_string(),
            expected: REFERENCES,
        }),
    }
}

/// Level in dB of a decay reference.
pub fn decay_reference_db(reference: DecayReference) -> i32 {
    reference.db() as i32
}

/// Validate every parameter and engine option of a preset, collecting all
/// failures.
pub fn validate_preset(preset: &Preset) -> ValidationResult<()> {
    let mut errors = Vec::new();

    for (key, &value) in &preset.params {
        if let Err(e) = validate_param(key, value as f32) {
            errors.push(e);
        }
    }
    if let Err(e) = parse_damping_placement(&preset.engine.damping_placement) {
        errors.push(e);
    }
    if let Err(e) = parse_diffusion_layout(&preset.engine.diffusion_layout) {
        errors.push(e);
    }
    if let Err(e) = decay_reference_from_db(preset.engine.decay_reference_db) {
        errors.push(e);
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.swap_remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_lookup_normalizes() {
        assert_eq!(param_id("HF-Cutoff"), Ok(ParamId::HfCutoff));
        assert_eq!(param_id(" stereo_width "), Ok(ParamId::StereoWidth));
        assert_eq!(
            param_id("wetness"),
            Err(ValidationError::UnknownParameter("wetness".to_string()))
        );
    }

    #[test]
    fn test_validate_param_bounds() {
        assert!(validate_param("rt60", 0.1).is_ok());
        assert!(validate_param("rt60", 20.0).is_ok());
        assert!(validate_param("rt60", 20.5).is_err());
        assert!(validate_param("output_gain", -60.0).is_ok());
        assert!(validate_param("hf_attenuation", -1.0).is_err());

        let err = validate_param("room_size", f32::NAN).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref param, .. } if param == "room_size"));
    }

    #[test]
    fn test_assignment_parsing() {
        assert_eq!(
            parse_param_assignment("dry_wet = 40"),
            Ok((ParamId::DryWetMix, 40.0))
        );
        assert!(matches!(
            parse_param_assignment("rt60"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_param_assignment("rt60=long"),
            Err(ValidationError::InvalidFormat { ref param, .. }) if param == "rt60"
        ));
        assert!(matches!(
            parse_param_assignment("rt60=100"),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_engine_option_names_round_trip() {
        for placement in [DampingPlacement::Feedback, DampingPlacement::Diffusion] {
            assert_eq!(
                parse_damping_placement(damping_placement_name(placement)),
                Ok(placement)
            );
        }
        for layout in [DiffusionLayout::Halving, DiffusionLayout::Equal] {
            assert_eq!(parse_diffusion_layout(diffusion_layout_name(layout)), Ok(layout));
        }
        for reference in [DecayReference::Minus60Db, DecayReference::Minus45Db] {
            assert_eq!(
                decay_reference_from_db(decay_reference_db(reference)),
                Ok(reference)
            );
        }
    }

    #[test]
    fn test_invalid_options() {
        let err = parse_damping_placement("everywhere").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid damping placement 'everywhere', expected one of: feedback, diffusion"
        );
        assert!(parse_diffusion_layout("spiral").is_err());
        assert!(decay_reference_from_db(-30).is_err());
    }

    #[test]
    fn test_validate_preset_collects_errors() {
        let mut preset = Preset::new("Broken");
        preset.params.insert("rt60".to_string(), 50.0);
        preset.params.insert("wetness".to_string(), 1.0);
        preset.engine.diffusion_layout = "spiral".to_string();

        match validate_preset(&preset) {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected multiple errors, got {other:?}"),
        }

        assert!(validate_preset(&Preset::new("Fine")).is_ok());
    }
}
