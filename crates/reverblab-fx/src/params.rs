//! Host-facing parameter set and its bank wire format.
//!
//! Parameters are addressed by a stable numeric id ([`ParamId`]) that never
//! changes once assigned. A bank block holds every parameter in id order as
//! little-endian `f32`:
//!
//! | Offset | Id | Parameter | Unit | Range | Default |
//! |--------|----|-----------|------|-------|---------|
//! | 0  | 0 | Decay time | s | 0.1 – 20 | 0.5 |
//! | 4  | 1 | HF cutoff | Hz | 20 – 20000 | 15000 |
//! | 8  | 2 | HF attenuation | dB of cut | 0 – 60 | 0 |
//! | 12 | 3 | Stereo width | × | 0 – 2 | 1 |
//! | 16 | 4 | Dry/wet mix | % | 0 – 100 | 50 |
//! | 20 | 5 | Output gain | dB | -60 – 12 | 0 |
//! | 24 | 6 | Room size | ms | 5 – 500 | 80 |
//!
//! An empty block means "all defaults". Any other size than [`BANK_SIZE`]
//! is rejected.

use thiserror::Error;

/// Number of parameters.
pub const PARAM_COUNT: usize = 7;

/// Size in bytes of a full parameter bank block.
pub const BANK_SIZE: usize = PARAM_COUNT * 4;

/// Errors from parameter updates and bank loading.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ParamError {
    /// Bank block has the wrong size
    #[error("parameter bank is {actual} bytes, expected 0 or {expected}")]
    BankSize {
        /// Required block size.
        expected: usize,
        /// Size of the rejected block.
        actual: usize,
    },

    /// No parameter with this id
    #[error("unknown parameter id {0}")]
    UnknownId(u32),

    /// Value is NaN or infinite
    #[error("non-finite value for parameter '{name}'")]
    NonFinite {
        /// Name of the parameter.
        name: &'static str,
    },
}

/// Display unit of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUnit {
    /// Seconds (s).
    Seconds,
    /// Milliseconds (ms).
    Milliseconds,
    /// Hertz (Hz).
    Hertz,
    /// Decibels (dB).
    Decibels,
    /// Percentage (%).
    Percent,
    /// Dimensionless multiplier.
    Ratio,
}

impl ParamUnit {
    /// Unit suffix for display.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Seconds => " s",
            Self::Milliseconds => " ms",
            Self::Hertz => " Hz",
            Self::Decibels => " dB",
            Self::Percent => "%",
            Self::Ratio => "x",
        }
    }
}

/// Static metadata for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Display name.
    pub name: &'static str,
    /// Stable string key used by presets and the CLI (`rt60`, `hf_cutoff`, ...).
    pub key: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Minimum value.
    pub min: f32,
    /// Maximum value.
    pub max: f32,
    /// Default value.
    pub default: f32,
}

impl ParamDescriptor {
    /// Clamp `value` into `[min, max]`.
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Format `value` with the unit suffix.
    pub fn format(&self, value: f32) -> String {
        format!("{value:.2}{}", self.unit.suffix())
    }
}

/// Stable parameter identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ParamId {
    /// Decay time (RT60) in seconds.
    Rt60 = 0,
    /// Damping cutoff in Hz.
    HfCutoff = 1,
    /// High-frequency cut in dB; 0 selects a plain lowpass.
    HfAttenuation = 2,
    /// Mid/side width multiplier.
    StereoWidth = 3,
    /// Wet share in percent.
    DryWetMix = 4,
    /// Output gain in dB.
    OutputGain = 5,
    /// Room size in ms.
    RoomSize = 6,
}

const DESCRIPTORS: [ParamDescriptor; PARAM_COUNT] = [
    ParamDescriptor {
        name: "Decay Time",
        key: "rt60",
        unit: ParamUnit::Seconds,
        min: 0.1,
        max: 20.0,
        default: 0.5,
    },
    ParamDescriptor {
        name: "HF Cutoff",
        key: "hf_cutoff",
        unit: ParamUnit::Hertz,
        min: 20.0,
        max: 20000.0,
        default: 15000.0,
    },
    ParamDescriptor {
        name: "HF Attenuation",
        key: "hf_attenuation",
        unit: ParamUnit::Decibels,
        min: 0.0,
        max: 60.0,
        default: 0.0,
    },
    ParamDescriptor {
        name: "Stereo Width",
        key: "stereo_width",
        unit: ParamUnit::Ratio,
        min: 0.0,
        max: 2.0,
        default: 1.0,
    },
    ParamDescriptor {
        name: "Dry/Wet Mix",
        key: "dry_wet",
        unit: ParamUnit::Percent,
        min: 0.0,
        max: 100.0,
        default: 50.0,
    },
    ParamDescriptor {
        name: "Output Gain",
        key: "output_gain",
        unit: ParamUnit::Decibels,
        min: -60.0,
        max: 12.0,
        default: 0.0,
    },
    ParamDescriptor {
        name: "Room Size",
        key: "room_size",
        unit: ParamUnit::Milliseconds,
        min: 5.0,
        max: 500.0,
        default: 80.0,
    },
];

impl ParamId {
    /// Every parameter in id order.
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::Rt60,
        ParamId::HfCutoff,
        ParamId::HfAttenuation,
        ParamId::StereoWidth,
        ParamId::DryWetMix,
        ParamId::OutputGain,
        ParamId::RoomSize,
    ];

    /// Look up a parameter by numeric id.
    pub fn from_raw(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Look up a parameter by its string key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.descriptor().key == key)
    }

    /// Numeric id.
    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Position in a bank block and in [`ParamValues`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Change-flag bit for this parameter.
    pub fn bit(self) -> u32 {
        1 << self.raw()
    }

    /// Static metadata.
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &DESCRIPTORS[self.index()]
    }

    /// Reject non-finite values and clamp the rest into range.
    pub fn sanitize(self, value: f32) -> Result<f32, ParamError> {
        let desc = self.descriptor();
        if value.is_finite() {
            Ok(desc.clamp(value))
        } else {
            Err(ParamError::NonFinite { name: desc.name })
        }
    }
}

/// A complete set of parameter values, always within range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamValues {
    values: [f32; PARAM_COUNT],
}

impl Default for ParamValues {
    fn default() -> Self {
        Self {
            values: DESCRIPTORS.map(|d| d.default),
        }
    }
}

impl ParamValues {
    /// Decode a bank block. An empty block yields defaults.
    pub fn from_bank(block: &[u8]) -> Result<Self, ParamError> {
        if block.is_empty() {
            return Ok(Self::default());
        }
        if block.len() != BANK_SIZE {
            return Err(ParamError::BankSize {
                expected: BANK_SIZE,
                actual: block.len(),
            });
        }

        let mut values = Self::default();
        for (id, chunk) in ParamId::ALL.iter().zip(block.chunks_exact(4)) {
            let bytes = [chunk[0], chunk[1], chunk[2], chunk[3]];
            values.set(*id, f32::from_le_bytes(bytes))?;
        }
        Ok(values)
    }

    /// Encode as a bank block.
    pub fn to_bank(&self) -> [u8; BANK_SIZE] {
        let mut block = [0u8; BANK_SIZE];
        for (chunk, value) in block.chunks_exact_mut(4).zip(self.values.iter()) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        block
    }

    /// Current value of `id`.
    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id.index()]
    }

    /// Values already known to be sanitized, in id order.
    pub(crate) fn from_array(values: [f32; PARAM_COUNT]) -> Self {
        Self { values }
    }

    /// Set `id`, clamping into its range. Non-finite values are rejected.
    pub fn set(&mut self, id: ParamId, value: f32) -> Result<f32, ParamError> {
        let clamped = id.sanitize(value)?;
        self.values[id.index()] = clamped;
        Ok(clamped)
    }

    /// Set a parameter by numeric id.
    pub fn set_param(&mut self, id: u32, value: f32) -> Result<f32, ParamError> {
        let param = ParamId::from_raw(id).ok_or(ParamError::UnknownId(id))?;
        self.set(param, value)
    }

    /// `(id, value)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamId, f32)> + '_ {
        ParamId::ALL.iter().map(|&id| (id, self.get(id)))
    }
}
