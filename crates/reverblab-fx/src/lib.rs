//! ReverbLab FX - stereo effect wrapper around the FDN reverberator
//!
//! Everything a host needs around [`reverblab_core::Reverberator`]:
//!
//! - [`params`] - Parameter ids, ranges, and the bank wire format
//! - [`SharedParams`] - Lock-free handoff from control threads to the audio thread
//! - [`StereoMultiMixer`] - Stereo ↔ N-channel up/down mix
//! - [`TailHandler`] - Ring-out bookkeeping after input ends
//! - [`SmoothedParam`] - Click-free output gain
//! - [`ReverbLabFx`] - The effect itself
//!
//! # Example
//!
//! ```rust
//! use reverblab_fx::{ParamId, ReverbLabFx, SharedParams};
//!
//! let params = SharedParams::new();
//! let mut fx: ReverbLabFx = ReverbLabFx::new(params.clone());
//! fx.init(44100.0, 512).unwrap();
//!
//! // From any thread
//! params.set(ParamId::DryWetMix, 30.0).unwrap();
//!
//! // On the audio thread
//! let out = fx.process_frame([0.5, 0.5]);
//! assert!(out[0].is_finite());
//! ```

pub mod effect;
pub mod mixer;
pub mod params;
pub mod shared;
pub mod smoothing;
pub mod tail;

pub use effect::{FLUSH_INTERVAL, GAIN_SMOOTHING_MS, ReverbLabFx};
pub use mixer::StereoMultiMixer;
pub use params::{
    BANK_SIZE, PARAM_COUNT, ParamDescriptor, ParamError, ParamId, ParamUnit, ParamValues,
};
pub use shared::{ChangeSet, SharedParams};
pub use smoothing::SmoothedParam;
pub use tail::{ProcessStatus, TailHandler, tail_frames};
