//! ReverbLab Analysis - measuring what the reverberator actually does
//!
//! - [`ir`] - multichannel impulse responses rendered from a
//!   [`Reverberator`](reverblab_core::Reverberator)
//! - [`decay`] - Schroeder energy decay curves and RT60 estimation (EDT,
//!   T20, T30)
//! - [`spectrum`] - windowed spectra and spectral centroid, for following
//!   how damping darkens a tail
//!
//! ## Example
//!
//! ```rust
//! use reverblab_analysis::ImpulseResponse;
//! use reverblab_core::{ReverbConfig, Reverberator};
//!
//! let mut reverb: Reverberator = Reverberator::new(ReverbConfig {
//!     room_size_ms: 30.0,
//!     rt60: 0.5,
//!     ..ReverbConfig::default()
//! });
//! reverb.configure(8000.0, 64).unwrap();
//!
//! let ir = ImpulseResponse::render(&mut reverb, 8000).unwrap();
//! let estimate = ir.estimate_rt60().unwrap();
//! assert!((estimate.rt60_seconds - 0.5).abs() < 0.1);
//! ```

pub mod decay;
pub mod ir;
pub mod spectrum;

pub use decay::{Rt60Estimate, energy_decay_curve, estimate_rt60, estimate_rt60_from_energy};
pub use ir::{ImpulseResponse, impulse};
pub use spectrum::{SpectrumAnalyzer, Window, spectral_centroid};
