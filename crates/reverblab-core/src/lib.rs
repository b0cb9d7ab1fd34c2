//! ReverbLab Core - multichannel feedback delay network reverberator
//!
//! This crate provides the reverb algorithm itself: fixed-size channel
//! vectors run through a diffusion stage and a mixed feedback loop, with
//! zero allocation in the audio path.
//!
//! # Signal Flow
//!
//! ```text
//! input [f32; N]
//!   └─> Diffuser (STEPS × { random delays → [damping] → Hadamard → ±1 })
//!         └─> FeedbackNetwork (delays → Householder → [damping] → × decay gain ─┐)
//!               │                     ^                                        │
//!               │                     └────────────────────────────────────────┘
//!               └─> output [f32; N]
//! ```
//!
//! # Building Blocks
//!
//! - [`DelayLine`] - Integer-offset circular buffer
//! - [`hadamard_in_place`], [`householder_in_place`] - Orthogonal mixing
//! - [`DampingFilter`] - TPT one-pole lowpass / high shelf with a
//!   tri-state [`DampingMode`] policy
//! - [`DiffusionStep`], [`Diffuser`] - Randomized early diffusion
//! - [`FeedbackNetwork`] - Exponentially spaced recirculating delays
//! - [`Reverberator`] - The full algorithm
//!
//! # Decay Time
//!
//! The feedback gain is derived from RT60 and room size by [`decay_gain`];
//! it is never set directly and always lies strictly inside (0, 1).
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! reverblab-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use reverblab_core::{ReverbConfig, Reverberator};
//!
//! let mut reverb: Reverberator<8, 5> = Reverberator::new(ReverbConfig {
//!     room_size_ms: 60.0,
//!     rt60: 2.5,
//!     seed: 42,
//!     ..ReverbConfig::default()
//! });
//! reverb.configure(48000.0, 512).unwrap();
//! reverb.set_damping(6000.0, Some(12.0));
//!
//! let mut frame = [0.0f32; 8];
//! frame[0] = 1.0;
//! for n in 0..48000 {
//!     let out = reverb.process(frame);
//!     frame = [0.0; 8];
//!     if n % 128 == 0 {
//!         reverb.flush_denormals();
//!     }
//!     let _ = out;
//! }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: `process` never allocates, locks, or panics
//! - **Reproducible**: the diffusion topology comes from a seeded ChaCha8
//!   generator, so equal seeds give bit-identical output
//! - **Compile-time shape**: channel and step counts are const generics

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod damping;
pub mod delay;
pub mod diffuser;
pub mod error;
pub mod feedback;
pub mod math;
pub mod mix;
pub mod reverb;

// Re-export main types at crate root
pub use damping::{DampingCoefficients, DampingFilter, DampingMode, DampingSettings};
pub use delay::DelayLine;
pub use diffuser::{DiffusionLayout, DiffusionStep, Diffuser};
pub use error::ReverbError;
pub use feedback::{
    DecayReference, FeedbackNetwork, MAX_DECAY_GAIN, MIN_DECAY_GAIN, decay_gain, loops_per_rt60,
};
pub use math::{DENORMAL_THRESHOLD, db_to_linear, flush_denormal, linear_to_db, ms_to_samples};
pub use mix::{hadamard_in_place, householder_in_place};
pub use reverb::{DampingPlacement, ReverbConfig, Reverberator};
