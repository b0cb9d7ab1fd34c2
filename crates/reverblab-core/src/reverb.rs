//! The reverberator: a diffuser feeding a mixed feedback network.
//!
//! ```text
//! [f32; N] ──> Diffuser<N, STEPS> ──> FeedbackNetwork<N> ──> [f32; N]
//!                  (early)                 (tail)
//! ```
//!
//! # Lifecycle
//!
//! A [`Reverberator`] starts **unconfigured** and produces silence until
//! [`configure`](Reverberator::configure) succeeds. Configuring allocates
//! every delay line, draws the diffusion topology from a ChaCha8 generator
//! seeded with [`ReverbConfig::seed`], and clears all state. It must be
//! repeated after any sample-rate change.
//!
//! # Parameter updates
//!
//! The setters store the new value and recompute derived coefficients only
//! when the value actually changed, so calling them once per frame with
//! unchanged values costs a comparison. None of them allocate.
//!
//! Room size changes retune both stages inside the capacity sized by
//! `configure` ([`ReverbConfig::max_room_size_ms`]); larger rooms are
//! clamped to that capacity until the next `configure`.

use crate::damping::{DampingCoefficients, DampingSettings};
use crate::diffuser::{Diffuser, DiffusionLayout};
use crate::error::{ReverbError, check_sample_rate};
use crate::feedback::{DecayReference, FeedbackNetwork};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default room size in ms.
pub const DEFAULT_ROOM_SIZE_MS: f32 = 80.0;

/// Default decay time in seconds.
pub const DEFAULT_RT60: f32 = 2.0;

/// Default upper bound on room size that `configure` sizes delay lines for.
pub const DEFAULT_MAX_ROOM_SIZE_MS: f32 = 500.0;

/// Where the damping filter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DampingPlacement {
    /// Inside the feedback loop, after the Householder mix. Each trip
    /// darkens the tail further.
    #[default]
    Feedback,
    /// Inside every diffusion step, before the Hadamard mix. Colours the
    /// input to the tail once.
    Diffusion,
}

/// Construction-time options for a [`Reverberator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbConfig {
    /// Room size in ms: base feedback delay and total diffusion time.
    pub room_size_ms: f32,
    /// Decay time in seconds.
    pub rt60: f32,
    /// Damping request.
    pub damping: DampingSettings,
    /// Where damping runs.
    pub damping_placement: DampingPlacement,
    /// Level the decay time is measured against.
    pub decay_reference: DecayReference,
    /// How diffusion time is split among steps.
    pub diffusion_layout: DiffusionLayout,
    /// Seed for the diffusion topology.
    pub seed: u64,
    /// Largest room size reachable through `set_room_size` without
    /// reconfiguring.
    pub max_room_size_ms: f32,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            room_size_ms: DEFAULT_ROOM_SIZE_MS,
            rt60: DEFAULT_RT60,
            damping: DampingSettings::OFF,
            damping_placement: DampingPlacement::default(),
            decay_reference: DecayReference::default(),
            diffusion_layout: DiffusionLayout::default(),
            seed: 0,
            max_room_size_ms: DEFAULT_MAX_ROOM_SIZE_MS,
        }
    }
}

impl ReverbConfig {
    /// Check every field that `configure` depends on.
    pub fn validate(&self) -> Result<(), ReverbError> {
        check_room(self.room_size_ms)?;
        check_room(self.max_room_size_ms)
    }

    /// Delay capacity in ms: the larger of room size and its upper bound.
    fn capacity_ms(&self) -> f32 {
        self.max_room_size_ms.max(self.room_size_ms)
    }
}

/// Multichannel FDN reverberator over `N` channels with `STEPS` diffusion
/// steps.
///
/// `N` must be a power of two.
///
/// # Example
///
/// ```rust
/// use reverblab_core::{ReverbConfig, Reverberator};
///
/// let mut reverb: Reverberator = Reverberator::new(ReverbConfig {
///     room_size_ms: 50.0,
///     rt60: 1.5,
///     ..ReverbConfig::default()
/// });
///
/// // Unconfigured: silence
/// assert_eq!(reverb.process([1.0; 8]), [0.0; 8]);
///
/// reverb.configure(48000.0, 512).unwrap();
/// let mut input = [0.0; 8];
/// input[0] = 1.0;
/// reverb.process(input);
/// ```
#[derive(Debug, Clone)]
pub struct Reverberator<const N: usize = 8, const STEPS: usize = 5> {
    config: ReverbConfig,
    sample_rate: Option<f32>,
    block_size_hint: usize,
    /// Largest room size the delay lines were sized for.
    capacity_ms: f32,
    diffuser: Diffuser<N, STEPS>,
    feedback: FeedbackNetwork<N>,
}

impl<const N: usize, const STEPS: usize> Reverberator<N, STEPS> {
    /// Create an unconfigured reverberator.
    pub fn new(config: ReverbConfig) -> Self {
        const { assert!(N >= 2 && N.is_power_of_two(), "channel count must be a power of two ≥ 2") };

        Self {
            config,
            sample_rate: None,
            block_size_hint: 0,
            capacity_ms: config.capacity_ms(),
            diffuser: Diffuser::new(config.room_size_ms, config.diffusion_layout),
            feedback: FeedbackNetwork::new(config.room_size_ms),
        }
    }

    /// Allocate delay lines for `sample_rate`, draw the diffusion topology
    /// and clear all state.
    ///
    /// On error the previous state (configured or not) is left untouched.
    /// `block_size_hint` is the host's largest block; the algorithm runs per
    /// sample and only records it.
    pub fn configure(&mut self, sample_rate: f32, block_size_hint: usize) -> Result<(), ReverbError> {
        check_sample_rate(sample_rate)?;
        self.config.validate()?;

        let capacity_ms = self.config.capacity_ms();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let mut diffuser = Diffuser::new(self.config.room_size_ms, self.config.diffusion_layout);
        diffuser.configure(sample_rate, capacity_ms, &mut rng)?;
        let mut feedback = FeedbackNetwork::new(self.config.room_size_ms);
        feedback.configure(sample_rate, capacity_ms)?;

        self.diffuser = diffuser;
        self.feedback = feedback;
        self.sample_rate = Some(sample_rate);
        self.block_size_hint = block_size_hint;
        self.capacity_ms = capacity_ms;
        self.feedback
            .set_decay_time(self.config.rt60, self.config.decay_reference);
        self.apply_damping();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate,
            block_size_hint,
            room_size_ms = self.config.room_size_ms,
            rt60 = self.config.rt60,
            decay_gain = self.feedback.decay_gain(),
            "reverb configured: {} channels, {} diffusion steps",
            N,
            STEPS
        );
        Ok(())
    }

    /// Process one channel vector.
    ///
    /// Returns silence while unconfigured.
    #[inline]
    pub fn process(&mut self, input: [f32; N]) -> [f32; N] {
        if self.sample_rate.is_none() {
            return [0.0; N];
        }
        let diffused = self.diffuser.process(input);
        self.feedback.process(diffused)
    }

    /// Set the decay time in seconds.
    ///
    /// Any value is accepted; the resulting gain is clamped into (0, 1).
    pub fn set_decay_time(&mut self, rt60_secs: f32) {
        if rt60_secs == self.config.rt60 {
            return;
        }
        self.config.rt60 = rt60_secs;
        self.feedback
            .set_decay_time(rt60_secs, self.config.decay_reference);
    }

    /// Set damping: cutoff in Hz and optional shelf attenuation in dB of cut.
    ///
    /// `None` selects the lowpass. See [`crate::damping`] for when the
    /// filter is bypassed. Filter state is reset whenever the request changes.
    pub fn set_damping(&mut self, cutoff_hz: f32, attenuation_db: Option<f32>) {
        let settings = DampingSettings {
            cutoff_hz,
            attenuation_db,
        };
        if settings == self.config.damping {
            return;
        }
        self.config.damping = settings;
        self.apply_damping();
    }

    /// Set the room size in ms, retuning both stages.
    ///
    /// Never allocates. Once configured, sizes above the capacity sized at
    /// `configure` are clamped to it, so the stored room size, the delay
    /// spread and the decay gain always describe the loop that runs.
    pub fn set_room_size(&mut self, room_size_ms: f32) -> Result<(), ReverbError> {
        check_room(room_size_ms)?;
        let capacity_ms = self.capacity_ms;
        let room_size_ms = if self.sample_rate.is_some() && room_size_ms > capacity_ms {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                room_size_ms,
                capacity_ms,
                "room size exceeds configured capacity, clamped"
            );
            capacity_ms
        } else {
            room_size_ms
        };
        if room_size_ms == self.config.room_size_ms {
            return Ok(());
        }

        self.diffuser.set_diffusion_ms(room_size_ms)?;
        self.feedback.set_delay_ms(room_size_ms)?;
        self.config.room_size_ms = room_size_ms;
        self.feedback
            .set_decay_time(self.config.rt60, self.config.decay_reference);
        Ok(())
    }

    /// Snap filter states below the denormal threshold to exact zero.
    ///
    /// Call on a fixed cadence; it touches only filter memory, never the
    /// delay lines, so it has no audible effect.
    pub fn flush_denormals(&mut self) {
        self.diffuser.snap_to_zero();
        self.feedback.snap_to_zero();
    }

    /// Clear delay lines and filter state, keeping the configuration.
    pub fn reset(&mut self) {
        self.diffuser.reset();
        self.feedback.reset();
    }

    /// Whether `configure` has succeeded.
    pub fn is_configured(&self) -> bool {
        self.sample_rate.is_some()
    }

    /// Configured sample rate, if any.
    pub fn sample_rate(&self) -> Option<f32> {
        self.sample_rate
    }

    /// Block size recorded by the last successful `configure`.
    pub fn block_size_hint(&self) -> usize {
        self.block_size_hint
    }

    /// Current options, including values pushed through the setters.
    pub fn config(&self) -> &ReverbConfig {
        &self.config
    }

    /// Per-loop gain of the feedback network.
    pub fn decay_gain(&self) -> f32 {
        self.feedback.decay_gain()
    }

    /// Damping coefficients as currently designed.
    ///
    /// Always [`DampingCoefficients::BYPASS`] while unconfigured.
    pub fn damping_coefficients(&self) -> DampingCoefficients {
        match self.sample_rate {
            Some(sr) => DampingCoefficients::design(self.config.damping, sr),
            None => DampingCoefficients::BYPASS,
        }
    }

    /// The diffusion stage.
    pub fn diffuser(&self) -> &Diffuser<N, STEPS> {
        &self.diffuser
    }

    /// The feedback stage.
    pub fn feedback(&self) -> &FeedbackNetwork<N> {
        &self.feedback
    }

    fn apply_damping(&mut self) {
        let coeffs = self.damping_coefficients();
        let (diffusion, feedback) = match self.config.damping_placement {
            DampingPlacement::Diffusion => (coeffs, DampingCoefficients::BYPASS),
            DampingPlacement::Feedback => (DampingCoefficients::BYPASS, coeffs),
        };
        self.diffuser.set_damping(diffusion);
        self.feedback.set_damping(feedback);
    }
}

impl<const N: usize, const STEPS: usize> Default for Reverberator<N, STEPS> {
    fn default() -> Self {
        Self::new(ReverbConfig::default())
    }
}

fn check_room(ms: f32) -> Result<(), ReverbError> {
    if ms.is_finite() && ms > 0.0 {
        Ok(())
    } else {
        Err(ReverbError::InvalidRoomSize(ms))
    }
}
