//! Multichannel diffusion: short randomized delays, Hadamard mixing and
//! polarity flips, chained over progressively shorter delay ranges.
//!
//! ```text
//!        ┌─ delay c0 ─┐
//! in ──> ├─ delay c1 ─┤ ─> [damping] ─> Hadamard ─> ±1 per channel ─> out
//!        └─ delay cN ─┘
//! ```
//!
//! # Delay selection
//!
//! A step's delay range is split into `N` equal contiguous bands and
//! channel `c` draws its delay uniformly from band `c`, so lengths never
//! collide and always cover the whole range. The draw is stored as a
//! position inside the band; changing the range later rescales the lengths
//! without redrawing (and without allocating).

use crate::damping::{DampingCoefficients, DampingFilter};
use crate::delay::DelayLine;
use crate::error::{ReverbError, check_sample_rate};
use crate::math::ms_to_samples;
use crate::mix::hadamard_in_place;
use rand::Rng;

/// How a [`Diffuser`] divides its total diffusion time among its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffusionLayout {
    /// Step `k` spans `total / 2^(k+1)`: 1/2, 1/4, 1/8, ...
    #[default]
    Halving,
    /// Every step spans `total / STEPS`.
    Equal,
}

impl DiffusionLayout {
    /// Delay range in ms of step `index` out of `steps`.
    pub fn step_range_ms(self, total_ms: f32, index: usize, steps: usize) -> f32 {
        match self {
            Self::Halving => total_ms / (1u64 << (index + 1).min(63)) as f32,
            Self::Equal => total_ms / steps.max(1) as f32,
        }
    }
}

/// One diffusion stage over `N` channels.
#[derive(Debug, Clone)]
pub struct DiffusionStep<const N: usize> {
    delay_ms_range: f32,
    sample_rate: f32,
    /// Draw in `[0, 1)` locating each channel's delay inside its band.
    band_position: [f32; N],
    delay_samples: [usize; N],
    flip_polarity: [bool; N],
    delays: [DelayLine; N],
    damping: DampingFilter<N>,
}

impl<const N: usize> DiffusionStep<N> {
    /// Create an unconfigured step spanning `delay_ms_range`.
    pub fn new(delay_ms_range: f32) -> Self {
        Self {
            delay_ms_range,
            sample_rate: 0.0,
            band_position: [0.0; N],
            delay_samples: [1; N],
            flip_polarity: [false; N],
            delays: core::array::from_fn(|_| DelayLine::default()),
            damping: DampingFilter::new(),
        }
    }

    /// Draw delays and polarities, and size the delay lines.
    ///
    /// Lines are sized for `capacity_ms` (at least the current range), so
    /// [`set_delay_range`](Self::set_delay_range) can later grow the range
    /// up to that bound without reallocating.
    pub fn configure<R: Rng + ?Sized>(
        &mut self,
        sample_rate: f32,
        capacity_ms: f32,
        rng: &mut R,
    ) -> Result<(), ReverbError> {
        check_sample_rate(sample_rate)?;
        check_range(self.delay_ms_range)?;
        check_range(capacity_ms)?;

        self.sample_rate = sample_rate;
        let capacity_ms = capacity_ms.max(self.delay_ms_range);
        let max_offset = (libm::ceilf(ms_to_samples(capacity_ms, sample_rate)) as usize).max(1);

        for c in 0..N {
            self.band_position[c] = rng.random::<f32>();
            self.flip_polarity[c] = rng.random_bool(0.5);
            self.delays[c].resize(max_offset);
        }
        self.damping.reset();
        self.update_delay_samples();
        Ok(())
    }

    /// Change the delay range, rescaling the stored draws. Never allocates.
    ///
    /// Lengths that would exceed the sized capacity are clamped to it.
    pub fn set_delay_range(&mut self, delay_ms_range: f32) -> Result<(), ReverbError> {
        check_range(delay_ms_range)?;
        self.delay_ms_range = delay_ms_range;
        if self.sample_rate > 0.0 {
            self.update_delay_samples();
        }
        Ok(())
    }

    fn update_delay_samples(&mut self) {
        let range = ms_to_samples(self.delay_ms_range, self.sample_rate);
        let band = range / N as f32;
        for c in 0..N {
            let low = band * c as f32;
            let length = (low + self.band_position[c] * band) as usize;
            let max_offset = self.delays[c].max_offset().max(1);
            self.delay_samples[c] = length.clamp(1, max_offset);
        }
    }

    /// Install damping coefficients for this step (clears filter state).
    pub fn set_damping(&mut self, coeffs: DampingCoefficients) {
        self.damping.set_coefficients(coeffs);
    }

    /// Damping coefficients installed in this step.
    pub fn damping_coefficients(&self) -> DampingCoefficients {
        self.damping.coefficients()
    }

    /// Process one channel vector.
    #[inline]
    pub fn process(&mut self, input: [f32; N]) -> [f32; N] {
        let mut delayed = [0.0; N];
        for c in 0..N {
            self.delays[c].write(input[c]);
            delayed[c] = self.delays[c].read(self.delay_samples[c]);
        }

        self.damping.process(&mut delayed);
        hadamard_in_place(&mut delayed);

        for (x, &flip) in delayed.iter_mut().zip(self.flip_polarity.iter()) {
            if flip {
                *x = -*x;
            }
        }
        delayed
    }

    /// Snap damping state below the denormal threshold to zero.
    pub fn snap_to_zero(&mut self) {
        self.damping.snap_to_zero();
    }

    /// Clear delay lines and filter state, keeping the topology.
    pub fn reset(&mut self) {
        for line in &mut self.delays {
            line.clear();
        }
        self.damping.reset();
    }

    /// Current delay range in ms.
    pub fn delay_ms_range(&self) -> f32 {
        self.delay_ms_range
    }

    /// Per-channel delay lengths in samples.
    pub fn delay_samples(&self) -> &[usize; N] {
        &self.delay_samples
    }

    /// Per-channel polarity flags (`true` = inverted).
    pub fn flip_polarity(&self) -> &[bool; N] {
        &self.flip_polarity
    }

    /// Largest readable offset of each channel's delay line.
    pub fn max_offset(&self) -> usize {
        self.delays.iter().map(DelayLine::max_offset).max().unwrap_or(0)
    }
}

fn check_range(ms: f32) -> Result<(), ReverbError> {
    if ms.is_finite() && ms > 0.0 {
        Ok(())
    } else {
        Err(ReverbError::InvalidDelayRange(ms))
    }
}

/// A chain of `STEPS` diffusion steps over `N` channels.
///
/// # Example
///
/// ```rust
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use reverblab_core::{Diffuser, DiffusionLayout};
///
/// let mut diffuser: Diffuser<8, 4> = Diffuser::new(80.0, DiffusionLayout::Halving);
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// diffuser.configure(48000.0, 80.0, &mut rng).unwrap();
///
/// let out = diffuser.process([1.0; 8]);
/// assert_eq!(out.len(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct Diffuser<const N: usize, const STEPS: usize> {
    steps: [DiffusionStep<N>; STEPS],
    layout: DiffusionLayout,
    diffusion_ms: f32,
}

impl<const N: usize, const STEPS: usize> Diffuser<N, STEPS> {
    /// Create an unconfigured diffuser spanning `diffusion_ms` in total.
    pub fn new(diffusion_ms: f32, layout: DiffusionLayout) -> Self {
        Self {
            steps: core::array::from_fn(|k| {
                DiffusionStep::new(layout.step_range_ms(diffusion_ms, k, STEPS))
            }),
            layout,
            diffusion_ms,
        }
    }

    /// Configure every step, drawing topology from `rng` in step order.
    ///
    /// `capacity_ms` is the largest total diffusion time the lines must
    /// accommodate without reallocating.
    pub fn configure<R: Rng + ?Sized>(
        &mut self,
        sample_rate: f32,
        capacity_ms: f32,
        rng: &mut R,
    ) -> Result<(), ReverbError> {
        check_sample_rate(sample_rate)?;
        check_range(capacity_ms)?;
        let capacity_ms = capacity_ms.max(self.diffusion_ms);
        for (k, step) in self.steps.iter_mut().enumerate() {
            let step_capacity = self.layout.step_range_ms(capacity_ms, k, STEPS);
            step.configure(sample_rate, step_capacity, rng)?;
        }
        Ok(())
    }

    /// Rescale every step to a new total diffusion time. Never allocates.
    pub fn set_diffusion_ms(&mut self, diffusion_ms: f32) -> Result<(), ReverbError> {
        check_range(diffusion_ms)?;
        self.diffusion_ms = diffusion_ms;
        for (k, step) in self.steps.iter_mut().enumerate() {
            step.set_delay_range(self.layout.step_range_ms(diffusion_ms, k, STEPS))?;
        }
        Ok(())
    }

    /// Install damping coefficients on every step.
    pub fn set_damping(&mut self, coeffs: DampingCoefficients) {
        for step in &mut self.steps {
            step.set_damping(coeffs);
        }
    }

    /// Run the input through every step in order.
    #[inline]
    pub fn process(&mut self, input: [f32; N]) -> [f32; N] {
        let mut samples = input;
        for step in &mut self.steps {
            samples = step.process(samples);
        }
        samples
    }

    /// Snap damping state of every step.
    pub fn snap_to_zero(&mut self) {
        for step in &mut self.steps {
            step.snap_to_zero();
        }
    }

    /// Clear all delay and filter state.
    pub fn reset(&mut self) {
        for step in &mut self.steps {
            step.reset();
        }
    }

    /// The steps, in processing order.
    pub fn steps(&self) -> &[DiffusionStep<N>; STEPS] {
        &self.steps
    }

    /// Total diffusion time in ms.
    pub fn diffusion_ms(&self) -> f32 {
        self.diffusion_ms
    }

    /// Range layout.
    pub fn layout(&self) -> DiffusionLayout {
        self.layout
    }
}
