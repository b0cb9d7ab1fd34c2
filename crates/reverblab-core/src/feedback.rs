//! Multichannel mixed feedback network (the long reverb tail).
//!
//! `N` delay lines recirculate through a Householder reflection and a
//! scalar decay gain:
//!
//! ```text
//!             ┌────────────────────────────────────────────────┐
//!             v                                                │
//! in ──> (+) ──> delay[c] ──┬──> Householder ──> [damping] ──> × g
//!                           │
//!                           └──> out (pre-mix delayed values)
//! ```
//!
//! # Delay lengths
//!
//! Channel `c` delays by `base * 2^(c/N)` samples: exponentially spread
//! across one octave so echoes from different channels never phase-align.
//!
//! # Decay gain
//!
//! The gain applied per loop is derived from the target RT60:
//!
//! ```text
//! loops_per_rt60 = rt60 / (1.5 * room_ms / 1000)
//! db_per_cycle   = reference_db / loops_per_rt60
//! decay_gain     = 10^(db_per_cycle / 20)
//! ```
//!
//! and clamped to `[MIN_DECAY_GAIN, MAX_DECAY_GAIN]`, strictly inside
//! (0, 1), which keeps the loop stable for any input.

use crate::damping::{DampingCoefficients, DampingFilter};
use crate::delay::DelayLine;
use crate::error::{ReverbError, check_sample_rate};
use crate::math::{db_to_linear, ms_to_samples};
use crate::mix::householder_in_place;
use libm::{ceilf, exp2f};

/// Ratio of the assumed average loop length to the base delay.
pub const LOOP_LENGTH_FACTOR: f32 = 1.5;

/// Smallest decay gain ever applied (fastest possible decay).
pub const MIN_DECAY_GAIN: f32 = 1e-6;

/// Largest decay gain ever applied (effectively infinite sustain).
pub const MAX_DECAY_GAIN: f32 = 0.9999;

/// Loudness floor that the decay time is measured against.
///
/// `Minus60Db` makes the decay time a true RT60. `Minus45Db` reaches the
/// same floor 4/3 times later; which one a preset uses is a voicing choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecayReference {
    /// The decay time is the time to fall by 60 dB.
    #[default]
    Minus60Db,
    /// The decay time is the time to fall by 45 dB.
    Minus45Db,
}

impl DecayReference {
    /// Reference level in dB (negative).
    pub fn db(self) -> f32 {
        match self {
            Self::Minus60Db => -60.0,
            Self::Minus45Db => -45.0,
        }
    }
}

/// Number of trips around the average loop within one decay period.
pub fn loops_per_rt60(rt60_secs: f32, room_ms: f32) -> f32 {
    let typical_loop_secs = room_ms * LOOP_LENGTH_FACTOR * 0.001;
    rt60_secs / typical_loop_secs
}

/// Per-loop gain that makes the tail fall by `reference` in `rt60_secs`.
///
/// Degenerate inputs (zero, negative or NaN decay time or room size) give
/// [`MIN_DECAY_GAIN`]; the result always lies strictly inside (0, 1).
///
/// # Example
///
/// ```rust
/// use reverblab_core::{DecayReference, decay_gain};
///
/// // 2 s decay, 80 ms room: 16.7 loops, -3.6 dB per loop
/// let g = decay_gain(2.0, 80.0, DecayReference::Minus60Db);
/// assert!((g - 0.6607).abs() < 1e-3);
/// ```
pub fn decay_gain(rt60_secs: f32, room_ms: f32, reference: DecayReference) -> f32 {
    if room_ms.is_nan() || room_ms <= 0.0 {
        return MIN_DECAY_GAIN;
    }
    let loops = loops_per_rt60(rt60_secs, room_ms);
    if loops.is_nan() || loops <= 0.0 {
        return MIN_DECAY_GAIN;
    }
    let db_per_cycle = reference.db() / loops;
    let gain = db_to_linear(db_per_cycle);
    if gain.is_nan() {
        return MIN_DECAY_GAIN;
    }
    gain.clamp(MIN_DECAY_GAIN, MAX_DECAY_GAIN)
}

/// `N` recirculating delay lines mixed by a Householder reflection.
#[derive(Debug, Clone)]
pub struct FeedbackNetwork<const N: usize> {
    delay_ms: f32,
    sample_rate: f32,
    decay_gain: f32,
    delay_samples: [usize; N],
    delays: [DelayLine; N],
    damping: DampingFilter<N>,
}

impl<const N: usize> FeedbackNetwork<N> {
    /// Create an unconfigured network with base delay `delay_ms`.
    pub fn new(delay_ms: f32) -> Self {
        Self {
            delay_ms,
            sample_rate: 0.0,
            decay_gain: MIN_DECAY_GAIN,
            delay_samples: [1; N],
            delays: core::array::from_fn(|_| DelayLine::default()),
            damping: DampingFilter::new(),
        }
    }

    /// Size the delay lines for base delays up to `capacity_ms`.
    pub fn configure(&mut self, sample_rate: f32, capacity_ms: f32) -> Result<(), ReverbError> {
        check_sample_rate(sample_rate)?;
        check_delay(self.delay_ms)?;
        check_delay(capacity_ms)?;

        self.sample_rate = sample_rate;
        let capacity_ms = capacity_ms.max(self.delay_ms);
        let longest = ms_to_samples(capacity_ms, sample_rate) * channel_spread(N.saturating_sub(1), N);
        let max_offset = (ceilf(longest) as usize).max(1);
        for line in &mut self.delays {
            line.resize(max_offset);
        }
        self.damping.reset();
        self.update_delay_samples();
        Ok(())
    }

    /// Change the base delay. Never allocates; lengths past the sized
    /// capacity are clamped.
    pub fn set_delay_ms(&mut self, delay_ms: f32) -> Result<(), ReverbError> {
        check_delay(delay_ms)?;
        self.delay_ms = delay_ms;
        if self.sample_rate > 0.0 {
            self.update_delay_samples();
        }
        Ok(())
    }

    fn update_delay_samples(&mut self) {
        let base = ms_to_samples(self.delay_ms, self.sample_rate);
        for c in 0..N {
            let length = (base * channel_spread(c, N)) as usize;
            let max_offset = self.delays[c].max_offset().max(1);
            self.delay_samples[c] = length.clamp(1, max_offset);
        }
    }

    /// Derive the decay gain for `rt60_secs` from the current base delay.
    pub fn set_decay_time(&mut self, rt60_secs: f32, reference: DecayReference) {
        self.decay_gain = decay_gain(rt60_secs, self.delay_ms, reference);
    }

    /// Install damping coefficients in the loop (clears filter state).
    pub fn set_damping(&mut self, coeffs: DampingCoefficients) {
        self.damping.set_coefficients(coeffs);
    }

    /// Process one channel vector; returns the delayed (pre-mix) values.
    #[inline]
    pub fn process(&mut self, input: [f32; N]) -> [f32; N] {
        let mut delayed = [0.0; N];
        for c in 0..N {
            delayed[c] = self.delays[c].read(self.delay_samples[c]);
        }

        let mut mixed = delayed;
        householder_in_place(&mut mixed);
        self.damping.process(&mut mixed);

        for c in 0..N {
            self.delays[c].write(input[c] + mixed[c] * self.decay_gain);
        }
        delayed
    }

    /// Snap damping state below the denormal threshold to zero.
    pub fn snap_to_zero(&mut self) {
        self.damping.snap_to_zero();
    }

    /// Clear delay lines and filter state.
    pub fn reset(&mut self) {
        for line in &mut self.delays {
            line.clear();
        }
        self.damping.reset();
    }

    /// Current per-loop decay gain.
    pub fn decay_gain(&self) -> f32 {
        self.decay_gain
    }

    /// Base delay in ms.
    pub fn delay_ms(&self) -> f32 {
        self.delay_ms
    }

    /// Per-channel delay lengths in samples.
    pub fn delay_samples(&self) -> &[usize; N] {
        &self.delay_samples
    }

    /// Damping coefficients installed in the loop.
    pub fn damping_coefficients(&self) -> DampingCoefficients {
        self.damping.coefficients()
    }

    /// Per-channel damping filter memory.
    pub fn damping_state(&self) -> &[f32; N] {
        self.damping.state()
    }

    /// Longest delay line length in samples.
    pub fn longest_delay(&self) -> usize {
        self.delay_samples.iter().copied().max().unwrap_or(0)
    }
}

/// `2^(c/N)`: the per-channel length multiplier.
#[inline]
fn channel_spread(channel: usize, channels: usize) -> f32 {
    exp2f(channel as f32 / channels.max(1) as f32)
}

fn check_delay(ms: f32) -> Result<(), ReverbError> {
    if ms.is_finite() && ms > 0.0 {
        Ok(())
    } else {
        Err(ReverbError::InvalidRoomSize(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damping::DampingSettings;

    #[test]
    fn test_decay_gain_known_value() {
        // 0.5 s decay, 80 ms room -> 4.1667 loops -> -14.4 dB per loop
        let g = decay_gain(0.5, 80.0, DecayReference::Minus60Db);
        assert!((g - db_to_linear(-14.4)).abs() < 1e-4, "got {g}");
    }

    #[test]
    fn test_reference_level_scales_gain() {
        let g60 = decay_gain(2.0, 80.0, DecayReference::Minus60Db);
        let g45 = decay_gain(2.0, 80.0, DecayReference::Minus45Db);
        assert!(g45 > g60, "-45 dB reference decays more slowly");
        // Per-loop dB scales by 45/60
        let ratio = libm::log10f(g45) / libm::log10f(g60);
        assert!((ratio - 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_decay_gain_clamps_degenerate_inputs() {
        for rt in [0.0, -1.0, 1e-9, f32::NAN] {
            let g = decay_gain(rt, 80.0, DecayReference::Minus60Db);
            assert!(g > 0.0 && g < 1.0, "rt60 {rt} gave {g}");
        }
        let g = decay_gain(f32::INFINITY, 80.0, DecayReference::Minus60Db);
        assert_eq!(g, MAX_DECAY_GAIN);
        let g = decay_gain(2.0, 0.0, DecayReference::Minus60Db);
        assert_eq!(g, MIN_DECAY_GAIN);
    }

    #[test]
    fn test_exponential_delay_spacing() {
        let mut fb: FeedbackNetwork<8> = FeedbackNetwork::new(100.0);
        fb.configure(48000.0, 100.0).unwrap();
        let base = 4800.0f32;
        for (c, &len) in fb.delay_samples().iter().enumerate() {
            let expected = (base * libm::exp2f(c as f32 / 8.0)) as usize;
            assert_eq!(len, expected);
        }
        assert_eq!(fb.delay_samples()[0], 4800);
        assert!(fb.longest_delay() < 9600);
    }

    #[test]
    fn test_loop_is_stable_at_max_gain() {
        let mut fb: FeedbackNetwork<8> = FeedbackNetwork::new(1.0);
        fb.configure(48000.0, 1.0).unwrap();
        fb.set_decay_time(f32::INFINITY, DecayReference::Minus60Db);
        assert_eq!(fb.decay_gain(), MAX_DECAY_GAIN);

        let mut input = [0.0; 8];
        input[3] = 1.0;
        let mut peak = 0.0f32;
        let mut out = fb.process(input);
        for _ in 0..48000 {
            peak = out.iter().fold(peak, |m, x| m.max(x.abs()));
            out = fb.process([0.0; 8]);
        }
        assert!(peak <= 1.0 + 1e-4, "loop gained energy: {peak}");
    }

    #[test]
    fn test_output_is_pre_mix_delay() {
        let mut fb: FeedbackNetwork<4> = FeedbackNetwork::new(1.0);
        fb.configure(4000.0, 1.0).unwrap();
        // 4 samples base: lengths 4, 4, 5, 6
        assert_eq!(fb.delay_samples(), &[4, 4, 5, 6]);

        fb.process([1.0, 0.0, 0.0, 0.0]);
        let mut first_arrival = None;
        for n in 1..10 {
            let out = fb.process([0.0; 4]);
            if out[0] != 0.0 {
                first_arrival = Some((n, out));
                break;
            }
        }
        let (n, out) = first_arrival.expect("impulse should come back");
        // Written at t=0, read with offset 4 at t=5
        assert_eq!(n, 5);
        assert_eq!(out, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_damping_in_loop_darkens_tail() {
        fn tail_energy(fb: &mut FeedbackNetwork<8>) -> f32 {
            let mut input = [0.0; 8];
            for (c, x) in input.iter_mut().enumerate() {
                *x = if c % 2 == 0 { 1.0 } else { -1.0 };
            }
            fb.process(input);
            let mut e = 0.0;
            for _ in 0..24000 {
                e += fb.process([0.0; 8]).iter().map(|x| x * x).sum::<f32>();
            }
            e
        }

        let mut bright: FeedbackNetwork<8> = FeedbackNetwork::new(20.0);
        bright.configure(48000.0, 20.0).unwrap();
        bright.set_decay_time(2.0, DecayReference::Minus60Db);

        let mut dark = bright.clone();
        dark.set_damping(DampingCoefficients::design(DampingSettings::lowpass(1000.0), 48000.0));

        assert!(tail_energy(&mut dark) < tail_energy(&mut bright));
    }

    #[test]
    fn test_retune_and_invalid_delay() {
        let mut fb: FeedbackNetwork<8> = FeedbackNetwork::new(50.0);
        assert!(fb.configure(48000.0, 100.0).is_ok());
        fb.set_delay_ms(100.0).unwrap();
        assert_eq!(fb.delay_samples()[0], 4800);
        assert!(fb.set_delay_ms(0.0).is_err());
        assert!(fb.set_delay_ms(f32::NAN).is_err());
        assert_eq!(fb.delay_ms(), 100.0);

        let mut bad: FeedbackNetwork<8> = FeedbackNetwork::new(-5.0);
        assert_eq!(
            bad.configure(48000.0, 100.0),
            Err(ReverbError::InvalidRoomSize(-5.0))
        );
    }
}
