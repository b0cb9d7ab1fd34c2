//! First-order damping filter for high-frequency decay control.
//!
//! A topology-preserving-transform (TPT) one-pole, run either as a plain
//! lowpass or as a high shelf:
//!
//! ```text
//! g  = tan(π * fc / fs),  G = g / (1 + g)
//! v  = (x - s) * G
//! lp = v + s
//! s' = lp + v
//!
//! lowpass: y = lp
//! shelf:   y = lp + k * (x - lp),   k = 10^(-attenuation_db / 20)
//! ```
//!
//! # Policy
//!
//! Whether the filter runs at all is decided once per parameter change by
//! [`DampingCoefficients::design`], not per sample:
//!
//! | Condition | Mode |
//! |-----------|------|
//! | cutoff ≥ 19.5 kHz or ≥ 0.49 · fs | [`DampingMode::Disabled`] |
//! | shelf with 0 dB attenuation | [`DampingMode::Disabled`] |
//! | no attenuation given | [`DampingMode::Lowpass`] |
//! | attenuation > 0 dB | [`DampingMode::Shelf`] |
//!
//! Both modes have a magnitude response ≤ 1 everywhere, so the filter can
//! sit inside a feedback loop without adding gain.

use crate::math::{db_to_linear, flush_denormal};
use libm::tanf;

/// Audible bandwidth used as the reference for the bypass threshold.
pub const REFERENCE_BANDWIDTH_HZ: f32 = 20_000.0;

/// Fraction of [`REFERENCE_BANDWIDTH_HZ`] above which damping is bypassed.
pub const BYPASS_RATIO: f32 = 0.975;

/// Highest cutoff, as a fraction of the sample rate, the filter will run at.
pub const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Lowest accepted cutoff in Hz.
pub const MIN_CUTOFF_HZ: f32 = 20.0;

/// Largest accepted shelf attenuation in dB.
pub const MAX_ATTENUATION_DB: f32 = 60.0;

/// Which filter, if any, the damping stage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DampingMode {
    /// Filter bypassed; zero per-sample cost.
    #[default]
    Disabled,
    /// High shelf: frequencies above the cutoff are cut by a fixed amount.
    Shelf,
    /// One-pole lowpass: 6 dB/oct rolloff above the cutoff.
    Lowpass,
}

/// User-facing damping request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampingSettings {
    /// Cutoff (lowpass) or corner (shelf) frequency in Hz.
    pub cutoff_hz: f32,
    /// Shelf attenuation in dB of cut. `None` selects the lowpass.
    pub attenuation_db: Option<f32>,
}

impl DampingSettings {
    /// Settings that always resolve to [`DampingMode::Disabled`].
    pub const OFF: Self = Self {
        cutoff_hz: REFERENCE_BANDWIDTH_HZ,
        attenuation_db: None,
    };

    /// Lowpass damping at `cutoff_hz`.
    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            cutoff_hz,
            attenuation_db: None,
        }
    }

    /// High-shelf damping at `cutoff_hz`, cutting by `attenuation_db`.
    pub fn shelf(cutoff_hz: f32, attenuation_db: f32) -> Self {
        Self {
            cutoff_hz,
            attenuation_db: Some(attenuation_db),
        }
    }
}

impl Default for DampingSettings {
    fn default() -> Self {
        Self::OFF
    }
}

/// Resolved filter coefficients, shared by every filter bank of a reverb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampingCoefficients {
    mode: DampingMode,
    /// TPT integrator gain `g / (1 + g)`.
    gain: f32,
    /// Linear shelf gain applied above the corner.
    shelf_gain: f32,
}

impl DampingCoefficients {
    /// Coefficients for a bypassed filter.
    pub const BYPASS: Self = Self {
        mode: DampingMode::Disabled,
        gain: 1.0,
        shelf_gain: 1.0,
    };

    /// Resolve `settings` at `sample_rate` into a mode and coefficients.
    pub fn design(settings: DampingSettings, sample_rate: f32) -> Self {
        let cutoff = if settings.cutoff_hz.is_finite() {
            settings.cutoff_hz.max(MIN_CUTOFF_HZ)
        } else {
            REFERENCE_BANDWIDTH_HZ
        };

        if cutoff >= REFERENCE_BANDWIDTH_HZ * BYPASS_RATIO
            || cutoff >= sample_rate * MAX_CUTOFF_RATIO
        {
            return Self::BYPASS;
        }

        let (mode, shelf_gain) = match settings.attenuation_db {
            None => (DampingMode::Lowpass, 0.0),
            Some(db) => {
                let db = if db.is_finite() {
                    db.clamp(0.0, MAX_ATTENUATION_DB)
                } else {
                    0.0
                };
                if db <= 0.0 {
                    return Self::BYPASS;
                }
                (DampingMode::Shelf, db_to_linear(-db))
            }
        };

        let g = tanf(core::f32::consts::PI * cutoff / sample_rate);
        Self {
            mode,
            gain: g / (1.0 + g),
            shelf_gain,
        }
    }

    /// The resolved mode.
    pub fn mode(&self) -> DampingMode {
        self.mode
    }

    /// True when the filter does any work.
    pub fn is_active(&self) -> bool {
        self.mode != DampingMode::Disabled
    }
}

impl Default for DampingCoefficients {
    fn default() -> Self {
        Self::BYPASS
    }
}

/// A bank of `N` independent first-order damping filters.
///
/// All channels share one set of coefficients; each keeps its own state.
///
/// # Invariants
///
/// - State is reset whenever coefficients change, so stale state never meets
///   new coefficients.
/// - While [`DampingMode::Disabled`], `process` is an identity and touches
///   no state.
#[derive(Debug, Clone)]
pub struct DampingFilter<const N: usize> {
    coeffs: DampingCoefficients,
    state: [f32; N],
}

impl<const N: usize> DampingFilter<N> {
    /// Create a bypassed filter bank.
    pub fn new() -> Self {
        Self {
            coeffs: DampingCoefficients::BYPASS,
            state: [0.0; N],
        }
    }

    /// Install new coefficients and clear state.
    pub fn set_coefficients(&mut self, coeffs: DampingCoefficients) {
        self.coeffs = coeffs;
        self.reset();
    }

    /// Currently installed coefficients.
    pub fn coefficients(&self) -> DampingCoefficients {
        self.coeffs
    }

    /// Filter one sample on `channel`.
    #[inline]
    pub fn process_channel(&mut self, channel: usize, input: f32) -> f32 {
        let s = &mut self.state[channel];
        match self.coeffs.mode {
            DampingMode::Disabled => input,
            DampingMode::Lowpass => {
                let v = (input - *s) * self.coeffs.gain;
                let lp = v + *s;
                *s = lp + v;
                lp
            }
            DampingMode::Shelf => {
                let v = (input - *s) * self.coeffs.gain;
                let lp = v + *s;
                *s = lp + v;
                lp + self.coeffs.shelf_gain * (input - lp)
            }
        }
    }

    /// Filter a whole channel vector in place.
    #[inline]
    pub fn process(&mut self, data: &mut [f32; N]) {
        if !self.coeffs.is_active() {
            return;
        }
        for (c, x) in data.iter_mut().enumerate() {
            *x = self.process_channel(c, *x);
        }
    }

    /// Force state below the denormal threshold to exact zero.
    pub fn snap_to_zero(&mut self) {
        for s in &mut self.state {
            *s = flush_denormal(*s);
        }
    }

    /// Clear all filter state.
    pub fn reset(&mut self) {
        self.state = [0.0; N];
    }

    /// Per-channel filter state (integrator memory).
    pub fn state(&self) -> &[f32; N] {
        &self.state
    }
}

impl<const N: usize> Default for DampingFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn nyquist_level(filter: &mut DampingFilter<1>) -> f32 {
        let mut sum = 0.0f32;
        for i in 0..4800 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            let y = filter.process_channel(0, x);
            if i >= 2400 {
                sum += y.abs();
            }
        }
        sum / 2400.0
    }

    #[test]
    fn policy_bypasses_near_nyquist() {
        let c = DampingCoefficients::design(DampingSettings::lowpass(19_600.0), SR);
        assert_eq!(c.mode(), DampingMode::Disabled);

        // 0.49 * 44.1 kHz = 21.6 kHz, so 15 kHz runs
        let c = DampingCoefficients::design(DampingSettings::lowpass(15_000.0), 44_100.0);
        assert_eq!(c.mode(), DampingMode::Lowpass);

        // At 16 kHz sample rate a 10 kHz cutoff is past 0.49 * fs
        let c = DampingCoefficients::design(DampingSettings::lowpass(10_000.0), 16_000.0);
        assert_eq!(c.mode(), DampingMode::Disabled);
    }

    #[test]
    fn policy_selects_shelf_or_lowpass() {
        let lp = DampingCoefficients::design(DampingSettings::lowpass(4000.0), SR);
        assert_eq!(lp.mode(), DampingMode::Lowpass);

        let shelf = DampingCoefficients::design(DampingSettings::shelf(4000.0, 6.0), SR);
        assert_eq!(shelf.mode(), DampingMode::Shelf);

        let flat = DampingCoefficients::design(DampingSettings::shelf(4000.0, 0.0), SR);
        assert_eq!(flat.mode(), DampingMode::Disabled);

        // Boosts are not allowed inside a feedback loop
        let boost = DampingCoefficients::design(DampingSettings::shelf(4000.0, -12.0), SR);
        assert_eq!(boost.mode(), DampingMode::Disabled);
    }

    #[test]
    fn degenerate_cutoffs_are_clamped() {
        let zero = DampingCoefficients::design(DampingSettings::lowpass(0.0), SR);
        assert_eq!(zero.mode(), DampingMode::Lowpass);
        assert!(zero.gain > 0.0 && zero.gain.is_finite());

        let nan = DampingCoefficients::design(DampingSettings::lowpass(f32::NAN), SR);
        assert_eq!(nan.mode(), DampingMode::Disabled);
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut f = DampingFilter::<1>::new();
        f.set_coefficients(DampingCoefficients::design(
            DampingSettings::lowpass(1000.0),
            SR,
        ));
        let mut out = 0.0;
        for _ in 0..48000 {
            out = f.process_channel(0, 1.0);
        }
        assert!((out - 1.0).abs() < 1e-4, "DC should pass, got {out}");
    }

    #[test]
    fn lowpass_attenuates_nyquist() {
        let mut f = DampingFilter::<1>::new();
        f.set_coefficients(DampingCoefficients::design(
            DampingSettings::lowpass(500.0),
            SR,
        ));
        let level = nyquist_level(&mut f);
        assert!(level < 0.01, "Nyquist should be removed, got {level}");
    }

    #[test]
    fn shelf_settles_at_attenuation() {
        let mut f = DampingFilter::<1>::new();
        f.set_coefficients(DampingCoefficients::design(
            DampingSettings::shelf(500.0, 12.0),
            SR,
        ));
        let level = nyquist_level(&mut f);
        let expected = db_to_linear(-12.0);
        assert!(
            (level - expected).abs() < 0.02,
            "Shelf should settle near {expected}, got {level}"
        );
    }

    #[test]
    fn disabled_is_identity() {
        let mut f = DampingFilter::<4>::new();
        let mut v = [0.1, -0.2, 0.3, -0.4];
        f.process(&mut v);
        assert_eq!(v, [0.1, -0.2, 0.3, -0.4]);
        assert_eq!(f.state(), &[0.0; 4]);
    }

    #[test]
    fn coefficient_change_resets_state() {
        let mut f = DampingFilter::<2>::new();
        f.set_coefficients(DampingCoefficients::design(
            DampingSettings::lowpass(2000.0),
            SR,
        ));
        let mut v = [1.0, -1.0];
        f.process(&mut v);
        assert!(f.state().iter().any(|s| *s != 0.0));

        f.set_coefficients(DampingCoefficients::design(
            DampingSettings::lowpass(3000.0),
            SR,
        ));
        assert_eq!(f.state(), &[0.0, 0.0]);
    }

    #[test]
    fn snap_to_zero_only_touches_tiny_state() {
        let mut f = DampingFilter::<2>::new();
        f.state = [1e-25, 0.5];
        f.snap_to_zero();
        assert_eq!(f.state(), &[0.0, 0.5]);
    }
}
