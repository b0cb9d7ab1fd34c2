//! Small numeric helpers shared by the reverb building blocks.
//!
//! All functions are allocation-free and `no_std` friendly (they go through
//! `libm` rather than the `f32` inherent methods).
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Level conversions
//! - [`flush_denormal`] - Snap-to-zero for recursive filter state
//! - [`ms_to_samples`] - Millisecond to sample conversion

use libm::{expf, logf};

/// Magnitude below which recursive state is considered silent.
///
/// Well above the f32 subnormal range, so anything that would eventually
/// decay into subnormals is caught early.
pub const DENORMAL_THRESHOLD: f32 = 1e-20;

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use reverblab_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Inputs at or below zero are floored at -200 dB.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Flush values in the denormal danger zone to exact zero.
///
/// Applied to filter state during long silent tails, where repeated
/// multiplication by a coefficient below one walks the value down into
/// subnormals that are very slow on x86.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < DENORMAL_THRESHOLD { 0.0 } else { x }
}

/// Convert a time in milliseconds to a (fractional) number of samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * 0.001 * sample_rate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_roundtrip() {
        for db in [-60.0, -24.0, -6.0, 0.0, 6.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 1e-3, "{db} dB came back as {back}");
        }
    }

    #[test]
    fn test_linear_to_db_floor() {
        assert!(linear_to_db(0.0) <= -199.0);
        assert!(linear_to_db(-1.0) <= -199.0);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1.0), 1.0);
        assert_eq!(flush_denormal(-0.5), -0.5);
        assert_eq!(flush_denormal(1e-10), 1e-10);

        assert_eq!(flush_denormal(1e-21), 0.0);
        assert_eq!(flush_denormal(-1e-21), 0.0);
        assert_eq!(flush_denormal(1e-38), 0.0);
        assert_eq!(flush_denormal(0.0), 0.0);
    }

    #[test]
    fn test_ms_to_samples() {
        assert_eq!(ms_to_samples(1000.0, 48000.0), 48000.0);
        assert!((ms_to_samples(80.0, 44100.0) - 3528.0).abs() < 1e-3);
    }
}
