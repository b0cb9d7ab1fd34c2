//! One-pole parameter smoothing for click-free gain changes.
//!
//! ```text
//! y[n] = y[n-1] + coeff * (target - y[n-1])
//! coeff = 1 - exp(-1 / (tau * fs)),   tau = smoothing_time_ms / 1000
//! ```
//!
//! After five time constants the value is within 0.7% of the target.

/// A value that glides exponentially towards its target, one sample at a
/// time.
///
/// # Example
///
/// ```rust
/// use reverblab_fx::SmoothedParam;
///
/// let mut gain = SmoothedParam::with_config(1.0, 48000.0, 20.0);
/// gain.set_target(0.5);
/// for _ in 0..4800 {
///     gain.advance();
/// }
/// assert!((gain.get() - 0.5).abs() < 0.01);
/// ```
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    /// 1.0 = instant
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create an unsmoothed parameter at `initial`.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 0.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a parameter smoothing over `smoothing_time_ms` at `sample_rate`.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// Set the value to glide towards.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump straight to `value`.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update the sample rate and recompute the coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Skip the rest of the glide.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    fn recalculate_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples = self.smoothing_time_ms * 0.001 * self.sample_rate;
            self.coeff = 1.0 - (-1.0 / samples).exp();
        }
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_is_instant() {
        let mut p = SmoothedParam::new(0.0);
        p.set_target(1.0);
        assert_eq!(p.advance(), 1.0);
    }

    #[test]
    fn test_one_time_constant() {
        let mut p = SmoothedParam::with_config(0.0, 1000.0, 10.0);
        p.set_target(1.0);
        for _ in 0..10 {
            p.advance();
        }
        // 1 - e^-1
        assert!((p.get() - 0.632).abs() < 0.01, "got {}", p.get());
    }

    #[test]
    fn test_glide_is_monotonic() {
        let mut p = SmoothedParam::with_config(1.0, 48000.0, 20.0);
        p.set_target(0.0);
        let mut prev = p.get();
        for _ in 0..2000 {
            let v = p.advance();
            assert!(v <= prev && v >= 0.0);
            prev = v;
        }
    }

    #[test]
    fn test_snap_and_immediate() {
        let mut p = SmoothedParam::with_config(0.0, 48000.0, 20.0);
        p.set_target(2.0);
        p.snap_to_target();
        assert_eq!(p.get(), 2.0);

        p.set_immediate(-1.0);
        assert_eq!(p.get(), -1.0);
        assert_eq!(p.target(), -1.0);
    }

    #[test]
    fn test_sample_rate_change() {
        let mut fast = SmoothedParam::with_config(0.0, 8000.0, 20.0);
        let mut slow = fast.clone();
        slow.set_sample_rate(96000.0);
        fast.set_target(1.0);
        slow.set_target(1.0);
        // Same number of samples covers less time at the higher rate
        for _ in 0..100 {
            fast.advance();
            slow.advance();
        }
        assert!(slow.get() < fast.get());
    }
}
