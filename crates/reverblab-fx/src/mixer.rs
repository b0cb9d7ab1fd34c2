//! Stereo ↔ N-channel conversion around the reverberator.
//!
//! Left feeds the even channels and right the odd channels, each scaled by
//! `sqrt(2/N)`. Collapsing sums each parity group with the same scale, so
//! the pair preserves energy and `collapse(expand(x)) == x`.

use std::f32::consts::SQRT_2;

/// Up/down mixer between a stereo frame and `N` internal channels.
///
/// `N` must be even.
///
/// # Example
///
/// ```rust
/// use reverblab_fx::StereoMultiMixer;
///
/// let mixer = StereoMultiMixer::<8>::new();
/// let multi = mixer.expand([0.5, -0.3]);
/// let [l, r] = mixer.collapse(&multi);
/// assert!((l - 0.5).abs() < 1e-6 && (r + 0.3).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StereoMultiMixer<const N: usize> {
    scale: f32,
}

impl<const N: usize> StereoMultiMixer<N> {
    /// Create a mixer for `N` channels.
    pub fn new() -> Self {
        const { assert!(N >= 2 && N % 2 == 0, "channel count must be even") };
        Self {
            scale: SQRT_2 / (N as f32).sqrt(),
        }
    }

    /// Spread a stereo frame over `N` channels.
    #[inline]
    pub fn expand(&self, [left, right]: [f32; 2]) -> [f32; N] {
        let l = left * self.scale;
        let r = right * self.scale;
        core::array::from_fn(|c| if c % 2 == 0 { l } else { r })
    }

    /// Fold `N` channels back to a stereo frame.
    #[inline]
    pub fn collapse(&self, multi: &[f32; N]) -> [f32; 2] {
        let mut left = 0.0;
        let mut right = 0.0;
        for pair in multi.chunks_exact(2) {
            left += pair[0];
            right += pair[1];
        }
        [left * self.scale, right * self.scale]
    }

    /// Per-channel scale factor, `sqrt(2/N)`.
    pub fn scale(&self) -> f32 {
        self.scale
    }
}

impl<const N: usize> Default for StereoMultiMixer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mixer = StereoMultiMixer::<8>::new();
        let [l, r] = mixer.collapse(&mixer.expand([0.5, -0.3]));
        assert!((l - 0.5).abs() < 1e-6);
        assert!((r + 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_expand_layout_and_energy() {
        let mixer = StereoMultiMixer::<4>::new();
        let multi = mixer.expand([1.0, 0.0]);
        let s = (0.5f32).sqrt();
        assert_eq!(multi, [s, 0.0, s, 0.0]);

        let energy: f32 = multi.iter().map(|x| x * x).sum();
        assert!((energy - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_two_channels_is_identity() {
        let mixer = StereoMultiMixer::<2>::new();
        assert!((mixer.scale() - 1.0).abs() < 1e-7);
        let multi = mixer.expand([0.25, 0.75]);
        assert!((multi[0] - 0.25).abs() < 1e-7 && (multi[1] - 0.75).abs() < 1e-7);
    }

    #[test]
    fn test_collapse_cancels_opposite_polarity() {
        let mixer = StereoMultiMixer::<8>::new();
        let multi = [1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0, 0.0];
        assert_eq!(mixer.collapse(&multi), [0.0, 0.0]);
    }
}
