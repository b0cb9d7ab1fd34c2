//! Orthogonal channel mixing matrices.
//!
//! Both transforms operate in place on a fixed-size channel vector and
//! preserve its energy (sum of squares), which keeps the gain budget of a
//! recirculating loop intact.
//!
//! | Transform | Matrix | Cost | Used by |
//! |-----------|--------|------|---------|
//! | [`hadamard_in_place`] | `H / sqrt(N)` | O(N log N) | Diffusion steps |
//! | [`householder_in_place`] | `I - (2/N) * 1 * 1ᵀ` | O(N) | Feedback network |
//!
//! # Normalization
//!
//! The Hadamard transform is scaled by `1/sqrt(N)` inside the function, so
//! it is orthogonal and its own inverse. Callers never compensate.

use libm::sqrtf;

/// Fast Walsh–Hadamard transform, normalized to be orthogonal.
///
/// `N` must be a power of two (checked at compile time).
///
/// # Example
///
/// ```rust
/// use reverblab_core::hadamard_in_place;
///
/// let mut v = [1.0, 0.0, 0.0, 0.0];
/// hadamard_in_place(&mut v);
/// assert_eq!(v, [0.5, 0.5, 0.5, 0.5]);
/// ```
#[inline]
pub fn hadamard_in_place<const N: usize>(data: &mut [f32; N]) {
    const { assert!(N.is_power_of_two(), "Hadamard size must be a power of two") };

    let mut half = 1;
    while half < N {
        let mut start = 0;
        while start < N {
            for i in start..start + half {
                let a = data[i];
                let b = data[i + half];
                data[i] = a + b;
                data[i + half] = a - b;
            }
            start += half * 2;
        }
        half *= 2;
    }

    let scale = 1.0 / sqrtf(N as f32);
    for x in data.iter_mut() {
        *x *= scale;
    }
}

/// Householder reflection across the hyperplane orthogonal to all-ones.
///
/// `v' = v - (2/N) * sum(v)`
#[inline]
pub fn householder_in_place<const N: usize>(data: &mut [f32; N]) {
    if N == 0 {
        return;
    }
    let sum: f32 = data.iter().sum();
    let offset = sum * (-2.0 / N as f32);
    for x in data.iter_mut() {
        *x += offset;
    }
}
