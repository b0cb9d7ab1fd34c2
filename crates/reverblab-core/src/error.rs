//! Configuration errors for the reverb core.
//!
//! Only setup-time problems are reported as errors. Everything that can go
//! wrong on the audio thread is handled by clamping or by producing silence.

/// Errors reported by configuration-time operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReverbError {
    /// Sample rate was zero, negative, or not finite.
    InvalidSampleRate(f32),
    /// Room size (feedback base delay) was zero, negative, or not finite.
    InvalidRoomSize(f32),
    /// A diffusion delay range was zero, negative, or not finite.
    InvalidDelayRange(f32),
}

impl core::fmt::Display for ReverbError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidSampleRate(sr) => write!(f, "invalid sample rate: {sr} Hz"),
            Self::InvalidRoomSize(ms) => write!(f, "invalid room size: {ms} ms"),
            Self::InvalidDelayRange(ms) => write!(f, "invalid diffusion delay range: {ms} ms"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReverbError {}

/// Reject non-positive or non-finite sample rates.
pub(crate) fn check_sample_rate(sample_rate: f32) -> Result<(), ReverbError> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(ReverbError::InvalidSampleRate(sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        extern crate alloc;
        use alloc::string::ToString;

        assert_eq!(
            ReverbError::InvalidSampleRate(0.0).to_string(),
            "invalid sample rate: 0 Hz"
        );
        assert_eq!(
            ReverbError::InvalidRoomSize(-5.0).to_string(),
            "invalid room size: -5 ms"
        );
    }

    #[test]
    fn sample_rate_check() {
        assert!(check_sample_rate(48000.0).is_ok());
        assert!(check_sample_rate(0.0).is_err());
        assert!(check_sample_rate(-44100.0).is_err());
        assert!(check_sample_rate(f32::NAN).is_err());
        assert!(check_sample_rate(f32::INFINITY).is_err());
    }
}
