//! Schroeder energy decay curves and decay-time estimation.
//!
//! The energy decay curve (EDC) is the backward integral of the squared
//! impulse response, normalized to 0 dB at the start:
//!
//! ```text
//! EDC(t) = 10 log10( ∫[t,∞) h²(τ) dτ / ∫[0,∞) h²(τ) dτ )
//! ```
//!
//! Decay times fit a straight line to the EDC between two levels and
//! extrapolate it to 60 dB (ISO 3382 style): EDT uses 0..-10 dB, T20 uses
//! -5..-25 dB and T30 uses -5..-35 dB.
//!
//! Integration runs in `f64`; a tail of several seconds at 48 kHz loses the
//! late part of the curve in `f32`.

/// Floor applied to the normalized energy before the logarithm (-300 dB).
const EDC_FLOOR: f64 = 1e-30;

/// T30 is only trusted when it agrees with T20 within this ratio.
const T30_AGREEMENT: f64 = 0.3;

/// Decay-time estimates from one impulse response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rt60Estimate {
    /// Best estimate: T30 when available and consistent with T20, T20
    /// otherwise.
    pub rt60_seconds: f32,
    /// Early decay time (0 to -10 dB, extrapolated).
    pub edt_seconds: f32,
    /// -5 to -25 dB, extrapolated.
    pub t20_seconds: f32,
    /// -5 to -35 dB, extrapolated. `None` when the curve never gets there.
    pub t30_seconds: Option<f32>,
    /// Linearity of the EDC over the T20 range, `|r|` in `[0, 1]`.
    pub correlation: f32,
}

/// Energy decay curve of a single channel, in dB.
///
/// Empty input gives an empty curve; silence gives the -300 dB floor
/// throughout.
pub fn energy_decay_curve(ir: &[f32]) -> Vec<f32> {
    let energy: Vec<f64> = ir.iter().map(|&x| f64::from(x) * f64::from(x)).collect();
    edc_db(&energy).into_iter().map(|db| db as f32).collect()
}

/// Estimate decay times from a single channel.
pub fn estimate_rt60(ir: &[f32], sample_rate: f32) -> Option<Rt60Estimate> {
    let energy: Vec<f64> = ir.iter().map(|&x| f64::from(x) * f64::from(x)).collect();
    estimate_rt60_from_energy(&energy, sample_rate)
}

/// Estimate decay times from per-sample energy, e.g. summed over the
/// channels of a multichannel response.
///
/// Returns `None` for a non-positive or non-finite sample rate, or when
/// the curve never decays by 25 dB.
pub fn estimate_rt60_from_energy(energy: &[f64], sample_rate: f32) -> Option<Rt60Estimate> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return None;
    }
    let edc = edc_db(energy);
    let rate = f64::from(sample_rate);

    let t20_fit = fit_range(&edc, -5.0, -25.0)?;
    let t20 = t20_fit.decay_time(rate)?;
    let edt = fit_range(&edc, 0.0, -10.0)
        .and_then(|fit| fit.decay_time(rate))
        .unwrap_or(0.0);
    let t30 = fit_range(&edc, -5.0, -35.0).and_then(|fit| fit.decay_time(rate));

    let rt60 = match t30 {
        Some(t30) if ((t30 - t20) / t20).abs() < T30_AGREEMENT => t30,
        _ => t20,
    };

    Some(Rt60Estimate {
        rt60_seconds: rt60 as f32,
        edt_seconds: edt as f32,
        t20_seconds: t20 as f32,
        t30_seconds: t30.map(|t| t as f32),
        correlation: t20_fit.correlation as f32,
    })
}

/// Backward-integrated energy in dB relative to the total.
pub(crate) fn edc_db(energy: &[f64]) -> Vec<f64> {
    let mut edc = vec![0.0; energy.len()];
    let mut acc = 0.0;
    for (slot, &e) in edc.iter_mut().zip(energy).rev() {
        acc += e;
        *slot = acc;
    }
    let Some(&total) = edc.first() else {
        return edc;
    };
    let total = total.max(f64::MIN_POSITIVE);
    for value in &mut edc {
        *value = 10.0 * (*value / total).max(EDC_FLOOR).log10();
    }
    edc
}

/// Least-squares line through a stretch of the EDC.
#[derive(Debug, Clone, Copy)]
struct LineFit {
    /// dB per sample.
    slope: f64,
    correlation: f64,
}

impl LineFit {
    /// Time to fall 60 dB at this slope.
    fn decay_time(self, sample_rate: f64) -> Option<f64> {
        (self.slope < 0.0).then(|| -60.0 / self.slope / sample_rate)
    }
}

/// Fit the EDC between the first samples at or below `start_db` and
/// `end_db`.
fn fit_range(edc: &[f64], start_db: f64, end_db: f64) -> Option<LineFit> {
    let start = edc.iter().position(|&e| e <= start_db)?;
    let end = edc.iter().position(|&e| e <= end_db)?;
    if end <= start {
        return None;
    }

    let n = (end - start + 1) as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx, mut sum_yy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (i, &y) in edc[start..=end].iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
        sum_yy += y * y;
    }

    let sxy = n * sum_xy - sum_x * sum_y;
    let sxx = n * sum_xx - sum_x * sum_x;
    let syy = n * sum_yy - sum_y * sum_y;
    if sxx <= 0.0 {
        return None;
    }
    let denominator = (sxx * syy).sqrt();
    Some(LineFit {
        slope: sxy / sxx,
        correlation: if denominator > 0.0 {
            (sxy / denominator).abs()
        } else {
            0.0
        },
    })
}
