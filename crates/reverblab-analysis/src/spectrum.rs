//! Windowed magnitude spectra and spectral centroid.
//!
//! Used to follow how the colour of a reverb tail changes over time: with
//! damping in the feedback loop the centroid of later windows drops.

use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// No windowing
    Rectangular,
    /// Hann window (raised cosine)
    #[default]
    Hann,
}

impl Window {
    /// Apply the window to a buffer in place.
    pub fn apply(self, buffer: &mut [f32]) {
        let n = buffer.len() as f32;
        match self {
            Window::Rectangular => {}
            Window::Hann => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    *sample *= 0.5 * (1.0 - (2.0 * PI * i as f32 / n).cos());
                }
            }
        }
    }
}

/// Magnitude spectra of fixed-size frames, reusing one FFT plan.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    size: usize,
    window: Window,
    buffer: Vec<Complex<f32>>,
    frame: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// Analyzer for frames of `size` samples (at least 2).
    pub fn new(size: usize, window: Window) -> Self {
        let size = size.max(2);
        let fft = FftPlanner::new().plan_fft_forward(size);
        Self {
            fft,
            size,
            window,
            buffer: vec![Complex::new(0.0, 0.0); size],
            frame: vec![0.0; size],
        }
    }

    /// Frame size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Magnitude spectrum of the first `size` samples of `signal`, zero
    /// padded if shorter. Returns `size / 2 + 1` bins, DC to Nyquist.
    pub fn magnitude(&mut self, signal: &[f32]) -> Vec<f32> {
        let take = signal.len().min(self.size);
        self.frame[..take].copy_from_slice(&signal[..take]);
        self.frame[take..].fill(0.0);
        self.window.apply(&mut self.frame);

        for (bin, &x) in self.buffer.iter_mut().zip(&self.frame) {
            *bin = Complex::new(x, 0.0);
        }
        self.fft.process(&mut self.buffer);

        self.buffer[..=self.size / 2].iter().map(|c| c.norm()).collect()
    }

    /// Spectral centroid of consecutive frames `hop` samples apart.
    ///
    /// Only frames that fit entirely inside `signal` are analyzed.
    pub fn centroid_track(&mut self, signal: &[f32], sample_rate: f32, hop: usize) -> Vec<f32> {
        let hop = hop.max(1);
        let mut track = Vec::new();
        let mut start = 0;
        while start + self.size <= signal.len() {
            let spectrum = self.magnitude(&signal[start..start + self.size]);
            track.push(spectral_centroid(&spectrum, sample_rate));
            start += hop;
        }
        track
    }
}

/// Spectral centroid in Hz of a `size / 2 + 1` bin magnitude spectrum.
///
/// Returns 0.0 for an empty or silent spectrum.
pub fn spectral_centroid(spectrum: &[f32], sample_rate: f32) -> f32 {
    if spectrum.len() < 2 {
        return 0.0;
    }
    let fft_size = (spectrum.len() - 1) * 2;
    let bin_width = sample_rate / fft_size as f32;

    let mut weighted_sum = 0.0;
    let mut magnitude_sum = 0.0;
    for (i, &mag) in spectrum.iter().enumerate() {
        weighted_sum += i as f32 * bin_width * mag;
        magnitude_sum += mag;
    }

    if magnitude_sum > 1e-10 {
        weighted_sum / magnitude_sum
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_hann_window() {
        let mut buf = vec![1.0; 8];
        Window::Hann.apply(&mut buf);
        assert!(buf[0].abs() < 1e-7);
        assert!((buf[4] - 1.0).abs() < 1e-6);

        let mut flat = vec![1.0; 8];
        Window::Rectangular.apply(&mut flat);
        assert!(flat.iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_sine_peak_bin() {
        // 1500 Hz at 48 kHz with 1024 bins lands exactly on bin 32
        let mut analyzer = SpectrumAnalyzer::new(1024, Window::Hann);
        let spectrum = analyzer.magnitude(&sine(1500.0, 48000.0, 1024));
        assert_eq!(spectrum.len(), 513);

        let peak = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 32);
    }

    #[test]
    fn test_centroid_of_sine() {
        let mut analyzer = SpectrumAnalyzer::new(4096, Window::Hann);
        let spectrum = analyzer.magnitude(&sine(1000.0, 48000.0, 4096));
        let centroid = spectral_centroid(&spectrum, 48000.0);
        assert!((centroid - 1000.0).abs() < 50.0, "centroid {centroid}");
    }

    #[test]
    fn test_silence_and_short_input() {
        let mut analyzer = SpectrumAnalyzer::new(256, Window::Hann);
        let spectrum = analyzer.magnitude(&[]);
        assert_eq!(spectral_centroid(&spectrum, 48000.0), 0.0);
        assert_eq!(spectral_centroid(&[], 48000.0), 0.0);
    }

    #[test]
    fn test_centroid_track_frames() {
        let mut analyzer = SpectrumAnalyzer::new(256, Window::Hann);
        let signal = sine(2000.0, 16000.0, 1000);
        // Frames start at 0, 128, ..., 640
        let track = analyzer.centroid_track(&signal, 16000.0, 128);
        assert_eq!(track.len(), 6);
        assert!(track.iter().all(|&c| (c - 2000.0).abs() < 100.0));
    }
}
