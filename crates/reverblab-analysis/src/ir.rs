//! Multichannel impulse responses.

use reverblab_core::Reverberator;

use crate::decay::{Rt60Estimate, estimate_rt60_from_energy};

/// Frames between denormal flushes while rendering.
const FLUSH_INTERVAL: usize = 128;

/// A unit impulse followed by `length - 1` zeros.
pub fn impulse(length: usize) -> Vec<f32> {
    let mut signal = vec![0.0; length];
    if let Some(first) = signal.first_mut() {
        *first = 1.0;
    }
    signal
}

/// Impulse response with one buffer per channel, all the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    sample_rate: f32,
    channels: Vec<Vec<f32>>,
}

impl ImpulseResponse {
    /// Wrap already captured channels. Longer channels are truncated to the
    /// shortest one.
    pub fn new(sample_rate: f32, mut channels: Vec<Vec<f32>>) -> Self {
        let len = channels.iter().map(Vec::len).min().unwrap_or(0);
        for channel in &mut channels {
            channel.truncate(len);
        }
        Self {
            sample_rate,
            channels,
        }
    }

    /// Reset `reverb`, feed a unit impulse on every channel and capture
    /// `frames` frames of output.
    ///
    /// Returns `None` if the reverberator has not been configured.
    pub fn render<const N: usize, const STEPS: usize>(
        reverb: &mut Reverberator<N, STEPS>,
        frames: usize,
    ) -> Option<Self> {
        let sample_rate = reverb.sample_rate()?;
        reverb.reset();

        let mut channels: Vec<Vec<f32>> = (0..N).map(|_| Vec::with_capacity(frames)).collect();
        for n in 0..frames {
            let input = if n == 0 { [1.0; N] } else { [0.0; N] };
            let output = reverb.process(input);
            for (channel, &sample) in channels.iter_mut().zip(&output) {
                channel.push(sample);
            }
            if n % FLUSH_INTERVAL == FLUSH_INTERVAL - 1 {
                reverb.flush_denormals();
            }
        }

        Some(Self {
            sample_rate,
            channels,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// True if there are no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate > 0.0 {
            self.len() as f32 / self.sample_rate
        } else {
            0.0
        }
    }

    /// One channel's samples.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Per-frame energy summed over channels.
    pub fn energy(&self) -> Vec<f64> {
        let mut energy = vec![0.0f64; self.len()];
        for channel in &self.channels {
            for (e, &x) in energy.iter_mut().zip(channel) {
                *e += f64::from(x) * f64::from(x);
            }
        }
        energy
    }

    /// Largest absolute sample over all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flatten()
            .fold(0.0f32, |peak, &x| peak.max(x.abs()))
    }

    /// Decay times of the combined energy of all channels.
    pub fn estimate_rt60(&self) -> Option<Rt60Estimate> {
        estimate_rt60_from_energy(&self.energy(), self.sample_rate)
    }
}
