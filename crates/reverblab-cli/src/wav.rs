//! WAV file reading and writing.

use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;
use thiserror::Error;

/// Errors from WAV I/O.
#[derive(Debug, Error)]
pub enum WavError {
    /// Error from the WAV codec or the underlying file.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Bit depth the writer does not support.
    #[error("unsupported bit depth {0} (expected 16, 24, or 32)")]
    UnsupportedBitDepth(u16),
}

/// Result alias for WAV operations.
pub type Result<T> = std::result::Result<T, WavError>;

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of channels in the file.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample; 32 means float.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

/// Deinterleaved stereo audio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoSamples {
    /// Left channel.
    pub left: Vec<f32>,
    /// Right channel.
    pub right: Vec<f32>,
}

impl StereoSamples {
    /// Wrap two channels, truncating to the shorter one.
    pub fn new(mut left: Vec<f32>, mut right: Vec<f32>) -> Self {
        let len = left.len().min(right.len());
        left.truncate(len);
        right.truncate(len);
        Self { left, right }
    }

    /// Duplicate a mono signal to both channels.
    pub fn from_mono(samples: Vec<f32>) -> Self {
        Self {
            right: samples.clone(),
            left: samples,
        }
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// True if there are no frames.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Duration at `sample_rate`.
    pub fn duration_secs(&self, sample_rate: u32) -> f32 {
        self.len() as f32 / sample_rate.max(1) as f32
    }
}

/// Read a WAV file as stereo.
///
/// Mono files are duplicated to both channels; files with more than two
/// channels keep the first two.
pub fn read_wav_stereo<P: AsRef<Path>>(path: P) -> Result<(StereoSamples, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let stereo = if channels == 1 {
        StereoSamples::from_mono(interleaved)
    } else {
        let frames = interleaved.len() / channels;
        let mut left = Vec::with_capacity(frames);
        let mut right = Vec::with_capacity(frames);
        for frame in interleaved.chunks_exact(channels) {
            left.push(frame[0]);
            right.push(frame[1]);
        }
        StereoSamples::new(left, right)
    };

    Ok((stereo, spec))
}

/// Write stereo samples. `spec.channels` is ignored; the file is always
/// stereo. Integer depths are clipped to full scale.
pub fn write_wav_stereo<P: AsRef<Path>>(
    path: P,
    samples: &StereoSamples,
    spec: WavSpec,
) -> Result<()> {
    let sample_format = match spec.bits_per_sample {
        32 => SampleFormat::Float,
        16 | 24 => SampleFormat::Int,
        other => return Err(WavError::UnsupportedBitDepth(other)),
    };
    let hound_spec = hound::WavSpec {
        channels: 2,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        sample_format,
    };
    let mut writer = WavWriter::create(path, hound_spec)?;

    let frames = samples.left.iter().zip(&samples.right);
    if sample_format == SampleFormat::Float {
        for (&l, &r) in frames {
            writer.write_sample(l)?;
            writer.write_sample(r)?;
        }
    } else {
        let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
        let quantize = |x: f32| (x * max_val).clamp(-max_val, max_val - 1.0) as i32;
        for (&l, &r) in frames {
            writer.write_sample(quantize(l))?;
            writer.write_sample(quantize(r))?;
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_signal(len: usize) -> StereoSamples {
        StereoSamples::new(
            (0..len).map(|i| (i as f32 * 0.01).sin() * 0.5).collect(),
            (0..len).map(|i| (i as f32 * 0.02).cos() * 0.25).collect(),
        )
    }

    #[test]
    fn test_float_round_trip() {
        let samples = test_signal(1000);
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec {
            sample_rate: 44100,
            ..WavSpec::default()
        };
        write_wav_stereo(file.path(), &samples, spec).unwrap();

        let (loaded, loaded_spec) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(loaded_spec, spec);
        assert_eq!(loaded, samples);
    }

    #[test]
    fn test_int16_round_trip() {
        let samples = test_signal(500);
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec {
            bits_per_sample: 16,
            ..WavSpec::default()
        };
        write_wav_stereo(file.path(), &samples, spec).unwrap();

        let (loaded, _) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(loaded.len(), 500);
        for (a, b) in samples.left.iter().zip(&loaded.left) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_mono_is_duplicated() {
        let file = NamedTempFile::new().unwrap();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(file.path(), spec).unwrap();
        for v in [0i16, 16384, -16384] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let (loaded, loaded_spec) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(loaded_spec.channels, 1);
        assert_eq!(loaded.left, vec![0.0, 0.5, -0.5]);
        assert_eq!(loaded.left, loaded.right);
    }

    #[test]
    fn test_clipping_and_bad_depth() {
        let file = NamedTempFile::new().unwrap();
        let loud = StereoSamples::new(vec![2.0], vec![-2.0]);
        let spec = WavSpec {
            bits_per_sample: 16,
            ..WavSpec::default()
        };
        write_wav_stereo(file.path(), &loud, spec).unwrap();
        let (loaded, _) = read_wav_stereo(file.path()).unwrap();
        assert!(loaded.left[0] < 1.0 && loaded.left[0] > 0.999);
        assert_eq!(loaded.right[0], -1.0);

        let spec = WavSpec {
            bits_per_sample: 12,
            ..WavSpec::default()
        };
        assert!(matches!(
            write_wav_stereo(file.path(), &loud, spec),
            Err(WavError::UnsupportedBitDepth(12))
        ));
    }

    #[test]
    fn test_stereo_samples_helpers() {
        let s = StereoSamples::new(vec![0.0; 10], vec![0.0; 8]);
        assert_eq!(s.len(), 8);
        assert!(!s.is_empty());
        assert!((s.duration_secs(8) - 1.0).abs() < 1e-6);
        assert!(StereoSamples::default().is_empty());
    }
}
