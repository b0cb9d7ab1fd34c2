//! Integer-offset delay line for the diffusion and feedback stages.
//!
//! The reverb only ever reads whole-sample offsets, so there is no
//! interpolation here: a read is a single indexed load.
//!
//! # Offsets
//!
//! `read(0)` returns the most recent write, `read(d)` the sample written `d`
//! writes ago. A line resized for `max_offset` holds `max_offset + 1`
//! samples so that `read(max_offset)` is always valid.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Circular buffer delay line (heap-allocated, sized once).
///
/// # Memory
///
/// [`resize`](Self::resize) is the only method that allocates. It must be
/// called from a setup path, never from the audio callback.
///
/// # Example
///
/// ```rust
/// use reverblab_core::DelayLine;
///
/// let mut line = DelayLine::new(4);
/// line.write(1.0);
/// line.write(0.0);
/// assert_eq!(line.read(1), 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Creates a delay line able to read back up to `max_offset` samples.
    pub fn new(max_offset: usize) -> Self {
        let mut line = Self::default();
        line.resize(max_offset);
        line
    }

    /// Reallocates for `max_offset` and clears to silence.
    pub fn resize(&mut self, max_offset: usize) {
        self.buffer = vec![0.0; max_offset + 1];
        self.write_pos = 0;
    }

    /// Writes one sample, overwriting the oldest once the buffer has wrapped.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        // An unsized line swallows writes.
        if self.buffer.is_empty() {
            return;
        }
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Reads the sample written `offset` writes ago.
    ///
    /// `offset` is clamped to `capacity() - 1`. Reading further back than
    /// anything written since the last [`clear`](Self::clear) yields `0.0`.
    #[inline]
    pub fn read(&self, offset: usize) -> f32 {
        let len = self.buffer.len();
        if len == 0 {
            return 0.0;
        }
        let offset = offset.min(len - 1);
        self.buffer[(self.write_pos + len - offset - 1) % len]
    }

    /// Clears the buffer without reallocating.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Number of samples held (maximum readable offset plus one).
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Largest offset [`read`](Self::read) honours without clamping.
    pub fn max_offset(&self) -> usize {
        self.buffer.len().saturating_sub(1)
    }
}
