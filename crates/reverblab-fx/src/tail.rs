//! Reverb tail bookkeeping after the host stops sending input.
//!
//! When the host flags its input as finished, the effect keeps running on
//! silence for a tail length latched at that moment, then reports
//! [`ProcessStatus::Finished`]. Fresh input at any point cancels the tail.

/// What the effect produced for a frame or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Processing live input.
    Active,
    /// Input finished; still ringing out.
    Tail,
    /// Tail exhausted; output is silence.
    Finished,
}

/// Counts down the tail once input has finished.
#[derive(Debug, Clone, Default)]
pub struct TailHandler {
    remaining: Option<usize>,
}

impl TailHandler {
    /// Create a handler with no tail in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame.
    ///
    /// `tail_frames` is only read on the first finished frame; later changes
    /// do not stretch a tail already in progress.
    #[inline]
    pub fn advance(&mut self, input_finished: bool, tail_frames: usize) -> ProcessStatus {
        if !input_finished {
            self.remaining = None;
            return ProcessStatus::Active;
        }
        let remaining = self.remaining.get_or_insert(tail_frames);
        if *remaining == 0 {
            ProcessStatus::Finished
        } else {
            *remaining -= 1;
            ProcessStatus::Tail
        }
    }

    /// Frames of tail left, if a tail is in progress.
    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    /// Forget any tail in progress.
    pub fn reset(&mut self) {
        self.remaining = None;
    }
}

/// Tail length in frames for a decay time.
pub fn tail_frames(rt60_secs: f32, sample_rate: f32) -> usize {
    (rt60_secs.max(0.0) * sample_rate.max(0.0)) as usize
}
