//! The stereo reverb effect: parameter handling, mixing and tail around a
//! [`Reverberator`].
//!
//! Per frame:
//!
//! ```text
//! pending parameter changes ──> reverberator setters / mix targets
//! [l, r] ──> expand ──> Reverberator<N> ──> collapse ──> dry/wet
//!        ──> mid/side width ──> smoothed output gain ──> [l', r']
//! ```
//!
//! Filter state is flushed every [`FLUSH_INTERVAL`] frames.

use crate::mixer::StereoMultiMixer;
use crate::params::ParamId;
use crate::shared::{ChangeSet, SharedParams};
use crate::smoothing::SmoothedParam;
use crate::tail::{ProcessStatus, TailHandler, tail_frames};
use reverblab_core::{ReverbConfig, ReverbError, Reverberator, db_to_linear};

/// Frames between denormal flushes.
pub const FLUSH_INTERVAL: u32 = 128;

/// Output gain smoothing time in ms.
pub const GAIN_SMOOTHING_MS: f32 = 20.0;

/// Stereo reverb effect over an `N`-channel FDN with `STEPS` diffusion
/// steps.
///
/// Parameters arrive through a [`SharedParams`] handle that other threads
/// write to; the effect applies whatever changed at the start of each frame.
///
/// # Example
///
/// ```rust
/// use reverblab_fx::{ParamId, ProcessStatus, ReverbLabFx, SharedParams};
///
/// let params = SharedParams::new();
/// let mut fx: ReverbLabFx = ReverbLabFx::new(params.clone());
/// fx.init(48000.0, 256).unwrap();
///
/// params.set(ParamId::Rt60, 1.2).unwrap();
///
/// let mut left = vec![0.0f32; 256];
/// let mut right = vec![0.0f32; 256];
/// left[0] = 1.0;
/// let status = fx.process(&mut left, &mut right, false);
/// assert_eq!(status, ProcessStatus::Active);
/// ```
#[derive(Debug)]
pub struct ReverbLabFx<const N: usize = 8, const STEPS: usize = 5> {
    params: SharedParams,
    reverb: Reverberator<N, STEPS>,
    mixer: StereoMultiMixer<N>,
    tail: TailHandler,
    sample_rate: f32,
    max_block_size: usize,
    wet: f32,
    dry: f32,
    width: f32,
    output_gain: SmoothedParam,
    frames_since_flush: u32,
}

impl<const N: usize, const STEPS: usize> ReverbLabFx<N, STEPS> {
    /// Create an uninitialized effect with default engine options.
    pub fn new(params: SharedParams) -> Self {
        Self::with_config(params, ReverbConfig::default())
    }

    /// Create an uninitialized effect with explicit engine options.
    ///
    /// Room size, decay time and damping in `config` are overridden by the
    /// parameter values on the first processed frame.
    pub fn with_config(params: SharedParams, config: ReverbConfig) -> Self {
        Self {
            params,
            reverb: Reverberator::new(config),
            mixer: StereoMultiMixer::new(),
            tail: TailHandler::new(),
            sample_rate: 0.0,
            max_block_size: 0,
            wet: 0.5,
            dry: 0.5,
            width: 1.0,
            output_gain: SmoothedParam::new(1.0),
            frames_since_flush: 0,
        }
    }

    /// Prepare for `sample_rate` and host blocks up to `max_block_size`.
    ///
    /// Allocates and clears all state; every parameter is re-applied
    /// immediately. On error the effect keeps its previous state.
    pub fn init(&mut self, sample_rate: f32, max_block_size: usize) -> Result<(), ReverbError> {
        // Push current values first so configure sizes and tunes for them
        self.apply_changes(ChangeSet::default(), true);
        self.reverb
            .configure(sample_rate, max_block_size)
            .inspect_err(|e| tracing::error!(error = %e, "reverb init failed"))?;

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.output_gain = SmoothedParam::with_config(
            db_to_linear(self.params.get(ParamId::OutputGain)),
            sample_rate,
            GAIN_SMOOTHING_MS,
        );
        self.tail.reset();
        self.frames_since_flush = 0;
        self.params.take_all_changed();

        tracing::info!(sample_rate, max_block_size, channels = N, "reverb effect initialized");
        Ok(())
    }

    /// Process a stereo block in place.
    ///
    /// `input_finished` tells the effect the host has no more input; the
    /// buffers are then treated as silence and the reverb rings out for
    /// `rt60 * sample_rate` frames. Only the common length of the two slices
    /// is processed. Returns the status after the last frame.
    pub fn process(
        &mut self,
        left: &mut [f32],
        right: &mut [f32],
        input_finished: bool,
    ) -> ProcessStatus {
        let mut status = if input_finished {
            ProcessStatus::Tail
        } else {
            ProcessStatus::Active
        };

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let tail_len = tail_frames(self.params.get(ParamId::Rt60), self.sample_rate);
            status = self.tail.advance(input_finished, tail_len);
            let [out_l, out_r] = match status {
                ProcessStatus::Active => self.process_frame([*l, *r]),
                ProcessStatus::Tail => self.process_frame([0.0, 0.0]),
                ProcessStatus::Finished => [0.0, 0.0],
            };
            *l = out_l;
            *r = out_r;
        }
        status
    }

    /// Process one stereo frame.
    ///
    /// Returns silence before a successful [`init`](Self::init).
    #[inline]
    pub fn process_frame(&mut self, input: [f32; 2]) -> [f32; 2] {
        let changes = self.params.take_all_changed();
        if !changes.is_empty() {
            self.apply_changes(changes, false);
        }

        let wet = self.mixer.collapse(&self.reverb.process(self.mixer.expand(input)));
        let l = self.dry * input[0] + self.wet * wet[0];
        let r = self.dry * input[1] + self.wet * wet[1];

        let mid = (l + r) * 0.5;
        let side = (l - r) * 0.5 * self.width;
        let gain = self.output_gain.advance();

        self.frames_since_flush += 1;
        if self.frames_since_flush >= FLUSH_INTERVAL {
            self.frames_since_flush = 0;
            self.reverb.flush_denormals();
        }

        [(mid + side) * gain, (mid - side) * gain]
    }

    /// Clear all audio state, keeping parameters and configuration.
    pub fn reset(&mut self) {
        self.reverb.reset();
        self.tail.reset();
        self.output_gain.snap_to_target();
        self.frames_since_flush = 0;
    }

    /// Tail length in frames for the current decay time.
    pub fn tail_frames(&self) -> usize {
        tail_frames(self.params.get(ParamId::Rt60), self.sample_rate)
    }

    /// Whether [`init`](Self::init) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.reverb.is_configured()
    }

    /// Largest host block announced at init.
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// The parameter handle.
    pub fn params(&self) -> &SharedParams {
        &self.params
    }

    /// The wrapped reverberator.
    pub fn reverb(&self) -> &Reverberator<N, STEPS> {
        &self.reverb
    }

    /// Apply parameter changes; `all` forces every parameter.
    fn apply_changes(&mut self, changes: ChangeSet, all: bool) {
        let changed = |id| all || changes.contains(id);
        let p = &self.params;

        if changed(ParamId::Rt60) {
            self.reverb.set_decay_time(p.get(ParamId::Rt60));
        }
        if changed(ParamId::HfCutoff) || changed(ParamId::HfAttenuation) {
            let attenuation = p.get(ParamId::HfAttenuation);
            self.reverb.set_damping(
                p.get(ParamId::HfCutoff),
                (attenuation > 0.0).then_some(attenuation),
            );
        }
        if changed(ParamId::RoomSize) {
            let room = p.get(ParamId::RoomSize);
            if let Err(e) = self.reverb.set_room_size(room) {
                tracing::warn!(error = %e, "room size change ignored");
            }
        }
        if changed(ParamId::DryWetMix) {
            self.wet = p.get(ParamId::DryWetMix) * 0.01;
            self.dry = 1.0 - self.wet;
        }
        if changed(ParamId::StereoWidth) {
            self.width = p.get(ParamId::StereoWidth);
        }
        if changed(ParamId::OutputGain) {
            self.output_gain
                .set_target(db_to_linear(p.get(ParamId::OutputGain)));
        }
    }
}
