//! Lock-free parameter handoff between the control and audio threads.
//!
//! [`SharedParams`] is cloned into every thread that needs it. Values are
//! stored as atomic `u32` (f32 bit-cast); a single atomic bitmask records
//! which parameters changed since the audio thread last looked.
//!
//! Writers store the value, then set the flag (`Release`). The audio thread
//! clears flags with `swap`/`fetch_and` (`AcqRel`) before loading values, so
//! a flag it observes always comes with the value that raised it.

use crate::params::{PARAM_COUNT, ParamError, ParamId, ParamValues};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Mask with every parameter's change bit set.
const ALL_CHANGED: u32 = (1 << PARAM_COUNT) - 1;

struct SharedParamsData {
    /// Current values as f32 bit-cast to u32.
    values: [AtomicU32; PARAM_COUNT],
    /// Bit `id` is set while parameter `id` has an unseen change.
    changed: AtomicU32,
}

/// Parameter storage shared by all threads of one effect instance.
///
/// # Example
///
/// ```rust
/// use reverblab_fx::{ParamId, SharedParams};
///
/// let params = SharedParams::new();
/// let audio = params.clone();
/// assert!(audio.take_changed(ParamId::Rt60)); // fresh instance: all changed
///
/// params.set(ParamId::Rt60, 3.0).unwrap();
/// assert!(audio.take_changed(ParamId::Rt60));
/// assert!(!audio.take_changed(ParamId::Rt60));
/// assert_eq!(audio.get(ParamId::Rt60), 3.0);
/// ```
#[derive(Clone)]
pub struct SharedParams {
    inner: Arc<SharedParamsData>,
}

impl SharedParams {
    /// Shared state holding the default values, all flagged as changed.
    pub fn new() -> Self {
        Self::from_values(ParamValues::default())
    }

    /// Shared state holding `values`, all flagged as changed.
    pub fn from_values(values: ParamValues) -> Self {
        let atomics = ParamId::ALL.map(|id| AtomicU32::new(values.get(id).to_bits()));
        Self {
            inner: Arc::new(SharedParamsData {
                values: atomics,
                changed: AtomicU32::new(ALL_CHANGED),
            }),
        }
    }

    /// Build shared state from a bank block.
    pub fn from_bank(block: &[u8]) -> Result<Self, ParamError> {
        ParamValues::from_bank(block).map(Self::from_values)
    }

    /// Read the current value (lock-free).
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.inner.values[id.index()].load(Ordering::Acquire))
    }

    /// Write a value (lock-free), clamped to range, and flag it as changed.
    ///
    /// Returns the stored value.
    pub fn set(&self, id: ParamId, value: f32) -> Result<f32, ParamError> {
        let clamped = id.sanitize(value)?;
        self.inner.values[id.index()].store(clamped.to_bits(), Ordering::Release);
        self.inner.changed.fetch_or(id.bit(), Ordering::Release);
        Ok(clamped)
    }

    /// Write a value by numeric id.
    pub fn set_param(&self, id: u32, value: f32) -> Result<f32, ParamError> {
        let param = ParamId::from_raw(id).ok_or_else(|| {
            tracing::warn!(id, "ignoring unknown parameter id");
            ParamError::UnknownId(id)
        })?;
        self.set(param, value)
    }

    /// Replace every value from a bank block and flag all as changed.
    ///
    /// On error nothing is modified.
    pub fn load_bank(&self, block: &[u8]) -> Result<(), ParamError> {
        let values = ParamValues::from_bank(block).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected parameter bank");
        })?;
        self.store_all(&values);
        Ok(())
    }

    /// Replace every value and flag all as changed.
    pub fn store_all(&self, values: &ParamValues) {
        for (id, value) in values.iter() {
            self.inner.values[id.index()].store(value.to_bits(), Ordering::Release);
        }
        self.mark_all_changed();
    }

    /// Flag every parameter as changed.
    pub fn mark_all_changed(&self) {
        self.inner.changed.fetch_or(ALL_CHANGED, Ordering::Release);
    }

    /// Report whether `id` changed since the last check, clearing its flag.
    pub fn take_changed(&self, id: ParamId) -> bool {
        let bit = id.bit();
        self.inner.changed.fetch_and(!bit, Ordering::AcqRel) & bit != 0
    }

    /// Take every pending change flag at once.
    pub fn take_all_changed(&self) -> ChangeSet {
        ChangeSet(self.inner.changed.swap(0, Ordering::AcqRel))
    }

    /// Copy of all current values.
    pub fn snapshot(&self) -> ParamValues {
        ParamValues::from_array(ParamId::ALL.map(|id| self.get(id)))
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedParams")
            .field("values", &self.snapshot())
            .field(
                "changed",
                &format_args!("{:#09b}", self.inner.changed.load(Ordering::Relaxed)),
            )
            .finish()
    }
}

/// A set of parameter change flags taken in one atomic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeSet(u32);

impl ChangeSet {
    /// Whether `id` is in the set.
    #[inline]
    pub fn contains(self, id: ParamId) -> bool {
        self.0 & id.bit() != 0
    }

    /// Whether no flags are set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::BANK_SIZE;

    #[test]
    fn test_new_flags_everything() {
        let shared = SharedParams::new();
        let changes = shared.take_all_changed();
        for id in ParamId::ALL {
            assert!(changes.contains(id));
        }
        assert!(shared.take_all_changed().is_empty());
    }

    #[test]
    fn test_set_clamps_and_flags() {
        let shared = SharedParams::new();
        shared.take_all_changed();

        assert_eq!(shared.set(ParamId::StereoWidth, 5.0), Ok(2.0));
        assert_eq!(shared.get(ParamId::StereoWidth), 2.0);

        let changes = shared.take_all_changed();
        assert!(changes.contains(ParamId::StereoWidth));
        assert!(!changes.contains(ParamId::Rt60));
    }

    #[test]
    fn test_take_changed_clears_only_its_bit() {
        let shared = SharedParams::new();
        shared.take_all_changed();
        shared.set(ParamId::Rt60, 1.0).unwrap();
        shared.set(ParamId::RoomSize, 100.0).unwrap();

        assert!(shared.take_changed(ParamId::Rt60));
        assert!(!shared.take_changed(ParamId::Rt60));
        assert!(shared.take_changed(ParamId::RoomSize));
    }

    #[test]
    fn test_rejected_set_leaves_state() {
        let shared = SharedParams::new();
        shared.take_all_changed();
        assert!(shared.set(ParamId::Rt60, f32::NAN).is_err());
        assert_eq!(shared.set_param(42, 1.0), Err(ParamError::UnknownId(42)));
        assert_eq!(shared.get(ParamId::Rt60), 0.5);
        assert!(shared.take_all_changed().is_empty());
    }

    #[test]
    fn test_load_bank() {
        let shared = SharedParams::new();
        shared.take_all_changed();

        let mut values = ParamValues::default();
        values.set(ParamId::DryWetMix, 80.0).unwrap();
        shared.load_bank(&values.to_bank()).unwrap();
        assert_eq!(shared.get(ParamId::DryWetMix), 80.0);
        assert_eq!(shared.take_all_changed(), ChangeSet(ALL_CHANGED));

        // A malformed block is rejected without touching anything
        assert!(shared.load_bank(&[0u8; BANK_SIZE - 1]).is_err());
        assert_eq!(shared.get(ParamId::DryWetMix), 80.0);
        assert!(shared.take_all_changed().is_empty());

        // Empty block resets to defaults
        shared.load_bank(&[]).unwrap();
        assert_eq!(shared.snapshot(), ParamValues::default());
    }

    #[test]
    fn test_handoff_across_threads() {
        let shared = SharedParams::new();
        shared.take_all_changed();

        let writer = shared.clone();
        std::thread::spawn(move || {
            writer.set(ParamId::OutputGain, -6.0).unwrap();
        })
        .join()
        .unwrap();

        assert!(shared.take_changed(ParamId::OutputGain));
        assert_eq!(shared.get(ParamId::OutputGain), -6.0);
    }
}
