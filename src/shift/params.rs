//! Pitch and formant ratios: clamping, cross-thread handoff, and smoothing.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use atomic_float::AtomicF32;

/// Smallest accepted pitch or formant ratio (two octaves down).
pub const MIN_RATIO: f32 = 0.25;
/// Largest accepted pitch or formant ratio (two octaves up).
pub const MAX_RATIO: f32 = 4.0;

/// Per-frame smoothing coefficient for ratio changes, in the log2 domain.
const GLIDE_ALPHA: f32 = 0.35;
/// Distance (in octaves) below which a gliding ratio snaps to its target.
const GLIDE_SNAP_OCTAVES: f32 = 1e-4;

/// Limits a requested ratio to `[MIN_RATIO, MAX_RATIO]`.
///
/// Non-positive values and `-inf` map to [`MIN_RATIO`], `+inf` to
/// [`MAX_RATIO`]. `NaN` carries no usable information, so `current` is
/// returned unchanged.
#[inline]
pub fn clamp_ratio(requested: f32, current: f32) -> f32 {
    if requested.is_nan() {
        return current;
    }
    requested.clamp(MIN_RATIO, MAX_RATIO)
}

/// Converts a shift in semitones to a frequency ratio.
#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    (semitones / 12.0).exp2()
}

/// Converts a frequency ratio to semitones.
#[inline]
pub fn ratio_to_semitones(ratio: f32) -> f32 {
    12.0 * ratio.log2()
}

#[derive(Debug)]
struct SharedRatios {
    pitch: AtomicF32,
    formant: AtomicF32,
}

/// Lock-free, latest-value-wins handle to a processor's target ratios.
///
/// Clones share the same slots, so a control thread can hold one while the
/// audio thread owns the processor. Every store is clamped with
/// [`clamp_ratio`] before it becomes visible.
#[derive(Debug, Clone)]
pub struct ParamHandle {
    shared: Arc<SharedRatios>,
}

impl Default for ParamHandle {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl ParamHandle {
    /// Creates a handle with the given initial targets (clamped).
    pub fn new(pitch: f32, formant: f32) -> Self {
        Self {
            shared: Arc::new(SharedRatios {
                pitch: AtomicF32::new(clamp_ratio(pitch, 1.0)),
                formant: AtomicF32::new(clamp_ratio(formant, 1.0)),
            }),
        }
    }

    /// Stores a new pitch target.
    pub fn set_pitch(&self, ratio: f32) {
        store_clamped(&self.shared.pitch, ratio);
    }

    /// Stores a new formant target.
    pub fn set_formant(&self, ratio: f32) {
        store_clamped(&self.shared.formant, ratio);
    }

    /// Latest pitch target.
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.shared.pitch.load(Ordering::Relaxed)
    }

    /// Latest formant target.
    #[inline]
    pub fn formant(&self) -> f32 {
        self.shared.formant.load(Ordering::Relaxed)
    }
}

#[inline]
fn store_clamped(slot: &AtomicF32, requested: f32) {
    let current = slot.load(Ordering::Relaxed);
    let value = clamp_ratio(requested, current);
    if value != requested {
        log::debug!("ratio {} clamped to {}", requested, value);
    }
    slot.store(value, Ordering::Relaxed);
}

/// Moves a ratio toward its target once per analysis frame.
///
/// The glide is a one-pole filter on `log2(ratio)` so that equal musical
/// intervals take equal time, and it snaps exactly onto the target once
/// within [`GLIDE_SNAP_OCTAVES`]. Snapping matters: a ratio of exactly 1.0
/// selects the bit-transparent path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioGlide {
    current: f32,
}

impl RatioGlide {
    /// Starts at `initial` with no pending motion.
    pub fn new(initial: f32) -> Self {
        Self { current: initial }
    }

    /// Current smoothed value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.current
    }

    /// Advances one frame toward `target` and returns the new value.
    #[inline]
    pub fn step(&mut self, target: f32) -> f32 {
        if self.current == target {
            return target;
        }
        let from = self.current.log2();
        let to = target.log2();
        let next = from + GLIDE_ALPHA * (to - from);
        if (to - next).abs() < GLIDE_SNAP_OCTAVES {
            self.current = target;
        } else {
            self.current = next.exp2();
        }
        self.current
    }
}
