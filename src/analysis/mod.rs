//! Signal analysis that runs beside the real-time path.

pub mod pitch;

pub use pitch::{PitchDetector, PitchEstimate};
