//! Spectral transforms: phase vocoder pitch shifting, cepstral envelope
//! extraction, formant warping, and the ratio parameters that drive them.

pub mod envelope;
pub mod formant;
pub mod params;
pub mod phase_vocoder;

pub use formant::FormantShifter;
pub use params::{clamp_ratio, ParamHandle, RatioGlide, MAX_RATIO, MIN_RATIO};
pub use phase_vocoder::PitchShifter;
