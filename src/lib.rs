#![forbid(unsafe_code)]
//! Real-time pitch and formant shifting for a live mono voice.
//!
//! `voiceshift` retunes the pitch of an audio stream and moves its spectral
//! envelope (the formants) independently, one fixed-size block at a time.
//! It uses a phase vocoder for the pitch stage and a cepstral envelope for
//! the formant stage, with a constant latency of one analysis window.
//!
//! # Streaming
//!
//! ```
//! use voiceshift::VoiceProcessor;
//!
//! let mut processor = VoiceProcessor::new();
//! processor.set_pitch(1.26); // about four semitones up
//! processor.set_formant(1.1);
//!
//! let mut block = vec![0.0f32; 128];
//! // fill `block` from the input device, then:
//! processor.process(&mut block);
//! assert_eq!(processor.latency_samples(), 1024);
//! ```
//!
//! Parameters can be changed from another thread through a [`ParamHandle`]:
//!
//! ```
//! use voiceshift::VoiceProcessor;
//!
//! let processor = VoiceProcessor::new();
//! let params = processor.params();
//! std::thread::spawn(move || params.set_pitch(0.5)).join().unwrap();
//! ```
//!
//! # Offline
//!
//! ```
//! use voiceshift::ProcessorConfig;
//!
//! let input: Vec<f32> = (0..48_000)
//!     .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 48_000.0).sin() * 0.5)
//!     .collect();
//!
//! let output = voiceshift::render(&input, &ProcessorConfig::default(), 1.5, 1.0).unwrap();
//! assert_eq!(output.len(), input.len());
//! ```

pub mod analysis;
pub mod core;
pub mod error;
#[cfg(feature = "wav")]
pub mod io;
pub mod shift;
pub mod stream;

pub use analysis::pitch::{PitchDetector, PitchEstimate};
pub use crate::core::types::{ProcessorConfig, ProcessorPhase, Sample};
pub use error::ShiftError;
pub use shift::params::{
    clamp_ratio, ratio_to_semitones, semitones_to_ratio, ParamHandle, MAX_RATIO, MIN_RATIO,
};
pub use stream::{ControlMessage, ReadyFlag, VoiceProcessor, WorkletShim};

/// Validates that input is non-empty and contains only finite samples.
///
/// Returns `Ok(false)` if input is empty (caller should return `Ok(vec![])`),
/// `Ok(true)` if input is valid, or `Err` if it contains NaN/Inf.
#[inline]
fn validate_input(input: &[f32]) -> Result<bool, ShiftError> {
    if input.is_empty() {
        return Ok(false);
    }
    if let Some(pos) = input.iter().position(|s| !s.is_finite()) {
        return Err(ShiftError::InvalidInput(format!(
            "non-finite sample at index {}",
            pos
        )));
    }
    Ok(true)
}

/// Shifts a whole mono buffer at once.
///
/// The buffer is streamed through a [`VoiceProcessor`] in blocks of
/// `config.block_size`, the tail is flushed with silence, and the latency is
/// removed so `output[i]` lines up with `input[i]`. Ratios are applied from
/// the first sample without gliding.
///
/// # Errors
///
/// Returns [`ShiftError::InvalidConfig`] for an invalid `config` and
/// [`ShiftError::InvalidInput`] if `input` contains NaN or infinity.
pub fn render(
    input: &[f32],
    config: &ProcessorConfig,
    pitch: f32,
    formant: f32,
) -> Result<Vec<f32>, ShiftError> {
    let params = ParamHandle::new(pitch, formant);
    let mut processor = VoiceProcessor::with_params(config.clone(), params)?;
    if !validate_input(input)? {
        return Ok(vec![]);
    }

    let latency = processor.latency_samples();
    let mut buffer = Vec::with_capacity(input.len() + latency);
    buffer.extend_from_slice(input);
    buffer.resize(input.len() + latency, 0.0);

    for block in buffer.chunks_mut(config.block_size) {
        processor.process(block);
    }

    buffer.drain(..latency);
    Ok(buffer)
}
