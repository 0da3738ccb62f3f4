//! Formant shifting by warping the cepstral envelope.
//!
//! The output magnitude of each bin is the pitch-shifted magnitude with its
//! own envelope divided out and the (warped) analysis envelope put back in.
//! With a formant ratio of 1.0 this keeps the original formants under a
//! pitch shift; with a pitch ratio of 1.0 it keeps the harmonics and moves
//! only the formants.

use crate::shift::envelope::{CepstralEnvelope, LN_LOG_FLOOR};

/// Largest per-bin envelope gain (or attenuation), in natural-log units.
/// About ±60 dB.
const MAX_ENVELOPE_GAIN_LN: f32 = 6.9;

/// Envelope-warping stage with fixed scratch buffers.
pub struct FormantShifter {
    envelope: CepstralEnvelope,
    analysis_envelope: Vec<f32>,
    shifted_envelope: Vec<f32>,
}

impl FormantShifter {
    /// Creates a formant stage for frames of `fft_size` points.
    pub fn new(fft_size: usize, envelope_order: usize) -> Self {
        let num_bins = fft_size / 2 + 1;
        Self {
            envelope: CepstralEnvelope::new(fft_size, envelope_order),
            analysis_envelope: vec![0.0; num_bins],
            shifted_envelope: vec![0.0; num_bins],
        }
    }

    /// Log envelope of the last analysed frame.
    #[inline]
    pub fn analysis_envelope(&self) -> &[f32] {
        &self.analysis_envelope
    }

    /// Combines the analysis envelope, warped by `formant_ratio`, with the
    /// fine structure of `shifted` and writes the result to `output`.
    ///
    /// `pitch_shifted` tells whether `shifted` differs from `analysis`; when
    /// it does not, the analysis envelope is reused instead of extracted
    /// twice. Bins where `shifted` is zero stay zero.
    pub fn process(
        &mut self,
        analysis: &[f32],
        shifted: &[f32],
        pitch_shifted: bool,
        formant_ratio: f32,
        output: &mut [f32],
    ) {
        let num_bins = self.analysis_envelope.len();
        self.envelope.extract_log(analysis, &mut self.analysis_envelope);
        let source_envelope = if pitch_shifted {
            self.envelope.extract_log(shifted, &mut self.shifted_envelope);
            &self.shifted_envelope
        } else {
            &self.analysis_envelope
        };

        for bin in 0..num_bins {
            let magnitude = shifted[bin];
            if magnitude <= 0.0 {
                output[bin] = 0.0;
                continue;
            }
            let target = warp_envelope(&self.analysis_envelope, bin, formant_ratio);
            let gain = (target - source_envelope[bin])
                .clamp(-MAX_ENVELOPE_GAIN_LN, MAX_ENVELOPE_GAIN_LN)
                .exp();
            output[bin] = magnitude * gain;
        }
    }
}

/// Reads `envelope` at `bin / ratio` with linear interpolation.
///
/// Positions past the last bin read as the log floor, so raising the
/// formants never invents energy above Nyquist.
#[inline]
pub fn warp_envelope(envelope: &[f32], bin: usize, ratio: f32) -> f32 {
    let last = envelope.len() - 1;
    let position = bin as f32 / ratio;
    let j = position.floor() as usize;
    let frac = position - j as f32;
    let left = if j <= last { envelope[j] } else { LN_LOG_FLOOR };
    let right = if j < last { envelope[j + 1] } else { LN_LOG_FLOOR };
    (1.0 - frac) * left + frac * right
}
