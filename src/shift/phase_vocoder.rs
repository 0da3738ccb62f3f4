//! Phase vocoder pitch shifting on a fixed analysis grid.
//!
//! Each frame is split into magnitudes and instantaneous frequencies. A
//! pitch ratio moves every bin's energy to `ratio` times its frequency while
//! the synthesis hop stays equal to the analysis hop, so duration is kept.

use rustfft::num_complex::Complex;
use std::f32::consts::PI;

const TWO_PI: f32 = 2.0 * PI;

/// Per-bin phase state for pitch shifting a stream of STFT frames.
///
/// All buffers are allocated in [`PitchShifter::new`]; [`analyze`] and
/// [`shift`] only overwrite them.
///
/// [`analyze`]: PitchShifter::analyze
/// [`shift`]: PitchShifter::shift
pub struct PitchShifter {
    fft_size: usize,
    hop: usize,
    num_bins: usize,
    /// Expected phase advance per hop for a bin-centred sinusoid.
    expected_phase_advance: Vec<f32>,
    /// Previous analysis phase.
    prev_input_phase: Vec<f32>,
    /// Phase accumulator for resynthesis.
    prev_output_phase: Vec<f32>,
    magnitudes: Vec<f32>,
    phases: Vec<f32>,
    /// Instantaneous frequency of each analysis bin, in bins.
    true_bins: Vec<f32>,
    shifted_magnitudes: Vec<f32>,
    output_phases: Vec<f32>,
}

impl PitchShifter {
    /// Creates a shifter for frames of `fft_size` points spaced `hop` apart.
    pub fn new(fft_size: usize, hop: usize) -> Self {
        let num_bins = fft_size / 2 + 1;
        let expected_phase_advance = (0..num_bins)
            .map(|bin| TWO_PI * bin as f32 * hop as f32 / fft_size as f32)
            .collect();
        Self {
            fft_size,
            hop,
            num_bins,
            expected_phase_advance,
            prev_input_phase: vec![0.0; num_bins],
            prev_output_phase: vec![0.0; num_bins],
            magnitudes: vec![0.0; num_bins],
            phases: vec![0.0; num_bins],
            true_bins: vec![0.0; num_bins],
            shifted_magnitudes: vec![0.0; num_bins],
            output_phases: vec![0.0; num_bins],
        }
    }

    /// Number of non-negative frequency bins.
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// Analysis magnitudes of the last frame.
    #[inline]
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Magnitudes after the last [`shift`](PitchShifter::shift).
    #[inline]
    pub fn shifted_magnitudes(&self) -> &[f32] {
        &self.shifted_magnitudes
    }

    /// Synthesis phases after the last [`shift`](PitchShifter::shift).
    #[inline]
    pub fn output_phases(&self) -> &[f32] {
        &self.output_phases
    }

    /// Measures magnitude, phase and instantaneous frequency of each bin.
    ///
    /// `spectrum` must hold at least `num_bins` bins of a forward FFT.
    pub fn analyze(&mut self, spectrum: &[Complex<f32>]) {
        let bins_per_radian = self.fft_size as f32 / (TWO_PI * self.hop as f32);
        for bin in 0..self.num_bins {
            let (magnitude, phase) = spectrum[bin].to_polar();
            let deviation = wrap_phase(
                phase - self.prev_input_phase[bin] - self.expected_phase_advance[bin],
            );
            self.prev_input_phase[bin] = phase;
            self.magnitudes[bin] = magnitude;
            self.phases[bin] = phase;
            self.true_bins[bin] = bin as f32 + deviation * bins_per_radian;
        }
    }

    /// Remaps the analysed frame by `ratio` and advances the synthesis phases.
    ///
    /// At exactly 1.0 the analysis phases are reused as-is, which keeps the
    /// unity path transparent and lets a later shift continue from them.
    pub fn shift(&mut self, ratio: f32) {
        if ratio == 1.0 {
            self.shifted_magnitudes.copy_from_slice(&self.magnitudes);
            self.output_phases.copy_from_slice(&self.phases);
            self.prev_output_phase.copy_from_slice(&self.phases);
            return;
        }

        let radians_per_bin = TWO_PI * self.hop as f32 / self.fft_size as f32;
        let last_bin = self.num_bins - 1;
        for bin in 0..self.num_bins {
            let source = (bin as f32 / ratio).round() as usize;
            let (magnitude, target_bin) = if source <= last_bin {
                (self.magnitudes[source], self.true_bins[source] * ratio)
            } else {
                // Nothing above the shifted Nyquist when pitching down
                (0.0, bin as f32)
            };
            let phase = wrap_phase(self.prev_output_phase[bin] + target_bin * radians_per_bin);
            self.prev_output_phase[bin] = phase;
            self.shifted_magnitudes[bin] = magnitude;
            self.output_phases[bin] = phase;
        }
    }

    /// Clears all phase history.
    pub fn reset(&mut self) {
        self.prev_input_phase.fill(0.0);
        self.prev_output_phase.fill(0.0);
    }
}

/// Wraps a phase value to [-PI, PI] using efficient modulo arithmetic.
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let p = phase + PI;
    p - (p / TWO_PI).floor() * TWO_PI - PI
}
