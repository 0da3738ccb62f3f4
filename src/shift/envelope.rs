//! Spectral envelope extraction via real cepstrum.
//!
//! The log-magnitude spectrum is split into a slowly varying envelope
//! (formants, the vocal tract) and a fine structure (harmonics, the source).
//! The envelope is what the formant stage warps.

use rustfft::num_complex::Complex;

use crate::core::fft::{FftPair, COMPLEX_ZERO};

/// Minimum magnitude floor to avoid log(0) in cepstral analysis.
pub const LOG_FLOOR: f32 = 1e-10;

/// Natural log of [`LOG_FLOOR`].
pub const LN_LOG_FLOOR: f32 = -23.025_85;

/// Natural log of a magnitude, floored at [`LOG_FLOOR`].
#[inline]
pub fn floored_ln(magnitude: f32) -> f32 {
    magnitude.max(LOG_FLOOR).ln()
}

/// Cepstral envelope extractor with preplanned FFTs and fixed scratch.
pub struct CepstralEnvelope {
    fft: FftPair,
    cepstrum: Vec<Complex<f32>>,
    order: usize,
}

impl CepstralEnvelope {
    /// Creates an extractor for spectra of `fft_size / 2 + 1` bins that keeps
    /// `order` cepstral coefficients on each side of quefrency zero.
    pub fn new(fft_size: usize, order: usize) -> Self {
        Self {
            fft: FftPair::new(fft_size),
            cepstrum: vec![COMPLEX_ZERO; fft_size],
            order: order.min(fft_size / 2),
        }
    }

    /// Lifter order.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Writes the natural-log envelope of `magnitudes` into `log_envelope`.
    ///
    /// The cepstral method:
    /// 1. Take log of magnitude spectrum
    /// 2. IFFT to get cepstrum
    /// 3. Lifter: zero out high-quefrency components
    /// 4. FFT back to get the smoothed log-spectrum
    ///
    /// Both slices hold `fft_size / 2 + 1` bins.
    pub fn extract_log(&mut self, magnitudes: &[f32], log_envelope: &mut [f32]) {
        let fft_size = self.fft.size();
        let num_bins = fft_size / 2 + 1;
        debug_assert!(magnitudes.len() >= num_bins && log_envelope.len() >= num_bins);

        for bin in 0..num_bins {
            self.cepstrum[bin] = Complex::new(floored_ln(magnitudes[bin]), 0.0);
        }
        for bin in 1..num_bins - 1 {
            self.cepstrum[fft_size - bin] = self.cepstrum[bin];
        }

        self.fft.inverse(&mut self.cepstrum);

        let norm = 1.0 / fft_size as f32;
        let order = self.order;
        for (i, c) in self.cepstrum.iter_mut().enumerate() {
            if i > order && i < fft_size - order {
                *c = COMPLEX_ZERO;
            } else {
                *c *= norm;
            }
        }

        self.fft.forward(&mut self.cepstrum);

        for bin in 0..num_bins {
            log_envelope[bin] = self.cepstrum[bin].re;
        }
    }
}
