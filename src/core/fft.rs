//! Pre-planned FFTs and spectrum helpers shared across the crate.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Zero-valued complex number, used for FFT buffer initialization.
pub const COMPLEX_ZERO: Complex<f32> = Complex::new(0.0, 0.0);

/// Forward and inverse FFT plans of one size, plus the scratch they need.
///
/// Planning happens once in [`FftPair::new`]. [`forward`](FftPair::forward)
/// and [`inverse`](FftPair::inverse) run in place with preallocated scratch
/// and never touch the heap.
pub struct FftPair {
    size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    forward_scratch_len: usize,
    inverse_scratch_len: usize,
    scratch: Vec<Complex<f32>>,
}

impl FftPair {
    /// Plans forward and inverse transforms of `size` points.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let forward_scratch_len = forward.get_inplace_scratch_len();
        let inverse_scratch_len = inverse.get_inplace_scratch_len();
        Self {
            size,
            forward,
            inverse,
            forward_scratch_len,
            inverse_scratch_len,
            scratch: vec![COMPLEX_ZERO; forward_scratch_len.max(inverse_scratch_len)],
        }
    }

    /// Transform size.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Unnormalized forward transform in place.
    #[inline]
    pub fn forward(&mut self, buffer: &mut [Complex<f32>]) {
        debug_assert_eq!(buffer.len(), self.size);
        self.forward
            .process_with_scratch(buffer, &mut self.scratch[..self.forward_scratch_len]);
    }

    /// Unnormalized inverse transform in place. Divide by `size` to undo
    /// a forward transform.
    #[inline]
    pub fn inverse(&mut self, buffer: &mut [Complex<f32>]) {
        debug_assert_eq!(buffer.len(), self.size);
        self.inverse
            .process_with_scratch(buffer, &mut self.scratch[..self.inverse_scratch_len]);
    }
}

/// Rebuilds the negative-frequency half of a real signal's spectrum from
/// bins `0..=len/2`.
#[inline]
pub fn mirror_spectrum(spectrum: &mut [Complex<f32>]) {
    let len = spectrum.len();
    for bin in 1..len / 2 {
        spectrum[len - bin] = spectrum[bin].conj();
    }
}
