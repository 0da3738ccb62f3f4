//! Fundamental frequency estimation with the normalized square difference
//! function (McLeod pitch method).
//!
//! The frame is not windowed. Its autocorrelation is computed through a
//! zero-padded FFT and normalized per lag. The first positive-lobe peak
//! within `PEAK_RATIO` of the tallest one is taken as the period.

use rustfft::num_complex::Complex;

use crate::core::fft::{FftPair, COMPLEX_ZERO};

/// Peaks within this fraction of the highest peak count as candidates.
const PEAK_RATIO: f32 = 0.9;

/// Default lowest detectable fundamental in Hz.
pub const DEFAULT_MIN_FREQUENCY: f32 = 60.0;
/// Default highest detectable fundamental in Hz.
pub const DEFAULT_MAX_FREQUENCY: f32 = 1500.0;
/// Default minimum clarity for a frame to count as voiced.
pub const DEFAULT_CLARITY_THRESHOLD: f32 = 0.6;

/// A detected fundamental.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimate {
    pub frequency_hz: f32,
    /// Height of the chosen NSDF peak, in `[0, 1]`. Higher is more periodic.
    pub clarity: f32,
}

/// Reusable NSDF pitch detector for frames of a fixed length.
pub struct PitchDetector {
    frame_size: usize,
    sample_rate: u32,
    min_frequency: f32,
    max_frequency: f32,
    threshold: f32,
    frame: Vec<f32>,
    fft: FftPair,
    spectrum: Vec<Complex<f32>>,
    nsdf: Vec<f32>,
    peaks: Vec<(f32, f32)>,
}

impl PitchDetector {
    /// Creates a detector for frames of `frame_size` samples.
    pub fn new(frame_size: usize, sample_rate: u32) -> Self {
        let frame_size = frame_size.max(4);
        let padded = 2 * frame_size;
        Self {
            frame_size,
            sample_rate,
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            threshold: DEFAULT_CLARITY_THRESHOLD,
            frame: vec![0.0; frame_size],
            fft: FftPair::new(padded),
            spectrum: vec![COMPLEX_ZERO; padded],
            nsdf: vec![0.0; frame_size],
            peaks: Vec::with_capacity(32),
        }
    }

    /// Restricts detection to `[min_hz, max_hz]`.
    pub fn with_range(mut self, min_hz: f32, max_hz: f32) -> Self {
        self.min_frequency = min_hz.max(1.0);
        self.max_frequency = max_hz.max(self.min_frequency);
        self
    }

    /// Sets the clarity below which a frame is reported as unvoiced.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Estimates the fundamental of `frame`.
    ///
    /// Frames shorter than the configured size are zero-padded; longer ones
    /// are truncated. Returns `None` for silent, noisy or out-of-range input.
    pub fn detect(&mut self, frame: &[f32]) -> Option<PitchEstimate> {
        let n = self.frame_size;
        let used = frame.len().min(n);
        self.frame.fill(0.0);
        for (dst, &x) in self.frame.iter_mut().zip(&frame[..used]) {
            *dst = if x.is_finite() { x } else { 0.0 };
        }

        let energy: f32 = self.frame.iter().map(|x| x * x).sum();
        if energy < 1e-12 {
            return None;
        }

        self.compute_nsdf();
        self.pick_peaks();

        let min_lag = self.sample_rate as f32 / self.max_frequency;
        let max_lag = self.sample_rate as f32 / self.min_frequency;
        let highest = self
            .peaks
            .iter()
            .filter(|p| p.0 >= min_lag && p.0 <= max_lag)
            .fold(0.0f32, |m, p| m.max(p.1));
        if highest < self.threshold {
            return None;
        }

        self.peaks
            .iter()
            .filter(|p| p.0 >= min_lag && p.0 <= max_lag)
            .find(|p| p.1 >= highest * PEAK_RATIO)
            .map(|&(lag, clarity)| PitchEstimate {
                frequency_hz: self.sample_rate as f32 / lag,
                clarity: clarity.min(1.0),
            })
    }

    /// NSDF(τ) = 2·r(τ) / m(τ).
    fn compute_nsdf(&mut self) {
        let n = self.frame_size;
        let padded = self.spectrum.len();

        for (i, bin) in self.spectrum.iter_mut().enumerate() {
            *bin = Complex::new(if i < n { self.frame[i] } else { 0.0 }, 0.0);
        }
        self.fft.forward(&mut self.spectrum);
        for bin in self.spectrum.iter_mut() {
            *bin = Complex::new(bin.norm_sqr(), 0.0);
        }
        self.fft.inverse(&mut self.spectrum);

        let scale = 1.0 / padded as f32;
        let mut m = f32::EPSILON;
        for i in 0..n {
            let lag = n - 1 - i;
            m += self.frame[i] * self.frame[i] + self.frame[lag] * self.frame[lag];
            self.nsdf[lag] = 2.0 * self.spectrum[lag].re * scale / m;
        }
    }

    /// Collects the highest interpolated peak of each positive lobe after the
    /// first negative-going zero crossing.
    fn pick_peaks(&mut self) {
        self.peaks.clear();
        let nsdf = &self.nsdf[..self.frame_size / 2];
        let mut lobe: Option<(f32, f32)> = None;
        let mut seen_negative = false;

        for i in 0..nsdf.len().saturating_sub(2) {
            let (a, b, c) = (nsdf[i], nsdf[i + 1], nsdf[i + 2]);
            if b < 0.0 {
                if let Some(peak) = lobe.take() {
                    self.peaks.push(peak);
                }
                seen_negative = true;
                continue;
            }
            if !seen_negative || !(b > a && b >= c) {
                continue;
            }
            let curvature = a - 2.0 * b + c;
            let (offset, height) = if curvature.abs() > f32::EPSILON {
                let d = 0.5 * (a - c) / curvature;
                (d, b - 0.25 * (a - c) * d)
            } else {
                (0.0, b)
            };
            let candidate = ((i + 1) as f32 + offset, height);
            if lobe.map_or(true, |p| candidate.1 > p.1) {
                lobe = Some(candidate);
            }
        }
        if let Some(peak) = lobe {
            self.peaks.push(peak);
        }
    }
}
