#![allow(dead_code)]

use std::f32::consts::PI;

use voiceshift::{ProcessorConfig, VoiceProcessor};

pub const SR: u32 = 48_000;

pub fn gen_sine<F>(freq_hz: f32, sr: u32, n: usize, amp_fn: F) -> Vec<f32>
where
    F: Fn(usize) -> f32,
{
    (0..n)
        .map(|i| {
            let phase = 2.0 * PI * freq_hz * i as f32 / sr as f32;
            amp_fn(i) * phase.sin()
        })
        .collect()
}

/// Harmonic series on `f0` shaped by a Gaussian envelope centred at
/// `formant_hz`: a crude vowel.
pub fn gen_vowel(f0: f32, formant_hz: f32, width_hz: f32, sr: u32, n: usize) -> Vec<f32> {
    let nyquist = sr as f32 / 2.0;
    let harmonics: Vec<(f32, f32)> = (1..)
        .map(|k| k as f32 * f0)
        .take_while(|&f| f < nyquist * 0.9)
        .map(|f| {
            let amp = (-0.5 * ((f - formant_hz) / width_hz).powi(2)).exp();
            (f, amp * 0.1)
        })
        .collect();
    (0..n)
        .map(|i| {
            let t = i as f32 / sr as f32;
            harmonics
                .iter()
                .map(|&(f, a)| a * (2.0 * PI * f * t).sin())
                .sum()
        })
        .collect()
}

pub fn windowed_rms(signal: &[f32], start: usize, len: usize) -> f64 {
    if signal.is_empty() || len == 0 {
        return 0.0;
    }
    let start = start.min(signal.len());
    let end = (start + len).min(signal.len());
    if end <= start {
        return 0.0;
    }
    let sum_sq: f64 = signal[start..end]
        .iter()
        .map(|&s| {
            let v = s as f64;
            v * v
        })
        .sum();
    (sum_sq / (end - start) as f64).sqrt()
}

/// Amplitude of the component at `freq_hz`, via a Hann-windowed Goertzel
/// filter.
pub fn tone_amplitude(signal: &[f32], freq_hz: f32, sr: u32) -> f64 {
    let n = signal.len();
    if n == 0 {
        return 0.0;
    }
    let w = 2.0 * std::f64::consts::PI * freq_hz as f64 / sr as f64;
    let coeff = 2.0 * w.cos();
    let (mut s1, mut s2) = (0.0f64, 0.0f64);
    let mut window_sum = 0.0f64;
    for (i, &x) in signal.iter().enumerate() {
        let win = 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / n as f64).cos();
        window_sum += win;
        let s0 = x as f64 * win + coeff * s1 - s2;
        s2 = s1;
        s1 = s0;
    }
    let power = s1 * s1 + s2 * s2 - coeff * s1 * s2;
    2.0 * power.max(0.0).sqrt() / window_sum
}

/// Frequency with the most energy between `lo_hz` and `hi_hz`, scanned in
/// `step_hz` increments.
pub fn dominant_frequency(signal: &[f32], sr: u32, lo_hz: f32, hi_hz: f32, step_hz: f32) -> f32 {
    let mut best = (lo_hz, 0.0f64);
    let mut f = lo_hz;
    while f <= hi_hz {
        let a = tone_amplitude(signal, f, sr);
        if a > best.1 {
            best = (f, a);
        }
        f += step_hz;
    }
    best.0
}

/// Index of the strongest harmonic of `f0` in `signal`, 1-based.
pub fn strongest_harmonic(signal: &[f32], f0: f32, sr: u32) -> usize {
    let nyquist = sr as f32 / 2.0;
    (1..)
        .take_while(|&k| k as f32 * f0 < nyquist * 0.8)
        .map(|k| (k, tone_amplitude(signal, k as f32 * f0, sr)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(k, _)| k)
        .unwrap_or(0)
}

/// Streams `input` through a fresh processor in `block`-sized calls.
pub fn run_blocks(
    config: ProcessorConfig,
    input: &[f32],
    block: usize,
    pitch: f32,
    formant: f32,
) -> Vec<f32> {
    let mut processor = VoiceProcessor::with_config(config).unwrap();
    processor.set_pitch(pitch);
    processor.set_formant(formant);
    let mut out = input.to_vec();
    for chunk in out.chunks_mut(block) {
        processor.process(chunk);
    }
    out
}

pub fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

pub fn max_step(signal: &[f32]) -> f32 {
    signal
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f32::max)
}
