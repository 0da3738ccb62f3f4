//! Window functions for the short-time Fourier transform.
//!
//! The processor analyses and resynthesises with the same periodic Hann
//! window, which overlap-adds to a constant for any hop that divides the
//! window by four or more.

use std::f64::consts::PI;

/// Periodic (DFT-even) Hann window of `size` points.
pub fn periodic_hann(size: usize) -> Vec<f32> {
    match size {
        0 => return vec![],
        1 => return vec![1.0],
        _ => {}
    }
    let n = size as f64;
    (0..size)
        .map(|i| {
            let x = (2.0 * PI * i as f64) / n;
            (0.5 * (1.0 - x.cos())) as f32
        })
        .collect()
}

/// Returns the gain that makes `window`² overlap-add to unity at `hop`.
///
/// Analysis and synthesis both apply `window`, so each output sample is the
/// sum of `window[n]²` over all frames covering it. For a periodic Hann with
/// at least 4x overlap this sum is the same for every `n`, and equals
/// `Σ window² / hop`.
pub fn overlap_add_gain(window: &[f32], hop: usize) -> f32 {
    let energy: f64 = window.iter().map(|&w| (w as f64) * (w as f64)).sum();
    if energy <= 0.0 || hop == 0 {
        return 0.0;
    }
    (hop as f64 / energy) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_hann_properties() {
        let w = periodic_hann(1024);
        assert!(w[0].abs() < 1e-7);
        // Peak sits exactly at N/2 and the window is symmetric around it
        assert!((w[512] - 1.0).abs() < 1e-7);
        for i in 1..512 {
            assert!((w[512 - i] - w[512 + i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_squared_overlap_add_is_constant() {
        for &(size, hop) in &[(1024usize, 128usize), (1024, 256), (512, 64), (2048, 512)] {
            let w = periodic_hann(size);
            let gain = overlap_add_gain(&w, hop);
            for n in 0..hop {
                let sum: f32 = (0..size / hop).map(|k| w[n + k * hop].powi(2)).sum();
                assert!(
                    (sum * gain - 1.0).abs() < 1e-4,
                    "size={} hop={} n={} sum*gain={}",
                    size,
                    hop,
                    n,
                    sum * gain
                );
            }
        }
    }

    #[test]
    fn test_degenerate_sizes() {
        assert!(periodic_hann(0).is_empty());
        assert_eq!(periodic_hann(1), vec![1.0]);
        assert_eq!(overlap_add_gain(&[], 4), 0.0);
    }
}
