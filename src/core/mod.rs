//! Core types, window functions, FFT plumbing, and fixed-size buffers.

pub mod fft;
pub mod ring_buffer;
pub mod types;
pub mod window;

pub use types::*;
pub use window::{overlap_add_gain, periodic_hann};
