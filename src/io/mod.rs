//! File I/O for the offline tool.

pub mod wav;

pub use wav::{read_wav, read_wav_file, write_wav_file, MonoClip, WavEncoding};
