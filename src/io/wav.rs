//! WAV reading and writing for the offline tool, backed by `hound`.
//!
//! Everything is mono at this layer: multi-channel files are averaged down
//! on read.

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::core::types::Sample;
use crate::error::ShiftError;

/// A mono clip with its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoClip {
    pub samples: Vec<Sample>,
    pub sample_rate: u32,
    /// Channel count of the source file before downmixing.
    pub source_channels: u16,
}

impl MonoClip {
    pub fn new(samples: Vec<Sample>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            source_channels: 1,
        }
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Sample encoding for written files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavEncoding {
    #[default]
    Int16,
    Float32,
}

impl WavEncoding {
    fn spec(self, sample_rate: u32) -> WavSpec {
        let (bits_per_sample, sample_format) = match self {
            WavEncoding::Int16 => (16, SampleFormat::Int),
            WavEncoding::Float32 => (32, SampleFormat::Float),
        };
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample,
            sample_format,
        }
    }
}

/// Reads a WAV file from a byte slice.
pub fn read_wav(data: &[u8]) -> Result<MonoClip, ShiftError> {
    decode(WavReader::new(Cursor::new(data))?)
}

/// Reads a WAV file from disk.
pub fn read_wav_file(path: impl AsRef<Path>) -> Result<MonoClip, ShiftError> {
    decode(WavReader::open(path)?)
}

fn decode<R: Read>(reader: WavReader<R>) -> Result<MonoClip, ShiftError> {
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(ShiftError::Wav("file declares zero channels".to_string()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    let channels = spec.channels as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        log::info!("downmixing {} channels to mono", channels);
        let gain = 1.0 / channels as f32;
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * gain)
            .collect()
    };

    Ok(MonoClip {
        samples,
        sample_rate: spec.sample_rate,
        source_channels: spec.channels,
    })
}

fn encode<W: Write + Seek>(
    writer: W,
    clip: &MonoClip,
    encoding: WavEncoding,
) -> Result<(), ShiftError> {
    let mut wav = WavWriter::new(writer, encoding.spec(clip.sample_rate))?;
    match encoding {
        WavEncoding::Int16 => {
            for &s in &clip.samples {
                let clamped = s.clamp(-1.0, 1.0);
                wav.write_sample((clamped * i16::MAX as f32).round() as i16)?;
            }
        }
        WavEncoding::Float32 => {
            for &s in &clip.samples {
                wav.write_sample(s)?;
            }
        }
    }
    wav.finalize()?;
    Ok(())
}

/// Encodes a clip as a 16-bit PCM WAV byte vector.
pub fn write_wav_16bit(clip: &MonoClip) -> Result<Vec<u8>, ShiftError> {
    let mut cursor = Cursor::new(Vec::new());
    encode(&mut cursor, clip, WavEncoding::Int16)?;
    Ok(cursor.into_inner())
}

/// Encodes a clip as a 32-bit float WAV byte vector.
pub fn write_wav_float(clip: &MonoClip) -> Result<Vec<u8>, ShiftError> {
    let mut cursor = Cursor::new(Vec::new());
    encode(&mut cursor, clip, WavEncoding::Float32)?;
    Ok(cursor.into_inner())
}

/// Writes a clip to disk in the given encoding.
pub fn write_wav_file(
    path: impl AsRef<Path>,
    clip: &MonoClip,
    encoding: WavEncoding,
) -> Result<(), ShiftError> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    encode(file, clip, encoding)
}
