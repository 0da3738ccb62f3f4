use serde::{Deserialize, Serialize};

use crate::error::ShiftError;

/// A single audio sample (32-bit float, nominally -1.0 to 1.0).
pub type Sample = f32;

/// Render quantum of the Web Audio API, the default block size.
pub const DEFAULT_BLOCK_SIZE: usize = 128;
/// Default analysis window length in samples. This is also the latency.
pub const DEFAULT_WINDOW_SIZE: usize = 1024;
/// Default hop between analysis frames.
pub const DEFAULT_HOP_SIZE: usize = 128;
/// Default number of cepstral coefficients kept for the spectral envelope.
pub const DEFAULT_ENVELOPE_ORDER: usize = 64;
/// Default sample rate, used only for time conversions and pitch analysis.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Largest accepted block size.
pub const MAX_BLOCK_SIZE: usize = 8192;
/// Smallest accepted analysis window.
pub const MIN_WINDOW_SIZE: usize = 64;
/// Largest accepted analysis window.
pub const MAX_WINDOW_SIZE: usize = 16384;
/// Minimum window/hop overlap factor for exact Hann² overlap-add.
pub const MIN_OVERLAP: usize = 4;

/// Input and output samples are saturated to this magnitude.
pub const MAX_SAMPLE_MAGNITUDE: f32 = 32.0;

/// Explicit lifecycle of a processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorPhase {
    /// Fewer than one analysis window of input has been seen; output is silence.
    Priming,
    /// The analysis window is full and output carries transformed audio.
    Steady,
}

/// Construction-time configuration of a [`VoiceProcessor`](crate::VoiceProcessor).
///
/// All buffer sizes derive from these values and are fixed for the lifetime
/// of the processor.
///
/// ```
/// use voiceshift::ProcessorConfig;
///
/// let config = ProcessorConfig::new()
///     .with_block_size(256)
///     .with_window_size(2048)
///     .with_hop_size(256);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Host block size in samples.
    pub block_size: usize,
    /// Analysis window length in samples.
    pub window_size: usize,
    /// Samples between successive analysis frames.
    pub hop_size: usize,
    /// Cepstral lifter order used to separate envelope from fine structure.
    pub envelope_order: usize,
    /// Stream sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            window_size: DEFAULT_WINDOW_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
            envelope_order: DEFAULT_ENVELOPE_ORDER,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl ProcessorConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets the analysis window size.
    ///
    /// The envelope order is not rescaled; set it separately when changing
    /// the window by a large factor.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Sets the hop size.
    pub fn with_hop_size(mut self, hop_size: usize) -> Self {
        self.hop_size = hop_size;
        self
    }

    /// Sets the cepstral envelope order.
    pub fn with_envelope_order(mut self, envelope_order: usize) -> Self {
        self.envelope_order = envelope_order;
        self
    }

    /// Sets the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Number of spectral bins (`window_size / 2 + 1`).
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.window_size / 2 + 1
    }

    /// Fixed latency in samples between input and output.
    #[inline]
    pub fn latency_samples(&self) -> usize {
        self.window_size
    }

    /// Checks that the configuration describes a usable processor.
    pub fn validate(&self) -> Result<(), ShiftError> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ShiftError::InvalidConfig(format!(
                "block_size must be in 1..={}, got {}",
                MAX_BLOCK_SIZE, self.block_size
            )));
        }
        if self.window_size < MIN_WINDOW_SIZE
            || self.window_size > MAX_WINDOW_SIZE
            || self.window_size % 2 != 0
        {
            return Err(ShiftError::InvalidConfig(format!(
                "window_size must be even and in {}..={}, got {}",
                MIN_WINDOW_SIZE, MAX_WINDOW_SIZE, self.window_size
            )));
        }
        if self.hop_size == 0 || self.window_size % self.hop_size != 0 {
            return Err(ShiftError::InvalidConfig(format!(
                "hop_size must divide window_size {}, got {}",
                self.window_size, self.hop_size
            )));
        }
        if self.window_size / self.hop_size < MIN_OVERLAP {
            return Err(ShiftError::InvalidConfig(format!(
                "window_size / hop_size must be at least {}, got {}",
                MIN_OVERLAP,
                self.window_size / self.hop_size
            )));
        }
        if self.envelope_order == 0 || self.envelope_order >= self.window_size / 2 {
            return Err(ShiftError::InvalidConfig(format!(
                "envelope_order must be in 1..{}, got {}",
                self.window_size / 2,
                self.envelope_order
            )));
        }
        if self.sample_rate == 0 {
            return Err(ShiftError::InvalidConfig(
                "sample_rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
