use rustfft::num_complex::Complex;

use crate::core::fft::{mirror_spectrum, FftPair, COMPLEX_ZERO};
use crate::core::ring_buffer::RingBuffer;
use crate::core::types::{ProcessorConfig, ProcessorPhase, MAX_SAMPLE_MAGNITUDE};
use crate::core::window::{overlap_add_gain, periodic_hann};
use crate::error::ShiftError;
use crate::shift::formant::FormantShifter;
use crate::shift::params::{ParamHandle, RatioGlide};
use crate::shift::phase_vocoder::PitchShifter;

/// Frames whose peak stays below this are treated as digital silence and
/// skip the spectral path entirely.
const SILENCE_THRESHOLD: f32 = 1e-9;

/// Block-wise pitch and formant processor for a live mono stream.
///
/// Every buffer is sized in the constructor; [`process`](Self::process)
/// never allocates, locks, or panics. Output lags input by exactly
/// [`latency_samples`](Self::latency_samples) samples, whatever the block
/// sizes the host delivers.
///
/// ```
/// use voiceshift::VoiceProcessor;
///
/// let mut processor = VoiceProcessor::new();
/// processor.set_pitch(1.5);
/// processor.set_formant(0.9);
///
/// let mut block = [0.0f32; 128];
/// processor.process(&mut block);
/// ```
pub struct VoiceProcessor {
    config: ProcessorConfig,
    params: ParamHandle,
    pitch: RatioGlide,
    formant: RatioGlide,
    window: Vec<f32>,
    /// Overlap-add gain that makes analysis × synthesis windows sum to one.
    ola_gain: f32,
    /// The most recent `window_size` conditioned input samples.
    history: RingBuffer<f32>,
    /// Conditioned slice of the current block, at most one hop long.
    input_scratch: Vec<f32>,
    frame: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    fft: FftPair,
    pitch_shifter: PitchShifter,
    formant_shifter: FormantShifter,
    magnitudes: Vec<f32>,
    /// Overlap-add accumulator aligned with the span of the next frame.
    overlap: Vec<f32>,
    /// Finished output samples waiting to be handed to the host.
    output: RingBuffer<f32>,
    /// Input samples still needed before the next frame is due.
    until_hop: usize,
    samples_seen: u64,
    phase: ProcessorPhase,
}

impl Default for VoiceProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceProcessor {
    /// Creates a processor with [`ProcessorConfig::default`] and unity ratios.
    pub fn new() -> Self {
        Self::build(ProcessorConfig::default(), ParamHandle::default())
    }

    /// Creates a processor with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::InvalidConfig`] if `config` fails
    /// [`ProcessorConfig::validate`].
    pub fn with_config(config: ProcessorConfig) -> Result<Self, ShiftError> {
        Self::with_params(config, ParamHandle::default())
    }

    /// Creates a processor driven by an existing parameter handle.
    ///
    /// The internal ratios start at the handle's current values instead of
    /// gliding up from 1.0.
    pub fn with_params(config: ProcessorConfig, params: ParamHandle) -> Result<Self, ShiftError> {
        if let Err(err) = config.validate() {
            log::warn!("rejected processor configuration: {}", err);
            return Err(err);
        }
        Ok(Self::build(config, params))
    }

    fn build(config: ProcessorConfig, params: ParamHandle) -> Self {
        let window_size = config.window_size;
        let hop = config.hop_size;
        let num_bins = config.num_bins();
        let window = periodic_hann(window_size);
        let ola_gain = overlap_add_gain(&window, hop);

        log::debug!(
            "voice processor: block={} window={} hop={} envelope_order={} latency={}",
            config.block_size,
            window_size,
            hop,
            config.envelope_order,
            config.latency_samples()
        );

        Self {
            pitch: RatioGlide::new(params.pitch()),
            formant: RatioGlide::new(params.formant()),
            params,
            window,
            ola_gain,
            history: RingBuffer::prefilled(window_size, window_size),
            input_scratch: vec![0.0; hop],
            frame: vec![0.0; window_size],
            spectrum: vec![COMPLEX_ZERO; window_size],
            fft: FftPair::new(window_size),
            pitch_shifter: PitchShifter::new(window_size, hop),
            formant_shifter: FormantShifter::new(window_size, config.envelope_order),
            magnitudes: vec![0.0; num_bins],
            overlap: vec![0.0; window_size],
            // One hop of pre-roll is already final at construction.
            output: RingBuffer::prefilled(config.block_size + 2 * hop, hop),
            until_hop: hop,
            samples_seen: 0,
            phase: ProcessorPhase::Priming,
            config,
        }
    }

    /// Processes one block in place.
    ///
    /// Blocks longer than the configured block size are handled as
    /// consecutive chunks of that size; shorter blocks are processed as
    /// they are. An empty block does nothing.
    pub fn process(&mut self, block: &mut [f32]) {
        let block_size = self.config.block_size;
        for chunk in block.chunks_mut(block_size) {
            self.process_chunk(chunk);
        }
    }

    fn process_chunk(&mut self, chunk: &mut [f32]) {
        let hop = self.config.hop_size;
        let len = chunk.len();

        let mut offset = 0;
        while offset < len {
            let take = (len - offset).min(self.until_hop);
            for (dst, &src) in self.input_scratch[..take]
                .iter_mut()
                .zip(&chunk[offset..offset + take])
            {
                *dst = condition_sample(src);
            }
            self.history.slide_in(&self.input_scratch[..take]);
            self.until_hop -= take;
            offset += take;

            if self.until_hop == 0 {
                self.run_frame();
                self.until_hop = hop;
            }
        }

        let written = self.output.pop_slice(chunk);
        debug_assert_eq!(written, len, "output FIFO underrun");
        chunk[written..].fill(0.0);

        self.samples_seen = self.samples_seen.saturating_add(len as u64);
        if self.phase == ProcessorPhase::Priming
            && self.samples_seen >= self.config.latency_samples() as u64
        {
            self.phase = ProcessorPhase::Steady;
        }
    }

    /// Analyses the current window, transforms it, and overlap-adds one frame.
    fn run_frame(&mut self) {
        let pitch = self.pitch.step(self.params.pitch());
        let formant = self.formant.step(self.params.formant());

        self.history.peek_slice(&mut self.frame);
        let peak = self.frame.iter().fold(0.0f32, |m, &x| m.max(x.abs()));
        if peak < SILENCE_THRESHOLD {
            self.pitch_shifter.reset();
            self.finish_hop();
            return;
        }

        for ((bin, &x), &w) in self
            .spectrum
            .iter_mut()
            .zip(self.frame.iter())
            .zip(self.window.iter())
        {
            *bin = Complex::new(x * w, 0.0);
        }
        self.fft.forward(&mut self.spectrum);

        self.pitch_shifter.analyze(&self.spectrum);
        if pitch == 1.0 && formant == 1.0 {
            // Keep phase tracking current; the spectrum itself stays untouched.
            self.pitch_shifter.shift(1.0);
        } else {
            self.pitch_shifter.shift(pitch);
            self.formant_shifter.process(
                self.pitch_shifter.magnitudes(),
                self.pitch_shifter.shifted_magnitudes(),
                pitch != 1.0,
                formant,
                &mut self.magnitudes,
            );
            let phases = self.pitch_shifter.output_phases();
            for (bin, (&magnitude, &phase)) in self.magnitudes.iter().zip(phases).enumerate() {
                self.spectrum[bin] = Complex::from_polar(magnitude, phase);
            }
            mirror_spectrum(&mut self.spectrum);
        }

        self.fft.inverse(&mut self.spectrum);

        if self.spectrum.iter().any(|c| !c.re.is_finite()) {
            // Drop the frame rather than let it poison the accumulator.
            self.pitch_shifter.reset();
        } else {
            let scale = self.ola_gain / self.config.window_size as f32;
            for ((acc, c), &w) in self
                .overlap
                .iter_mut()
                .zip(self.spectrum.iter())
                .zip(self.window.iter())
            {
                *acc += c.re * scale * w;
            }
        }

        self.finish_hop();
    }

    /// Moves the first hop of the accumulator, now final, into the output
    /// FIFO and realigns the accumulator with the next frame.
    fn finish_hop(&mut self) {
        let hop = self.config.hop_size;
        for sample in &mut self.overlap[..hop] {
            *sample = condition_sample(*sample);
        }
        let pushed = self.output.push_slice(&self.overlap[..hop]);
        debug_assert_eq!(pushed, hop, "output FIFO overflow");
        self.overlap.copy_within(hop.., 0);
        let len = self.overlap.len();
        self.overlap[len - hop..].fill(0.0);
    }

    /// Sets the pitch ratio (2.0 = one octave up). Clamped, never fails.
    pub fn set_pitch(&self, ratio: f32) {
        self.params.set_pitch(ratio);
    }

    /// Sets the formant ratio (values above 1.0 shorten the apparent vocal
    /// tract). Clamped, never fails.
    pub fn set_formant(&self, ratio: f32) {
        self.params.set_formant(ratio);
    }

    /// Returns a handle that can set ratios from another thread.
    pub fn params(&self) -> ParamHandle {
        self.params.clone()
    }

    /// Pitch ratio currently applied, after smoothing.
    pub fn pitch_ratio(&self) -> f32 {
        self.pitch.value()
    }

    /// Formant ratio currently applied, after smoothing.
    pub fn formant_ratio(&self) -> f32 {
        self.formant.value()
    }

    /// Returns the configuration this processor was built with.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Returns the lifecycle phase.
    pub fn phase(&self) -> ProcessorPhase {
        self.phase
    }

    /// Returns true once a full analysis window of input has been seen.
    pub fn is_primed(&self) -> bool {
        self.phase == ProcessorPhase::Steady
    }

    /// Returns the fixed latency in samples.
    ///
    /// Output sample `t` is derived from input sample `t - latency_samples()`.
    pub fn latency_samples(&self) -> usize {
        self.config.latency_samples()
    }

    /// Returns the fixed latency in seconds.
    pub fn latency_secs(&self) -> f64 {
        self.latency_samples() as f64 / self.config.sample_rate as f64
    }
}

/// Replaces non-finite values with silence, saturates to
/// `±MAX_SAMPLE_MAGNITUDE`, and flushes subnormals to zero.
#[inline]
pub fn condition_sample(x: f32) -> f32 {
    if !x.is_finite() || x.abs() < f32::MIN_POSITIVE {
        return 0.0;
    }
    x.clamp(-MAX_SAMPLE_MAGNITUDE, MAX_SAMPLE_MAGNITUDE)
}
