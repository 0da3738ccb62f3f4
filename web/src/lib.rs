use voiceshift::{PitchDetector, ProcessorConfig, VoiceProcessor};
use wasm_bindgen::prelude::*;

/// WASM wrapper around the voiceshift VoiceProcessor for a mono AudioWorklet.
///
/// The JS side owns the handle and must call `free()` when the node is torn
/// down.
#[wasm_bindgen]
pub struct Processor {
    processor: VoiceProcessor,
}

#[wasm_bindgen]
impl Processor {
    /// Create a processor with the default configuration (128-sample blocks,
    /// 1024-sample window, 48 kHz).
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            processor: VoiceProcessor::new(),
        }
    }

    /// Create a processor for a context running at `sample_rate`.
    ///
    /// Only the reported latency in seconds depends on the rate.
    #[wasm_bindgen(js_name = withSampleRate)]
    pub fn with_sample_rate(sample_rate: u32) -> Result<Processor, JsError> {
        let config = ProcessorConfig::default().with_sample_rate(sample_rate);
        let processor = VoiceProcessor::with_config(config)?;
        Ok(Self { processor })
    }

    /// Shift one render quantum in place.
    pub fn process(&mut self, block: &mut [f32]) {
        self.processor.process(block);
    }

    #[wasm_bindgen(js_name = setPitch)]
    pub fn set_pitch(&self, ratio: f32) {
        self.processor.set_pitch(ratio);
    }

    #[wasm_bindgen(js_name = setFormant)]
    pub fn set_formant(&self, ratio: f32) {
        self.processor.set_formant(ratio);
    }

    /// Fixed delay between input and output, in samples.
    #[wasm_bindgen(js_name = latencySamples)]
    pub fn latency_samples(&self) -> usize {
        self.processor.latency_samples()
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the fundamental of a mono frame. Returns 0 for unvoiced input.
#[wasm_bindgen(js_name = detectPitch)]
pub fn detect_pitch(samples: &[f32], sample_rate: u32) -> f32 {
    PitchDetector::new(samples.len(), sample_rate)
        .detect(samples)
        .map_or(0.0, |est| est.frequency_hz)
}
