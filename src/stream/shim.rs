//! Host-side glue between an audio-worklet style runtime and the processor.
//!
//! The runtime calls [`WorkletShim::process`] once per render quantum from
//! the audio thread. Control messages arrive asynchronously and only ever
//! touch the shared parameter handle, so they never block the audio thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::types::ProcessorConfig;
use crate::error::ShiftError;
use crate::shift::params::ParamHandle;
use crate::stream::processor::VoiceProcessor;

/// One-shot readiness signal. Once raised it stays raised.
#[derive(Debug, Clone, Default)]
pub struct ReadyFlag(Arc<AtomicBool>);

impl ReadyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Returns true if this call raised it.
    pub fn raise(&self) -> bool {
        !self.0.swap(true, Ordering::Release)
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Messages accepted on the control channel.
///
/// Serialized as JSON objects tagged by `type`, e.g.
/// `{"type":"setPitch","pitch":1.5}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ControlMessage {
    Initialize,
    SetPitch { pitch: f32 },
    SetFormant { formant: f32 },
}

impl ControlMessage {
    /// Parses a control message from JSON.
    pub fn from_json(text: &str) -> Result<Self, ShiftError> {
        serde_json::from_str(text)
            .map_err(|e| ShiftError::InvalidInput(format!("control message: {}", e)))
    }
}

/// Owns a [`VoiceProcessor`] and adapts it to a pull-style render callback.
pub struct WorkletShim {
    config: ProcessorConfig,
    params: ParamHandle,
    ready: ReadyFlag,
    processor: Option<VoiceProcessor>,
}

impl WorkletShim {
    /// Creates a shim that will build its processor from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::InvalidConfig`] if `config` is invalid, so a
    /// later [`initialize`](Self::initialize) cannot fail.
    pub fn new(config: ProcessorConfig) -> Result<Self, ShiftError> {
        config.validate()?;
        Ok(Self {
            config,
            params: ParamHandle::default(),
            ready: ReadyFlag::new(),
            processor: None,
        })
    }

    /// Builds the processor and raises the ready flag. Calling it again has
    /// no effect.
    pub fn initialize(&mut self) {
        if self.processor.is_some() {
            return;
        }
        match VoiceProcessor::with_params(self.config.clone(), self.params.clone()) {
            Ok(processor) => {
                log::info!(
                    "worklet processor ready, latency {} samples",
                    processor.latency_samples()
                );
                self.processor = Some(processor);
                self.ready.raise();
            }
            // Unreachable after the check in `new`.
            Err(err) => log::error!("failed to initialize processor: {}", err),
        }
    }

    /// Applies one control message.
    ///
    /// Parameter messages are accepted before initialization too; the
    /// processor picks them up when it is built.
    pub fn handle_message(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::Initialize => self.initialize(),
            ControlMessage::SetPitch { pitch } => self.params.set_pitch(pitch),
            ControlMessage::SetFormant { formant } => self.params.set_formant(formant),
        }
    }

    /// Render callback. Always returns true so the node stays alive.
    ///
    /// With no input the output is left untouched. Before initialization the
    /// input is copied straight through.
    pub fn process(&mut self, input: Option<&[f32]>, output: &mut [f32]) -> bool {
        let Some(input) = input else {
            return true;
        };
        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        if let Some(processor) = self.processor.as_mut() {
            processor.process(&mut output[..n]);
        }
        true
    }

    /// Handle for setting parameters from another thread.
    pub fn params(&self) -> ParamHandle {
        self.params.clone()
    }

    /// Readiness flag shared with the host.
    pub fn ready(&self) -> ReadyFlag {
        self.ready.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    /// Processor latency, or 0 before initialization.
    pub fn latency_samples(&self) -> usize {
        self.processor
            .as_ref()
            .map_or(0, VoiceProcessor::latency_samples)
    }
}
