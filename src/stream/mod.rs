//! Streaming processing for live input.

pub mod processor;
pub mod shim;

pub use processor::VoiceProcessor;
pub use shim::{ControlMessage, ReadyFlag, WorkletShim};
