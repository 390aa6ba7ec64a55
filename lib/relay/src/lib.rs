//! Relay orchestration for chatrelay.
//!
//! This crate provides:
//!
//! - **RelayOrchestrator**: runs one inbound message through the session
//!   store, the completion engine and the messaging channel
//! - **RelayConfig**: the settings the relay core consumes
//! - **Fallback replies**: fixed user-facing messages for failed completions

pub mod config;
pub mod error;
pub mod fallback;
pub mod orchestrator;

pub use config::{DEFAULT_SYSTEM_INSTRUCTION, RelayConfig};
pub use error::RelayConfigError;
pub use fallback::fallback_reply;
pub use orchestrator::{RelayOrchestrator, RelayOutcome, RelayState};
