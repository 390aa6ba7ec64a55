//! Completion engines for chatrelay.
//!
//! This crate provides:
//!
//! - **CompletionEngine**: the interface the relay uses to get the next
//!   assistant reply for a dialogue
//! - **OpenAiEngine**: a backend for OpenAI-compatible chat completion APIs
//! - **FailureKind**: coarse classification of completion failures

pub mod backend;
pub mod error;
pub mod openai;

pub use backend::CompletionEngine;
pub use error::{CompletionError, FailureKind, classify_message};
pub use openai::{OpenAiConfig, OpenAiEngine};
