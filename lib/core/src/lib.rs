//! Core types and utilities for chatrelay.
//!
//! This crate provides the identifier types and error handling foundation
//! shared by the conversation store, the completion engine, the messaging
//! channel and the relay orchestrator.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{RelayId, ReplyToken, UserId};
