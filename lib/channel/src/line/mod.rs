//! LINE Messaging API integration.
//!
//! - Webhook signature verification and payload decoding (inbound)
//! - Reply and push delivery (outbound)

pub mod client;
pub mod signature;
pub mod webhook;

pub use client::{LineClient, LineConfig};
pub use signature::{SIGNATURE_HEADER, sign, verify};
pub use webhook::WebhookPayload;
