//! Completion engine abstraction.
//!
//! The relay hands a normalized dialogue to an engine and gets the next
//! assistant reply back. Engines never see or mutate the session store.

use crate::error::CompletionError;
use async_trait::async_trait;
use chatrelay_conversation::Turn;
use std::sync::Arc;

/// Trait for completion engines.
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// Produces the next assistant reply for the given dialogue.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine could not produce a reply.
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError>;

    /// Returns the model name, for logging.
    fn model(&self) -> &str;
}

#[async_trait]
impl<T: CompletionEngine + ?Sized> CompletionEngine for Arc<T> {
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
        (**self).complete(turns).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
