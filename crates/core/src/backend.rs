//! ChatBackend trait — the abstraction over generative backends.
//!
//! A backend forwards a trust-tagged turn sequence to a generative model,
//! preserving role and order, and returns the raw text of the reply. The raw
//! text carries no structural guarantee; coercing it into the response
//! contract is the parser's job, not the backend's.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::turn::Turn;

/// The model invoker abstraction.
///
/// Implementations: OpenAI-compatible endpoints, Anthropic's native Messages
/// API, and a scripted backend for tests and offline development.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// A human-readable name for this backend (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Send the turn sequence and return the raw reply text.
    async fn complete(&self, turns: &[Turn]) -> std::result::Result<String, BackendError>;
}
