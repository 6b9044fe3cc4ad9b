//! Error types for the Vitrine assistant domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type.

use std::path::PathBuf;

use thiserror::Error;

/// The top-level error type for Vitrine operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Backend errors ---
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    // --- Knowledge base errors ---
    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge directory {path}: {reason}")]
    ReadDir { path: PathBuf, reason: String },

    #[error("Failed to read knowledge document {path}: {reason}")]
    ReadDocument { path: PathBuf, reason: String },
}

/// Request-level failures of the chat orchestration.
///
/// Malformed model output is deliberately NOT here — it is coerced into a
/// well-formed response by the parser, never surfaced as an error. A policy
/// refusal is a normal success response and never an error either.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing sessionId, or message empty after trimming.
    /// Rejected before any session mutation.
    #[error("sessionId and message are required and must be non-empty")]
    InvalidRequest,

    /// The backend call failed. No partial exchange is recorded.
    #[error("Backend call failed: {0}")]
    Upstream(#[from] BackendError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_displays_status() {
        let err = Error::Backend(BackendError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn knowledge_error_displays_path() {
        let err = Error::Knowledge(KnowledgeError::ReadDir {
            path: PathBuf::from("/srv/knowledge"),
            reason: "permission denied".into(),
        });
        assert!(err.to_string().contains("/srv/knowledge"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn upstream_chat_error_wraps_backend_error() {
        let err = ChatError::from(BackendError::Network("connection refused".into()));
        assert!(matches!(err, ChatError::Upstream(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
