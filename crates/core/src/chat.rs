//! Wire contract types for the chat endpoint.
//!
//! These are the request and response bodies of `POST /chat`. Field names on
//! the wire are camelCase. The request fields default to empty strings when
//! absent so validation can answer with the fixed error body instead of a
//! framework-level deserialization failure.

use serde::{Deserialize, Serialize};

use crate::page::PageContext;

/// A chat request from the widget.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Opaque client-supplied session identifier
    #[serde(default)]
    pub session_id: String,

    /// The user's question — always treated as data, never as instructions
    #[serde(default)]
    pub message: String,

    /// Optional client-observed snapshot of the current page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_context: Option<PageContext>,
}

/// A (sourceId, quote) pair asserting which knowledge document supports part
/// of an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    /// Name of the cited knowledge document
    pub source_id: String,

    /// Short exact excerpt from that document
    pub quote: String,
}

/// The fixed response contract every request resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The answer text shown to the user
    pub answer: String,

    /// Supporting citations, possibly empty
    #[serde(default)]
    pub citations: Vec<Citation>,

    /// True when the answer is the fixed out-of-scope refusal
    #[serde(default)]
    pub refused: bool,
}
