//! Per-request orchestration.
//!
//! One request walks a fixed sequence: validate, load history, assemble the
//! prompt, invoke the backend, coerce the reply, record the exchange. The
//! two failure exits (invalid input, backend fault) both leave the session
//! untouched — a half-written exchange is never recorded.

use std::sync::Arc;

use tracing::{debug, error, warn};

use vitrine_core::chat::{ChatRequest, ChatResponse};
use vitrine_core::error::ChatError;
use vitrine_core::turn::Turn;
use vitrine_core::ChatBackend;
use vitrine_knowledge::KnowledgePack;
use vitrine_session::SessionStore;

use crate::assembler::PromptAssembler;
use crate::parser::parse_reply;

/// The gateway orchestrator: sequences one chat exchange end to end.
pub struct ChatEngine {
    backend: Arc<dyn ChatBackend>,
    sessions: Arc<SessionStore>,
    pack: Arc<KnowledgePack>,
    assembler: PromptAssembler,
}

impl ChatEngine {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        sessions: Arc<SessionStore>,
        pack: Arc<KnowledgePack>,
    ) -> Self {
        Self {
            backend,
            sessions,
            pack,
            assembler: PromptAssembler::new(),
        }
    }

    /// The loaded knowledge pack.
    pub fn knowledge(&self) -> &KnowledgePack {
        &self.pack
    }

    /// The session store backing this engine.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Run one exchange.
    ///
    /// Validation failures and backend faults return early without touching
    /// the session. Malformed backend output is not a failure: the parser
    /// degrades it into a plain answer and the exchange is recorded as
    /// usual.
    pub async fn handle(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        if request.session_id.is_empty() || request.message.trim().is_empty() {
            return Err(ChatError::InvalidRequest);
        }

        let history = self.sessions.history(&request.session_id).await;
        let turns = self.assembler.assemble(
            &history,
            &request.message,
            request.page_context.as_ref(),
            &self.pack,
        );

        debug!(
            session = %request.session_id,
            history_turns = history.len(),
            backend = %self.backend.name(),
            "Invoking chat backend"
        );

        let raw = self.backend.complete(&turns).await.map_err(|e| {
            error!(session = %request.session_id, error = %e, "Chat backend call failed");
            e
        })?;

        let outcome = parse_reply(&raw);
        if outcome.is_degraded() {
            warn!(
                session = %request.session_id,
                "Backend reply was not a JSON object; degraded to a plain answer"
            );
        }
        let response = outcome.into_response();

        for citation in &response.citations {
            if !self.pack.contains(&citation.source_id) {
                warn!(
                    session = %request.session_id,
                    source_id = %citation.source_id,
                    "Citation references an unknown knowledge document"
                );
            }
        }

        self.sessions
            .append_exchange(
                &request.session_id,
                Turn::user(&request.message),
                Turn::assistant(&response.answer),
            )
            .await;

        Ok(response)
    }
}
