//! `vitrine ask` — one-shot question through the full engine.
//!
//! This is also the in-repo reference for the client rendering contract:
//! citations become a labeled `Sources:` block, a refusal appends the fixed
//! hint, and a backend fault shows the fixed transport apology (distinct
//! from the refusal text — the two must never be conflated).

use std::sync::Arc;

use vitrine_chat::ChatEngine;
use vitrine_config::AppConfig;
use vitrine_core::chat::ChatRequest;
use vitrine_core::error::ChatError;
use vitrine_session::SessionStore;

/// Hint appended under a refused answer.
const REFUSAL_HINT: &str =
    "Try asking about a specific term from the site, such as \"rarity\" or \"print run\".";

/// Fixed apology for transport/backend failures.
const TRANSPORT_APOLOGY: &str =
    "There was an issue reaching the chat service. Please try again in a moment.";

pub async fn run(message: String, session: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    let pack = Arc::new(vitrine_knowledge::load_all(&config.knowledge.dir)?);
    let backend = vitrine_backends::build_from_config(&config)?;
    let sessions = Arc::new(SessionStore::new(config.session.cap));
    let engine = ChatEngine::new(backend, sessions, pack);

    let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let request = ChatRequest {
        session_id,
        message,
        page_context: None,
    };

    match engine.handle(&request).await {
        Ok(response) => {
            println!("{}", response.answer);

            if !response.citations.is_empty() {
                println!("\nSources:");
                for citation in &response.citations {
                    println!("- {}: \"{}\"", citation.source_id, citation.quote);
                }
            }

            if response.refused {
                println!("\n{REFUSAL_HINT}");
            }
        }
        Err(ChatError::InvalidRequest) => {
            eprintln!("A non-empty message is required.");
        }
        Err(ChatError::Upstream(e)) => {
            tracing::debug!(error = %e, "Backend call failed");
            eprintln!("{TRANSPORT_APOLOGY}");
        }
    }

    Ok(())
}
