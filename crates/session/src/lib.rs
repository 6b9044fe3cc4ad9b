//! Bounded, append-only session store.
//!
//! Sessions are keyed by an opaque client-supplied id and live only in
//! process memory — a restart destroys them. Each session is an ordered turn
//! list capped at a fixed length; once the cap is exceeded the oldest turns
//! are evicted first.
//!
//! Concurrency: requests on different ids need no coordination. Requests on
//! the same id serialize their appends through a per-session mutex, so an
//! exchange's two turns land adjacently and eviction never loses an update.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use vitrine_core::turn::Turn;

/// Default maximum number of turns kept per session.
pub const DEFAULT_CAP: usize = 20;

type SessionHandle = Arc<Mutex<Vec<Turn>>>;

/// Keyed, bounded, append-only conversation history, shared across
/// concurrent requests.
pub struct SessionStore {
    cap: usize,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    /// Create a store with the given per-session turn cap.
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store with the default cap.
    pub fn with_default_cap() -> Self {
        Self::new(DEFAULT_CAP)
    }

    /// The configured per-session turn cap.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Return this session's turns in chronological order, creating an empty
    /// session if the id has never been seen.
    pub async fn history(&self, id: &str) -> Vec<Turn> {
        let handle = self.handle(id).await;
        let turns = handle.lock().await;
        turns.clone()
    }

    /// Append one turn, then trim to the last `cap` entries.
    pub async fn append(&self, id: &str, turn: Turn) {
        let handle = self.handle(id).await;
        let mut turns = handle.lock().await;
        turns.push(turn);
        Self::trim(&mut turns, self.cap);
    }

    /// Append both turns of a completed exchange under a single per-session
    /// critical section, so concurrent exchanges on the same id cannot
    /// interleave.
    pub async fn append_exchange(&self, id: &str, user: Turn, assistant: Turn) {
        let handle = self.handle(id).await;
        let mut turns = handle.lock().await;
        turns.push(user);
        turns.push(assistant);
        Self::trim(&mut turns, self.cap);
        debug!(session = %id, turns = turns.len(), "Exchange recorded");
    }

    /// Number of turns currently stored for this id. Does not create the
    /// session.
    pub async fn len(&self, id: &str) -> usize {
        let handle = { self.sessions.read().await.get(id).cloned() };
        match handle {
            Some(handle) => handle.lock().await.len(),
            None => 0,
        }
    }

    /// Number of sessions currently tracked.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Get or lazily create the handle for a session id.
    async fn handle(&self, id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(id) {
            return handle.clone();
        }
        let mut sessions = self.sessions.write().await;
        sessions.entry(id.to_string()).or_default().clone()
    }

    fn trim(turns: &mut Vec<Turn>, cap: usize) {
        if turns.len() > cap {
            let excess = turns.len() - cap;
            turns.drain(..excess);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_default_cap()
    }
}
