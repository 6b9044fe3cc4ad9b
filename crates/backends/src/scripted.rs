//! Scripted backend — canned replies for tests and offline development.
//!
//! Replies are returned in sequence; the last reply repeats once the queue
//! runs out, so a single-reply script behaves like a fixed backend.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use vitrine_core::error::BackendError;
use vitrine_core::turn::Turn;
use vitrine_core::ChatBackend;

/// A backend that replays scripted replies instead of calling a model.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    failure: Option<BackendError>,
    calls: Mutex<usize>,
    requests: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedBackend {
    /// A backend that returns the given replies in order, repeating the last.
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            failure: None,
            calls: Mutex::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A backend that always returns one fixed reply.
    pub fn fixed(reply: &str) -> Self {
        Self::new(vec![reply.to_string()])
    }

    /// A backend whose every call fails with the given error.
    pub fn failing(error: BackendError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            failure: Some(error),
            calls: Mutex::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// How many times `complete` was called.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The turn sequences received so far, in call order.
    pub fn requests(&self) -> Vec<Vec<Turn>> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, turns: &[Turn]) -> Result<String, BackendError> {
        *self.calls.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(turns.to_vec());

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let mut replies = self.replies.lock().unwrap_or_else(|e| e.into_inner());
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(reply) = replies.pop_front() {
            *last = Some(reply.clone());
            return Ok(reply);
        }

        Ok(last.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_sequence_then_repeats_last() {
        let backend = ScriptedBackend::new(vec!["one".into(), "two".into()]);
        assert_eq!(backend.complete(&[]).await.unwrap(), "one");
        assert_eq!(backend.complete(&[]).await.unwrap(), "two");
        assert_eq!(backend.complete(&[]).await.unwrap(), "two");
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn failing_backend_always_errors() {
        let backend = ScriptedBackend::failing(BackendError::Network("boom".into()));
        let err = backend.complete(&[Turn::user("hi")]).await.err().unwrap();
        assert!(matches!(err, BackendError::Network(_)));
    }

    #[tokio::test]
    async fn records_received_turn_sequences() {
        let backend = ScriptedBackend::fixed("ok");
        backend
            .complete(&[Turn::system("policy"), Turn::user("question")])
            .await
            .unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].len(), 2);
        assert_eq!(requests[0][1].content, "question");
    }
}
