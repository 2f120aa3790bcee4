//! Scripted backend for tests: replays queued replies and counts calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{LlmBackend, LlmError, LlmRequest, LlmResponse};

/// One queued reply.
pub enum Scripted {
    Reply(String),
    /// Reply after a delay, for ordering tests.
    Delayed(Duration, String),
    Fail(LlmError),
}

#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<LlmRequest>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(content: impl Into<String>) -> Self {
        Self::new().then(Scripted::Reply(content.into()))
    }

    pub fn failing(err: LlmError) -> Self {
        Self::new().then(Scripted::Fail(err))
    }

    pub fn then(self, reply: Scripted) -> Self {
        if let Ok(mut q) = self.replies.lock() {
            q.push_back(reply);
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut r) = self.requests.lock() {
            r.push(req);
        }
        let next = self.replies.lock().ok().and_then(|mut q| q.pop_front());
        let content = match next {
            Some(Scripted::Reply(content)) => content,
            Some(Scripted::Delayed(delay, content)) => {
                tokio::time::sleep(delay).await;
                content
            }
            Some(Scripted::Fail(err)) => return Err(err),
            None => return Err(LlmError::Unavailable("script exhausted".to_string())),
        };
        Ok(LlmResponse { content, model: "scripted".to_string(), prompt_tokens: 0, completion_tokens: 0 })
    }

    fn model_id(&self) -> &str { "scripted" }
    fn backend_name(&self) -> &str { "scripted" }
}
