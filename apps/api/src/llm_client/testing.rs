//! Deterministic `CompletionService` for tests: answers every call with one scripted
//! outcome and records the requests it receives.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, CompletionService, LlmError};

enum Outcome {
    Reply(String),
    Fail(u16),
}

pub struct ScriptedCompletion {
    outcome: Outcome,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    fn with(outcome: Outcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(content: &str) -> Self {
        Self::with(Outcome::Reply(content.to_string()))
    }

    /// Fails every call with an API error carrying `status`.
    pub fn failing(status: u16) -> Self {
        Self::with(Outcome::Fail(status))
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.outcome {
            Outcome::Reply(content) => Ok(CompletionResponse {
                content: content.clone(),
            }),
            Outcome::Fail(status) => Err(LlmError::Api {
                status: *status,
                message: "scripted failure".to_string(),
            }),
        }
    }
}
