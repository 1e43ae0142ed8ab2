//! Shared fixtures for tool and server tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use uid_config::Settings;
use uid_gemini::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerativeApi, Part,
};
use uid_scheduler::ResilientExecutor;

use crate::context::ToolContext;

/// Records every request and answers from a queue, then with `fallback`.
pub(crate) struct StubApi {
    calls: Mutex<Vec<(String, GenerateContentRequest)>>,
    queued: Mutex<VecDeque<Result<GenerateContentResponse>>>,
    fallback: GenerateContentResponse,
}

impl StubApi {
    pub(crate) fn answering(text: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            queued: Mutex::new(VecDeque::new()),
            fallback: response(vec![Part::text(text)]),
        }
    }

    pub(crate) fn push(&self, result: Result<GenerateContentResponse>) {
        self.queued.lock().unwrap().push_back(result);
    }

    pub(crate) fn calls(&self) -> Vec<(String, GenerateContentRequest)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn models(&self) -> Vec<String> {
        self.calls().into_iter().map(|(model, _)| model).collect()
    }
}

#[async_trait]
impl GenerativeApi for StubApi {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));
        match self.queued.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(self.fallback.clone()),
        }
    }
}

pub(crate) fn response(parts: Vec<Part>) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(Content { role: Some("model".into()), parts }),
            finish_reason: Some("STOP".into()),
        }],
    }
}

/// Settings with pacing and backoff shrunk so tests run in real time.
pub(crate) fn fast_settings() -> Settings {
    let mut settings = Settings::default();
    settings.resilience.min_request_interval_ms = 0;
    settings.resilience.initial_retry_delay_ms = 1;
    settings
}

pub(crate) fn context(api: Arc<StubApi>, root: &Path) -> ToolContext {
    let settings = fast_settings();
    ToolContext::new(
        Arc::new(ResilientExecutor::from_settings(&settings)),
        api,
        root,
        settings.resilience.image_deadline(),
    )
}
