//! Mock implementations for testing
//!
//! Lets the HTTP layer be exercised without spawning model processes.

use super::{EventStream, LlmError, LlmService, Prompt, StreamEvent};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    streams: Mutex<VecDeque<Vec<StreamEvent>>>,
    model_id: String,
    /// Record of every prompt received
    pub prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            streams: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful completion
    pub fn queue_response(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue a failed completion
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Queue the full event sequence of one stream call
    pub fn queue_stream(&self, events: Vec<StreamEvent>) {
        self.streams.lock().unwrap().push_back(events);
    }

    /// Get recorded prompts
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::io("No mock response queued")))
    }

    async fn stream(&self, prompt: &Prompt) -> EventStream {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let events = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![StreamEvent::Start, StreamEvent::End]);
        Box::pin(futures::stream::iter(events))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
