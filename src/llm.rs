//! Bridge to a local inference process
//!
//! Every call spawns one `ollama run <model>` process, writes the prompt to its
//! stdin and either buffers the whole answer or streams it line by line.

mod collector;
mod config;
mod error;
mod process;
mod prompt;
mod stream;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use collector::collect;
pub use config::{LlmConfig, ProcessLimits};
#[allow(unused_imports)] // Kind is matched on by callers and tests
pub use error::{LlmError, LlmErrorKind};
pub use process::{ProcessHandle, ProcessRunner};
pub use prompt::{build_prompt, ConversationTurn, Prompt};
pub use stream::{emit, EventStream, StreamEvent};

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio::time::Instant;

/// Common interface for model backends
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Run the model to completion and return its trimmed answer
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError>;

    /// Run the model and stream its answer.
    ///
    /// Failures are reported in-band, so the stream always starts with
    /// `Start` and ends with `End`.
    async fn stream(&self, prompt: &Prompt) -> EventStream;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Production backend driving the `ollama` executable
pub struct OllamaService {
    runner: ProcessRunner,
    model: String,
    limits: ProcessLimits,
}

impl OllamaService {
    pub fn new(config: &LlmConfig) -> Self {
        Self::with_runner(
            ProcessRunner::new(config.binary.clone()),
            config.model.clone(),
            config.limits,
        )
    }

    pub fn with_runner(
        runner: ProcessRunner,
        model: impl Into<String>,
        limits: ProcessLimits,
    ) -> Self {
        Self {
            runner,
            model: model.into(),
            limits,
        }
    }

    /// Spawn the process and hand it the prompt.
    ///
    /// A process that stops reading stdin is killed once `deadline` passes.
    async fn start(&self, prompt: &Prompt, deadline: Instant) -> Result<ProcessHandle, LlmError> {
        let mut handle = self.runner.spawn(&self.model)?;
        let sent = tokio::time::timeout_at(deadline, handle.send_prompt_and_close(prompt)).await;
        match sent {
            Ok(Ok(())) => Ok(handle),
            Ok(Err(e)) => {
                handle.reap(self.limits.kill_grace).await;
                Err(e)
            }
            Err(_) => {
                tracing::warn!(pid = ?handle.pid(), "Model process stopped reading its prompt");
                handle.terminate().await;
                Err(LlmError::timeout(self.limits.timeout))
            }
        }
    }
}

#[async_trait]
impl LlmService for OllamaService {
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let deadline = self.limits.deadline();
        let handle = self.start(prompt, deadline).await?;
        collect(handle, self.limits, deadline).await
    }

    async fn stream(&self, prompt: &Prompt) -> EventStream {
        let deadline = self.limits.deadline();
        match self.start(prompt, deadline).await {
            Ok(handle) => emit(handle, self.limits, deadline),
            Err(e) => stream::failed(&e),
        }
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let start = Instant::now();
        let result = self.inner.complete(prompt).await;
        let duration = start.elapsed();

        match &result {
            Ok(text) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    prompt_bytes = prompt.as_bytes().len(),
                    response_bytes = text.len(),
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    error = %e.message,
                    "LLM request failed"
                );
            }
        }

        result
    }

    async fn stream(&self, prompt: &Prompt) -> EventStream {
        let start = Instant::now();
        let model_id = self.model_id.clone();
        tracing::info!(
            model = %model_id,
            prompt_bytes = prompt.as_bytes().len(),
            "LLM stream started"
        );

        let mut chunks = 0usize;
        let events = self.inner.stream(prompt).await.inspect(move |event| match event {
            StreamEvent::Chunk { .. } => chunks += 1,
            StreamEvent::Error { message } => {
                tracing::error!(model = %model_id, error = %message, "LLM stream failed");
            }
            StreamEvent::End => {
                tracing::info!(
                    model = %model_id,
                    duration_ms = %start.elapsed().as_millis(),
                    chunks,
                    "LLM stream finished"
                );
            }
            StreamEvent::Start => {}
        });
        Box::pin(events)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
