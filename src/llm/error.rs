//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Failure of a single model invocation, classified by where it happened
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn spawn(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Spawn, message)
    }

    pub fn write(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Write, message)
    }

    pub fn model_failure(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ModelFailure, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Io, message)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            LlmErrorKind::Timeout,
            format!("model did not finish within {}s", after.as_secs()),
        )
    }

    /// Text shown to HTTP clients.
    ///
    /// Model failures carry the process diagnostics; everything else is a
    /// fault of the bridge itself.
    pub fn client_message(&self) -> String {
        match self.kind {
            LlmErrorKind::ModelFailure => format!("LLM Error: {}", self.message),
            _ => format!("Service error: {}", self.message),
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Executable missing or the OS refused to create the process
    Spawn,
    /// Prompt could not be written to the process input
    Write,
    /// Process exited non-zero; message holds its diagnostic output
    ModelFailure,
    /// Read fault on the output channels
    Io,
    /// Process exceeded the configured time bound and was terminated
    Timeout,
}

impl LlmErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spawn => "spawn",
            Self::Write => "write",
            Self::ModelFailure => "model_failure",
            Self::Io => "io",
            Self::Timeout => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_failure_client_message() {
        let err = LlmError::model_failure("model 'x' not found");
        assert_eq!(err.client_message(), "LLM Error: model 'x' not found");
    }

    #[test]
    fn test_service_error_client_message() {
        let err = LlmError::spawn("No such file or directory");
        assert_eq!(
            err.client_message(),
            "Service error: No such file or directory"
        );
        let err = LlmError::timeout(Duration::from_secs(30));
        assert_eq!(
            err.client_message(),
            "Service error: model did not finish within 30s"
        );
    }
}
