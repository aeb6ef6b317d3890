//! Incremental consumer for the streaming endpoint
//!
//! Model stdout is newline-delimited free text with no other framing. Each
//! non-blank line becomes one [`StreamEvent::Chunk`]. A background task pumps
//! lines into a one-slot channel, so at most one line sits between the pipe
//! and the client and a dropped client is noticed on the next poll.

use super::collector::read_channel;
use super::process::describe_exit;
use super::{LlmError, ProcessHandle, ProcessLimits};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::pin::Pin;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;

/// One unit of streamed model output.
///
/// Ordering: one `Start`, any number of `Chunk`, at most one `Error`, then
/// `End`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Start,
    Chunk { text: String },
    Error { message: String },
    End,
}

impl StreamEvent {
    /// Wire payload carried in the SSE `data:` field
    pub fn to_json(&self) -> Value {
        match self {
            StreamEvent::Start => json!({ "start": true }),
            StreamEvent::Chunk { text } => json!({ "text": text }),
            StreamEvent::Error { message } => json!({ "error": message }),
            StreamEvent::End => json!({ "end": true }),
        }
    }

    fn error(error: &LlmError) -> Self {
        StreamEvent::Error {
            message: error.client_message(),
        }
    }
}

pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Stream a running model process.
///
/// Must be called within a tokio runtime; the pump runs as its own task and
/// always reaps the process, including after the consumer goes away. Output
/// still arriving at `deadline` is cut off with a timeout error.
pub fn emit(handle: ProcessHandle, limits: ProcessLimits, deadline: Instant) -> EventStream {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(pump(handle, tx, limits, deadline));
    Box::pin(ReceiverStream::new(rx))
}

/// Event sequence for an invocation that failed before producing output.
pub fn failed(error: &LlmError) -> EventStream {
    Box::pin(futures::stream::iter([
        StreamEvent::Start,
        StreamEvent::error(error),
        StreamEvent::End,
    ]))
}

/// How the stdout drain ended
enum Drained {
    Eof,
    Failed(LlmError),
    TimedOut,
    Disconnected,
}

async fn pump(
    mut handle: ProcessHandle,
    tx: mpsc::Sender<StreamEvent>,
    limits: ProcessLimits,
    deadline: Instant,
) {
    let pid = handle.pid();

    if tx.send(StreamEvent::Start).await.is_err() {
        handle.reap(limits.kill_grace).await;
        return;
    }

    let stderr = tokio::spawn(read_channel(handle.take_stderr()));
    let drained = match handle.take_stdout() {
        Some(stdout) => forward_lines(stdout, &tx, deadline).await,
        None => Drained::Failed(LlmError::io("model output channel unavailable")),
    };

    let error = match drained {
        Drained::Eof => match handle.reap(limits.kill_grace).await {
            Some(status) if !status.success() => {
                let text = diagnostics(stderr, limits.kill_grace).await;
                Some(LlmError::model_failure(if text.is_empty() {
                    describe_exit(status)
                } else {
                    text
                }))
            }
            _ => None,
        },
        Drained::Failed(e) => {
            handle.reap(limits.kill_grace).await;
            Some(e)
        }
        Drained::TimedOut => {
            handle.terminate().await;
            Some(LlmError::timeout(limits.timeout))
        }
        Drained::Disconnected => {
            tracing::debug!(pid = ?pid, "Stream consumer went away, reaping model process");
            handle.reap(limits.kill_grace).await;
            return;
        }
    };

    if let Some(e) = error {
        tracing::warn!(pid = ?pid, kind = e.kind.as_str(), error = %e, "Model stream failed");
        if tx.send(StreamEvent::error(&e)).await.is_err() {
            return;
        }
    }
    let _ = tx.send(StreamEvent::End).await;
}

async fn forward_lines<R>(output: R, tx: &mpsc::Sender<StreamEvent>, deadline: Instant) -> Drained
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(output).lines();

    loop {
        let line = tokio::select! {
            biased;
            () = tx.closed() => return Drained::Disconnected,
            () = tokio::time::sleep_until(deadline) => return Drained::TimedOut,
            line = lines.next_line() => line,
        };

        match line {
            Ok(Some(line)) => {
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }
                let chunk = StreamEvent::Chunk {
                    text: text.to_string(),
                };
                if tx.send(chunk).await.is_err() {
                    return Drained::Disconnected;
                }
            }
            Ok(None) => return Drained::Eof,
            Err(e) => {
                return Drained::Failed(LlmError::io(format!(
                    "failed to read model output: {e}"
                )))
            }
        }
    }
}

async fn diagnostics(task: JoinHandle<Result<String, LlmError>>, wait: Duration) -> String {
    match tokio::time::timeout(wait, task).await {
        Ok(Ok(Ok(text))) => text.trim().to_string(),
        _ => String::new(),
    }
}
