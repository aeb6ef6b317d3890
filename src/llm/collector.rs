//! Full-buffering consumer for blocking endpoints

use super::process::describe_exit;
use super::{LlmError, ProcessHandle, ProcessLimits};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::Instant;

/// Drain a model process and return its trimmed output.
///
/// The process is terminated if it has not finished by `deadline`.
///
/// All-or-nothing: a non-zero exit yields the diagnostic text as a
/// `ModelFailure`, never the partial stdout. stdout and stderr are drained
/// together so a chatty stderr cannot stall the child on a full pipe.
pub async fn collect(
    mut handle: ProcessHandle,
    limits: ProcessLimits,
    deadline: Instant,
) -> Result<String, LlmError> {
    let stdout = handle.take_stdout();
    let stderr = handle.take_stderr();

    let outcome = tokio::time::timeout_at(deadline, drain(&mut handle, stdout, stderr)).await;
    match outcome {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => {
            handle.reap(limits.kill_grace).await;
            Err(e)
        }
        Err(_) => {
            handle.terminate().await;
            Err(LlmError::timeout(limits.timeout))
        }
    }
}

async fn drain<O, E>(
    handle: &mut ProcessHandle,
    stdout: Option<O>,
    stderr: Option<E>,
) -> Result<String, LlmError>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let (output, diagnostics) = tokio::try_join!(read_channel(stdout), read_channel(stderr))?;
    let status = handle.wait().await?;

    if !status.success() {
        let diagnostics = diagnostics.trim();
        let message = if diagnostics.is_empty() {
            describe_exit(status)
        } else {
            diagnostics.to_string()
        };
        return Err(LlmError::model_failure(message));
    }

    Ok(output.trim().to_string())
}

pub(super) async fn read_channel<R>(channel: Option<R>) -> Result<String, LlmError>
where
    R: AsyncRead + Unpin,
{
    let Some(mut channel) = channel else {
        return Ok(String::new());
    };
    let mut buf = Vec::new();
    channel
        .read_to_end(&mut buf)
        .await
        .map_err(|e| LlmError::io(format!("failed to read model output: {e}")))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
