//! Model process lifecycle
//!
//! One child per invocation, started as `<binary> run <model>` with all three
//! standard channels piped. The prompt goes in on stdin, which is then closed;
//! the answer comes back on stdout and diagnostics on stderr. Nothing is pooled
//! or retried.
//!
//! Each child leads its own process group so that a forced termination also
//! reaches anything it spawned.

use super::{LlmError, Prompt};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};

#[cfg(unix)]
use nix::sys::signal::{killpg, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Launches model processes
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments inserted before `run <model>`.
    #[allow(dead_code)] // Tests drive `sh -c` stand-ins through this
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Start one model process.
    pub fn spawn(&self, model: &str) -> Result<ProcessHandle, LlmError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .arg("run")
            .arg(model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Lead a new process group so kill(-pgid) reaches descendants
        #[cfg(unix)]
        unsafe {
            cmd.pre_exec(|| {
                nix::unistd::setpgid(Pid::from_raw(0), Pid::from_raw(0)).ok();
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(|e| {
            LlmError::spawn(format!(
                "failed to start {}: {e}",
                self.program.display()
            ))
        })?;

        let pid = child.id();
        tracing::debug!(pid = ?pid, model, "Spawned model process");

        Ok(ProcessHandle {
            stdin: child.stdin.take(),
            stdout: child.stdout.take(),
            stderr: child.stderr.take(),
            child,
            pid,
        })
    }
}

/// A live model process and its channels.
///
/// Owned by exactly one request. Pipes are handed out once via the `take_*`
/// methods; the exit status is observed through [`ProcessHandle::wait`] or
/// [`ProcessHandle::reap`].
pub struct ProcessHandle {
    child: Child,
    pid: Option<u32>,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl ProcessHandle {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Write the whole prompt, then close stdin so the model sees EOF.
    pub async fn send_prompt_and_close(&mut self, prompt: &Prompt) -> Result<(), LlmError> {
        let mut stdin = self
            .stdin
            .take()
            .ok_or_else(|| LlmError::write("process input already closed"))?;

        stdin
            .write_all(prompt.as_bytes())
            .await
            .map_err(|e| LlmError::write(format!("failed to write prompt: {e}")))?;
        stdin
            .flush()
            .await
            .map_err(|e| LlmError::write(format!("failed to write prompt: {e}")))?;

        Ok(())
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Block until the process exits.
    pub async fn wait(&mut self) -> Result<ExitStatus, LlmError> {
        drop(self.stdin.take());
        self.child
            .wait()
            .await
            .map_err(|e| LlmError::io(format!("failed to wait for model process: {e}")))
    }

    /// Wait up to `grace` for a voluntary exit, then terminate.
    ///
    /// Returns the exit status when the process exited on its own.
    pub async fn reap(&mut self, grace: Duration) -> Option<ExitStatus> {
        let outcome = tokio::time::timeout(grace, self.wait()).await;
        match outcome {
            Ok(Ok(status)) => Some(status),
            Ok(Err(e)) => {
                tracing::warn!(pid = ?self.pid, error = %e, "Failed to reap model process");
                self.terminate().await;
                None
            }
            Err(_) => {
                tracing::warn!(
                    pid = ?self.pid,
                    grace_ms = %grace.as_millis(),
                    "Model process did not exit in time, terminating"
                );
                self.terminate().await;
                None
            }
        }
    }

    /// Kill the process group with SIGKILL and reap the child.
    pub async fn terminate(&mut self) {
        if matches!(self.child.try_wait(), Ok(Some(_))) {
            return;
        }
        Self::kill_process_group(self.pid);
        if let Err(e) = self.child.kill().await {
            tracing::debug!(pid = ?self.pid, error = %e, "Kill after group signal failed");
        }
    }

    #[cfg(unix)]
    fn kill_process_group(pid: Option<u32>) {
        let Some(pid) = pid else { return };
        let pgid = Pid::from_raw(pid.cast_signed());
        tracing::debug!(pgid = pid, "Sending SIGKILL to process group");
        let _ = killpg(pgid, Signal::SIGKILL);
    }

    #[cfg(not(unix))]
    fn kill_process_group(_pid: Option<u32>) {}
}

/// Human readable form of a non-success exit.
pub fn describe_exit(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("model process exited with code {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("model process killed by signal {signal}");
        }
    }
    "model process exited abnormally".to_string()
}
