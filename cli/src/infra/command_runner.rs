//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill on all platforms.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::application::ports::CommandRunner;

/// Default timeout for git commands run during deployment.
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(600);

/// Where a child's output is echoed while it is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    /// Forward stdout to our stdout and stderr to our stderr.
    Console,
    /// Capture only.
    Silent,
}

/// Production `CommandRunner`. Uses tokio for async process execution
/// with guaranteed timeout and kill on all platforms.
///
/// Both pipes are drained concurrently with `child.wait()`, so a child that
/// fills one pipe while we read the other can never stall.
pub struct TokioCommandRunner {
    timeout: Duration,
    echo: Echo,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            echo: Echo::Console,
        }
    }

    #[must_use]
    pub fn with_echo(mut self, echo: Echo) -> Self {
        self.echo = echo;
        self
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<Output> {
        self.run_in_with_timeout(dir, program, args, self.timeout)
            .await
    }

    async fn run_in_with_timeout(
        &self,
        dir: &Path,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();
        let echo = self.echo == Echo::Console;

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    drain(stdout_handle, echo.then(tokio::io::stdout)),
                    drain(stderr_handle, echo.then(tokio::io::stderr)),
                );
                Ok(Output {
                    status: status.with_context(|| format!("waiting for {program}"))?,
                    stdout: stdout.with_context(|| format!("reading {program} stdout"))?,
                    stderr: stderr.with_context(|| format!("reading {program} stderr"))?,
                })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
            }
        }
    }
}

/// Read `source` to EOF, forwarding each chunk to `sink` as it arrives.
async fn drain<R, W>(source: Option<R>, mut sink: Option<W>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut captured = Vec::new();
    let Some(mut source) = source else {
        return Ok(captured);
    };
    let mut buf = [0u8; 8192];
    loop {
        let n = source.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        captured.extend_from_slice(&buf[..n]);
        if let Some(out) = sink.as_mut() {
            // A closed console must not abort the child, so echo errors are dropped.
            if out.write_all(&buf[..n]).await.is_ok() {
                let _ = out.flush().await;
            }
        }
    }
    Ok(captured)
}
