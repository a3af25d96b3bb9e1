//! Child process handling for the external message client
//!
//! Every attempt against the message client owns exactly one
//! [`MessageProcess`]. The handle waits for the child with a deadline and
//! always terminates it afterwards: on success, on timeout, on error, and
//! again on drop if an attempt is abandoned mid-flight.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Configuration for one message client invocation
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Path to the message client executable
    pub program: PathBuf,

    /// Working directory (the client's installation directory)
    pub working_dir: PathBuf,

    /// Arguments to pass to the executable
    pub args: Vec<String>,
}

/// What happened while waiting on the child
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The child exited; captured standard output
    Completed(Vec<u8>),

    /// The deadline passed before the child finished
    DeadlineExpired,
}

/// Scoped handle to a running message client process
pub struct MessageProcess {
    child: Child,
    program: PathBuf,
}

impl MessageProcess {
    /// Spawn the executable with stdout captured
    pub fn spawn(config: &ProcessConfig) -> Result<Self> {
        debug!(
            "Spawning {:?} in {:?} with args {:?}",
            config.program, config.working_dir, config.args
        );

        let child = Command::new(&config.program)
            .current_dir(&config.working_dir)
            .args(&config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", config.program.display()))?;

        Ok(Self {
            child,
            program: config.program.clone(),
        })
    }

    /// Get the process ID, if the child has not been reaped yet
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait up to `deadline` for the child to close stdout and exit
    ///
    /// Output is read concurrently with the wait so a chatty child can never
    /// block on a full pipe. The child is left running when the deadline
    /// expires; call [`MessageProcess::terminate`] afterwards.
    pub async fn wait_with_deadline(&mut self, deadline: Duration) -> Result<WaitOutcome> {
        let mut stdout = self
            .child
            .stdout
            .take()
            .context("Child stdout was not captured")?;
        let child = &mut self.child;

        let collect = async move {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).await?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((buf, status))
        };

        match tokio::time::timeout(deadline, collect).await {
            Ok(Ok((buf, status))) => {
                debug!("{} exited with {}", self.program.display(), status);
                Ok(WaitOutcome::Completed(buf))
            }
            Ok(Err(e)) => Err(e)
                .with_context(|| format!("Failed while waiting on {}", self.program.display())),
            Err(_) => Ok(WaitOutcome::DeadlineExpired),
        }
    }

    /// Kill the child (if still alive) and reap it
    pub async fn terminate(&mut self) {
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }

        if let Err(e) = self.child.start_kill() {
            warn!("Failed to kill {}: {}", self.program.display(), e);
            return;
        }
        let _ = self.child.wait().await;
    }
}

impl Drop for MessageProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            debug!("Killing abandoned child {:?}", self.child.id());
            let _ = self.child.start_kill();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ProcessConfig {
        ProcessConfig {
            program: PathBuf::from("/bin/sh"),
            working_dir: std::env::temp_dir(),
            args: vec!["-c".to_string(), script.to_string()],
        }
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let mut process = MessageProcess::spawn(&sh("echo hello")).unwrap();
        let outcome = process.wait_with_deadline(Duration::from_secs(5)).await.unwrap();
        process.terminate().await;

        assert_eq!(outcome, WaitOutcome::Completed(b"hello\n".to_vec()));
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let mut process = MessageProcess::spawn(&sh("exec sleep 10")).unwrap();
        let outcome = process
            .wait_with_deadline(Duration::from_millis(200))
            .await
            .unwrap();
        process.terminate().await;

        assert_eq!(outcome, WaitOutcome::DeadlineExpired);
        assert!(process.child.try_wait().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_spawn_nonexistent_program() {
        let config = ProcessConfig {
            program: PathBuf::from("/nonexistent/message-client-123456"),
            working_dir: std::env::temp_dir(),
            args: vec![],
        };

        assert!(MessageProcess::spawn(&config).is_err());
    }
}
