// Retrying client around the external message client executable

use crate::msgclient::command::CommandLine;
use crate::msgclient::policy::RetryPolicy;
use crate::msgclient::result::{classify_output, InvocationResult, Outcome};
use crate::msgclient::timestamp::{self, timestamp_key};
use crate::process::{MessageProcess, ProcessConfig, WaitOutcome};
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Host and port of the peer the message client talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: String,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

/// Where to find the executable and which defaults to use
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Path to the message client executable
    pub executable: PathBuf,

    /// Directory to run it in (defaults to the executable's directory)
    pub working_dir: Option<PathBuf>,

    /// Retry settings used when a call does not bring its own
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            working_dir: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Errors raised outside the retry loop
///
/// Failed or timed-out invocations are never errors; they come back as
/// [`Outcome`] values.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("message client executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[error("failed to prepare {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Client for one endpoint of the external message client
#[derive(Debug, Clone)]
pub struct RemoteMessageClient {
    endpoint: Endpoint,
    executable: PathBuf,
    working_dir: PathBuf,
    retry: RetryPolicy,
}

impl RemoteMessageClient {
    /// Create a client, checking up front that the executable exists
    pub fn new(endpoint: Endpoint, config: ClientConfig) -> Result<Self, ClientError> {
        let executable = std::fs::canonicalize(&config.executable)
            .ok()
            .filter(|p| p.is_file())
            .ok_or_else(|| ClientError::ExecutableNotFound(config.executable.clone()))?;

        let working_dir = match config.working_dir {
            Some(dir) => dir,
            None => executable
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        info!(
            "Message client ready: {} -> {}:{}",
            executable.display(),
            endpoint.host(),
            endpoint.port()
        );

        Ok(Self {
            endpoint,
            executable,
            working_dir,
            retry: config.retry,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Default retry policy for calls that do not pass one
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Run a command, retrying until it succeeds or attempts run out
    ///
    /// Spawns the executable at most `policy.max_attempts()` times and
    /// returns on the first success. Exhaustion yields `Failed("")`.
    pub async fn invoke(&self, command: &CommandLine, policy: RetryPolicy) -> InvocationResult {
        let max_attempts = policy.max_attempts();

        for attempt in 1..=max_attempts {
            let outcome = self.attempt(command, policy.timeout()).await;
            match outcome {
                Outcome::Success(_) => return InvocationResult::new(outcome),
                Outcome::TimedOut => {
                    error!("Attempt {}/{} timed out: {}", attempt, max_attempts, command)
                }
                Outcome::Failed(_) => {
                    error!("Attempt {}/{} failed: {}", attempt, max_attempts, command)
                }
            }
        }

        error!("Exceeded max attempts ({}): {}", max_attempts, command);
        InvocationResult::exhausted()
    }

    /// One spawn-wait-classify cycle
    async fn attempt(&self, command: &CommandLine, timeout: Duration) -> Outcome {
        let config = ProcessConfig {
            program: self.executable.clone(),
            working_dir: self.working_dir.clone(),
            args: command.argv(&self.endpoint),
        };

        let mut process = match MessageProcess::spawn(&config) {
            Ok(process) => process,
            Err(e) => {
                error!("Failed to run message client: {:#}", e);
                return Outcome::Failed(format!("{:#}", e));
            }
        };

        let waited = process.wait_with_deadline(timeout).await;
        process.terminate().await;

        match waited {
            Ok(WaitOutcome::Completed(stdout)) => {
                let output = String::from_utf8_lossy(&stdout);
                let outcome = classify_output(&output);
                if matches!(outcome, Outcome::Failed(_)) {
                    warn!("Message client reported a failure:");
                    warn!("{}", output.trim_end());
                }
                outcome
            }
            Ok(WaitOutcome::DeadlineExpired) => {
                error!("Message client timed out after {:?}", timeout);
                Outcome::TimedOut
            }
            Err(e) => {
                error!("Failed to run message client: {:#}", e);
                Outcome::Failed(format!("{:#}", e))
            }
        }
    }

    /// Upload a file under `key`, optionally publishing `dt#key`
    pub async fn send_file(
        &self,
        key: &str,
        path: &Path,
        policy: Option<RetryPolicy>,
        with_timestamp: bool,
    ) -> InvocationResult {
        let command = CommandLine::send_file(key, &path.to_string_lossy());
        info!("{}", command);

        let result = self.invoke(&command, policy.unwrap_or(self.retry)).await;
        if with_timestamp && result.is_success() {
            self.publish_timestamp(key).await;
        }
        result
    }

    /// Publish a message under `key`, optionally publishing `dt#key`
    pub async fn send_message(
        &self,
        key: &str,
        message: &str,
        policy: Option<RetryPolicy>,
        with_timestamp: bool,
    ) -> InvocationResult {
        let command = CommandLine::send_message(key, message);
        info!("{}", command);

        let result = self.invoke(&command, policy.unwrap_or(self.retry)).await;
        if with_timestamp && result.is_success() {
            self.publish_timestamp(key).await;
        }
        result
    }

    /// Send the current time under `dt#key`; failures are only logged
    async fn publish_timestamp(&self, key: &str) {
        let command = CommandLine::send_message(&timestamp_key(key), &timestamp::now_formatted());
        info!("{}", command);

        if !self.invoke(&command, self.retry).await.is_success() {
            error!("Failed to send timestamp key for {}", key);
        }
    }

    /// Read `dt#key` and return it if it is at most `max_age_secs` old
    pub async fn get_timestamp(&self, key: &str, max_age_secs: i64) -> Option<NaiveDateTime> {
        let command = CommandLine::get_message(&timestamp_key(key));
        info!("{}", command);

        let result = self.invoke(&command, self.retry).await;
        let Some(raw) = result.payload() else {
            error!("Failed to get timestamp for {}", key);
            return None;
        };

        let Some(stamp) = timestamp::parse_timestamp(raw) else {
            error!("Malformed timestamp for {}: {:?}", key, raw);
            return None;
        };

        let formatted = timestamp::format_timestamp(&stamp);
        if timestamp::is_fresh(&stamp, &Local::now().naive_local(), max_age_secs) {
            info!("Timestamp for {} is fresh: {}", key, formatted);
            Some(stamp)
        } else {
            info!("Timestamp for {} is stale: {}", key, formatted);
            None
        }
    }

    /// Download the file under `key` to `output_path`
    ///
    /// The parent directory is created if needed. With a freshness gap the
    /// transfer only happens when `dt#key` is recent enough; otherwise
    /// `Ok(None)` is returned without running the download.
    pub async fn get_file(
        &self,
        key: &str,
        output_path: &Path,
        policy: Option<RetryPolicy>,
        freshness_gap: Option<i64>,
    ) -> Result<Option<InvocationResult>, ClientError> {
        let output_path = absolute(output_path)?;
        if let Some(parent) = output_path.parent() {
            if !parent.is_dir() {
                std::fs::create_dir_all(parent).map_err(|source| ClientError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let command = CommandLine::get_file(key, &output_path.to_string_lossy());
        info!("{}", command);

        if let Some(gap) = freshness_gap {
            if self.get_timestamp(key, gap).await.is_none() {
                return Ok(None);
            }
        }

        Ok(Some(self.invoke(&command, policy.unwrap_or(self.retry)).await))
    }

    /// Read the message under `key`, gated on `dt#key` when a gap is given
    pub async fn get_message(
        &self,
        key: &str,
        policy: Option<RetryPolicy>,
        freshness_gap: Option<i64>,
    ) -> Option<InvocationResult> {
        let command = CommandLine::get_message(key);
        info!("{}", command);

        if let Some(gap) = freshness_gap {
            self.get_timestamp(key, gap).await?;
        }

        Some(self.invoke(&command, policy.unwrap_or(self.retry)).await)
    }

    pub async fn status(&self, policy: Option<RetryPolicy>) -> InvocationResult {
        let command = CommandLine::status();
        info!("{}", command);
        self.invoke(&command, policy.unwrap_or(self.retry)).await
    }

    pub async fn clear(&self, key: &str, policy: Option<RetryPolicy>) -> InvocationResult {
        let command = CommandLine::clear(key);
        info!("{}", command);
        self.invoke(&command, policy.unwrap_or(self.retry)).await
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ClientError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable_fails_fast() {
        let config = ClientConfig::new("/nonexistent/dir/MessageClient");
        let err = RemoteMessageClient::new(Endpoint::new("127.0.0.1", "9000"), config).unwrap_err();

        assert!(matches!(err, ClientError::ExecutableNotFound(_)));
        assert!(err.to_string().contains("/nonexistent/dir/MessageClient"));
    }

    #[test]
    fn test_directory_is_not_an_executable() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::new(dir.path());

        assert!(RemoteMessageClient::new(Endpoint::new("h", "1"), config).is_err());
    }

    #[test]
    fn test_working_dir_defaults_to_install_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("MessageClient");
        std::fs::write(&exe, b"").unwrap();

        let client = RemoteMessageClient::new(
            Endpoint::new("10.0.0.1", "9000"),
            ClientConfig::new(&exe).with_retry(RetryPolicy::from_raw(2.0, 3)),
        )
        .unwrap();

        assert_eq!(client.working_dir, std::fs::canonicalize(dir.path()).unwrap());
        assert_eq!(client.retry_policy().max_attempts(), 3);
        assert_eq!(client.endpoint().host(), "10.0.0.1");
        assert_eq!(client.endpoint().port(), "9000");
    }

    #[test]
    fn test_absolute_keeps_absolute_paths() {
        let path = Path::new("/tmp/out/file.csv");
        assert_eq!(absolute(path).unwrap(), path);
        assert!(absolute(Path::new("out/file.csv")).unwrap().is_absolute());
    }
}
