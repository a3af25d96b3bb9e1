// Invocation results and response parsing

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Separator the message client prints before the payload
pub const PAYLOAD_DELIMITER: &str = "<<";

/// Substring marking an application-level failure in the client's output
pub const FAILURE_MARKER: &str = "Exception";

/// Outcome of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// The client answered; holds the extracted payload
    Success(String),
    /// The client did not finish within the configured timeout
    TimedOut,
    /// The client could not run, or reported an exception
    Failed(String),
}

/// Result of a call against the message client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    timestamp: DateTime<Local>,
    outcome: Outcome,
}

impl InvocationResult {
    /// Stamp an outcome with the current local time
    pub fn new(outcome: Outcome) -> Self {
        Self {
            timestamp: Local::now(),
            outcome,
        }
    }

    /// Result returned once every attempt has been used up
    pub fn exhausted() -> Self {
        Self::new(Outcome::Failed(String::new()))
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// Payload of a successful call
    pub fn payload(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Classify the captured stdout of a completed client run
pub fn classify_output(output: &str) -> Outcome {
    if output.contains(FAILURE_MARKER) {
        Outcome::Failed(output.to_string())
    } else {
        Outcome::Success(extract_payload(output).to_string())
    }
}

/// Text after the last delimiter, trimmed
///
/// Output without a delimiter is returned whole (trimmed).
pub fn extract_payload(output: &str) -> &str {
    match output.rfind(PAYLOAD_DELIMITER) {
        Some(idx) => output[idx + PAYLOAD_DELIMITER.len()..].trim(),
        None => output.trim(),
    }
}
