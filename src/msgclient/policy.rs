// Timeout and retry settings for message client calls

use std::time::Duration;

/// Default wait per attempt, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default number of attempts per call
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Shortest wait an attempt is allowed
pub const MIN_TIMEOUT: Duration = Duration::from_secs(1);

/// How long to wait for each attempt and how many attempts to make
///
/// Values are always clamped: the timeout is at least one second and at
/// least one attempt is made. Malformed textual input falls back to the
/// defaults rather than producing an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    timeout: Duration,
    max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(timeout: Duration, max_attempts: u32) -> Self {
        Self {
            timeout: timeout.max(MIN_TIMEOUT),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Build from loosely typed values (e.g. a fractional or negative timeout)
    pub fn from_raw(timeout_secs: f64, max_attempts: i64) -> Self {
        Self::new(clamp_timeout(timeout_secs), clamp_attempts(max_attempts))
    }

    /// Apply textual overrides on top of this policy
    ///
    /// A missing value keeps the current setting. A value that does not
    /// parse resets that setting to its default.
    pub fn with_overrides(self, timeout: Option<&str>, max_attempts: Option<&str>) -> Self {
        let timeout = match timeout {
            None => self.timeout,
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(secs) if secs.is_finite() => clamp_timeout(secs),
                _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
        };

        let max_attempts = match max_attempts {
            None => self.max_attempts,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map(clamp_attempts)
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
        };

        Self::new(timeout, max_attempts)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_MAX_ATTEMPTS)
    }
}

fn clamp_timeout(secs: f64) -> Duration {
    if !secs.is_finite() {
        return Duration::from_secs(DEFAULT_TIMEOUT_SECS);
    }
    if secs < 1.0 {
        return MIN_TIMEOUT;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

fn clamp_attempts(n: i64) -> u32 {
    if n < 1 {
        1
    } else {
        u32::try_from(n).unwrap_or(u32::MAX)
    }
}
