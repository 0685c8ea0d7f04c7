use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_STATUS_URL: &str = "https://api.nvcf.nvidia.com/v2/nvcf/pexec/status/{task_id}";
pub const DEFAULT_TERMINAL_FAILURES: [u16; 5] = [400, 401, 404, 422, 500];
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(3600);
/// Upper bound accepted for the total poll budget (seven days).
pub const MAX_WAIT_LIMIT: Duration = Duration::from_secs(7 * 24 * 3600);

const TASK_ID_PLACEHOLDER: &str = "{task_id}";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Which poll statuses end a job as a failure.
///
/// `200` always means success and is never part of the set. Every status that
/// is neither `200` nor a member keeps the poll loop going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPolicy {
    terminal_failures: BTreeSet<u16>,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TERMINAL_FAILURES)
    }
}

impl StatusPolicy {
    pub fn new(statuses: impl IntoIterator<Item = u16>) -> Self {
        Self {
            terminal_failures: statuses.into_iter().filter(|s| *s != 200).collect(),
        }
    }

    pub fn is_terminal_failure(&self, status: u16) -> bool {
        self.terminal_failures.contains(&status)
    }

    pub fn statuses(&self) -> impl Iterator<Item = u16> + '_ {
        self.terminal_failures.iter().copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NvcfConfig {
    /// Value of the `NVCF-POLL-SECONDS` header.
    pub poll_seconds: u64,
    /// Ceiling on every single HTTP call.
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Total wall-clock budget for the poll loop.
    pub max_wait: Duration,
    pub status_url: String,
    pub status_policy: StatusPolicy,
}

impl NvcfConfig {
    /// Settings the Boltz2 and MSA-search functions are called with.
    pub fn boltz2() -> Self {
        Self {
            poll_seconds: 300,
            timeout: Duration::from_secs(400),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
            status_url: DEFAULT_STATUS_URL.to_string(),
            status_policy: StatusPolicy::default(),
        }
    }

    pub fn status_url_for(&self, task_id: &str) -> String {
        if self.status_url.contains(TASK_ID_PLACEHOLDER) {
            self.status_url.replace(TASK_ID_PLACEHOLDER, task_id)
        } else {
            format!("{}/{}", self.status_url.trim_end_matches('/'), task_id)
        }
    }
}

#[derive(Default)]
pub struct NvcfConfigBuilder {
    poll_seconds: Option<u64>,
    timeout: Option<Duration>,
    poll_interval: Option<Duration>,
    max_wait: Option<Duration>,
    status_url: Option<String>,
    status_policy: Option<StatusPolicy>,
}

impl NvcfConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll_seconds(mut self, seconds: u64) -> Self {
        self.poll_seconds = Some(seconds);
        self
    }
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }
    pub fn status_url(mut self, url: impl Into<String>) -> Self {
        self.status_url = Some(url.into());
        self
    }
    pub fn status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<NvcfConfig, ConfigError> {
        let poll_seconds = self
            .poll_seconds
            .ok_or(ConfigError::MissingParameter("poll_seconds"))?;
        let timeout = self
            .timeout
            .ok_or(ConfigError::MissingParameter("timeout"))?;
        if timeout.is_zero() {
            return Err(ConfigError::InvalidParameter {
                name: "timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        let status_url = self
            .status_url
            .unwrap_or_else(|| DEFAULT_STATUS_URL.to_string());
        if status_url.trim().is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "status_url",
                reason: "must not be empty".to_string(),
            });
        }

        let max_wait = self.max_wait.unwrap_or(DEFAULT_MAX_WAIT);
        if max_wait > MAX_WAIT_LIMIT {
            return Err(ConfigError::InvalidParameter {
                name: "max_wait",
                reason: format!("must not exceed {} seconds", MAX_WAIT_LIMIT.as_secs()),
            });
        }
        let poll_interval = self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL);
        if poll_interval.is_zero() || poll_interval > MAX_WAIT_LIMIT {
            return Err(ConfigError::InvalidParameter {
                name: "poll_interval",
                reason: format!(
                    "must be between 1 and {} seconds",
                    MAX_WAIT_LIMIT.as_secs()
                ),
            });
        }

        let status_policy = self.status_policy.unwrap_or_default();
        if let Some(status) = status_policy
            .statuses()
            .find(|s| !(100..=599).contains(s))
        {
            return Err(ConfigError::InvalidParameter {
                name: "status_policy",
                reason: format!("{} is not an HTTP status code", status),
            });
        }

        Ok(NvcfConfig {
            poll_seconds,
            timeout,
            poll_interval,
            max_wait,
            status_url,
            status_policy,
        })
    }
}
