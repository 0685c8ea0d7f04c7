use std::time::Duration;
use thiserror::Error;

use super::config::ConfigError;
use super::transport::TransportError;

/// Every way a single NVCF call can end without a result.
#[derive(Debug, Error)]
pub enum NvcfError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Service returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Job {task_id} did not finish within {waited:?}")]
    PollBudgetExhausted { task_id: String, waited: Duration },
}

impl From<ConfigError> for NvcfError {
    fn from(e: ConfigError) -> Self {
        NvcfError::Configuration(e.to_string())
    }
}

impl NvcfError {
    /// Status code reported by the service, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            NvcfError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}
