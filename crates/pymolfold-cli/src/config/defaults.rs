use pymolfold::engine::config::{
    DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL, DEFAULT_STATUS_URL, DEFAULT_TERMINAL_FAILURES,
};
use pymolfold::engine::credentials::DEFAULT_API_KEY_VAR;
use pymolfold::predictors::esmfold::DEFAULT_PYMOLFOLD_BASE_URL;
use pymolfold::workflows::batch::{DEFAULT_ESMFOLD_DELAY, DEFAULT_MAX_ESMFOLD_LENGTH};

pub struct DefaultsConfig {
    pub poll_seconds: u64,
    pub timeout_seconds: u64,
    pub poll_interval_seconds: u64,
    pub max_wait_seconds: u64,
    pub status_url: String,
    pub terminal_statuses: Vec<u16>,
    pub api_key_env: String,
    pub base_url: String,
    pub max_esmfold_length: usize,
    pub delay_seconds: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            poll_seconds: 300,
            timeout_seconds: 400,
            poll_interval_seconds: DEFAULT_POLL_INTERVAL.as_secs(),
            max_wait_seconds: DEFAULT_MAX_WAIT.as_secs(),
            status_url: DEFAULT_STATUS_URL.to_string(),
            terminal_statuses: DEFAULT_TERMINAL_FAILURES.to_vec(),
            api_key_env: DEFAULT_API_KEY_VAR.to_string(),
            base_url: DEFAULT_PYMOLFOLD_BASE_URL.to_string(),
            max_esmfold_length: DEFAULT_MAX_ESMFOLD_LENGTH,
            delay_seconds: DEFAULT_ESMFOLD_DELAY.as_secs(),
        }
    }
}
