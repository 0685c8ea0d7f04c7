use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub workdir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
    pub token_file: Option<PathBuf>,
    pub nvcf: Option<FileNvcfConfig>,
    pub batch: Option<FileBatchConfig>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileNvcfConfig {
    pub poll_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub poll_interval_seconds: Option<u64>,
    pub max_wait_seconds: Option<u64>,
    pub status_url: Option<String>,
    pub terminal_statuses: Option<Vec<u16>>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileBatchConfig {
    pub max_esmfold_length: Option<usize>,
    pub delay_seconds: Option<u64>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
