use pymolfold::engine::error::NvcfError;
use pymolfold::predictors::error::PredictError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error(transparent)]
    Nvcf(#[from] NvcfError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Working directory error: {0}")]
    Workdir(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
