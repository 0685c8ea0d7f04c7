use std::io;
use thiserror::Error;

use crate::core::io::fasta::FastaError;
use crate::core::sequence::SequenceError;
use crate::engine::error::NvcfError;
use crate::engine::transport::TransportError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Nvcf(#[from] NvcfError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("FASTA error: {0}")]
    Fasta(#[from] FastaError),

    #[error("Invalid sequence: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{service} returned HTTP {status}: {body}")]
    Service {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {service}: {reason}")]
    UnexpectedResponse {
        service: &'static str,
        reason: String,
    },
}

impl PredictError {
    /// HTTP status reported by the remote side, wherever it surfaced.
    pub fn status(&self) -> Option<u16> {
        match self {
            PredictError::Service { status, .. } => Some(*status),
            PredictError::Nvcf(e) => e.status(),
            _ => None,
        }
    }
}
