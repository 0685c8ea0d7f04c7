use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::StructurePredictor;
use super::error::PredictError;
use crate::core::models::result::PredictionResult;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::transport::{RequestBody, Transport, TransportRequest};

pub const ESMFOLD_URL: &str = "https://api.esmatlas.com/foldSequence/v1/pdb/";
pub const DEFAULT_PYMOLFOLD_BASE_URL: &str = "https://api.cloudmol.org/";
pub const DEFAULT_FORM_TIMEOUT: Duration = Duration::from_secs(300);

const PDB_PREFIXES: [&str; 5] = ["HEADER", "ATOM", "MODEL", "REMARK", "PARENT"];

/// The public ESM Metagenomic Atlas folding endpoint.
pub struct EsmFold {
    transport: Arc<dyn Transport>,
    url: String,
    timeout: Duration,
}

impl EsmFold {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            url: ESMFOLD_URL.to_string(),
            timeout: DEFAULT_FORM_TIMEOUT,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl StructurePredictor for EsmFold {
    fn name(&self) -> &'static str {
        "esmfold"
    }

    async fn predict(
        &self,
        sequence: &str,
        name: &str,
        reporter: &ProgressReporter<'_>,
    ) -> Result<PredictionResult, PredictError> {
        let text = post_form(
            self.transport.as_ref(),
            &self.url,
            sequence,
            self.timeout,
            self.name(),
            reporter,
        )
        .await?;
        ensure_pdb(&text, self.name())?;
        Ok(PredictionResult::from_structure(text, name))
    }
}

/// ESMFold served by the CloudMol API, used for sequences the public endpoint refuses.
pub struct PymolFold {
    transport: Arc<dyn Transport>,
    base_url: String,
    timeout: Duration,
}

impl PymolFold {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_base_url(transport, DEFAULT_PYMOLFOLD_BASE_URL)
    }

    pub fn with_base_url(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: normalize_base_url(base_url),
            timeout: DEFAULT_FORM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}protein/esmfold/", self.base_url)
    }
}

#[async_trait]
impl StructurePredictor for PymolFold {
    fn name(&self) -> &'static str {
        "pymolfold"
    }

    async fn predict(
        &self,
        sequence: &str,
        name: &str,
        reporter: &ProgressReporter<'_>,
    ) -> Result<PredictionResult, PredictError> {
        let raw = post_form(
            self.transport.as_ref(),
            &self.endpoint(),
            sequence,
            self.timeout,
            self.name(),
            reporter,
        )
        .await?;
        let text = unescape_pymolfold(&raw);
        ensure_pdb(&text, self.name())?;
        Ok(PredictionResult::from_structure(text, name))
    }
}

pub fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim().trim_end_matches('/'))
}

/// Drops the `PARENT N/A` preamble and expands literal `\n` escapes.
fn unescape_pymolfold(raw: &str) -> String {
    let body = if raw.starts_with("PARENT") {
        raw.replace("PARENT N/A\n", "")
    } else {
        raw.to_string()
    };
    body.replace("\\n", "\n")
}

fn ensure_pdb(text: &str, service: &'static str) -> Result<(), PredictError> {
    let head = text.trim_start();
    if PDB_PREFIXES.iter().any(|p| head.starts_with(p)) {
        Ok(())
    } else {
        let preview: String = head.chars().take(120).collect();
        Err(PredictError::UnexpectedResponse {
            service,
            reason: format!("body does not look like a PDB file: {:?}", preview),
        })
    }
}

async fn post_form(
    transport: &dyn Transport,
    url: &str,
    sequence: &str,
    timeout: Duration,
    service: &'static str,
    reporter: &ProgressReporter<'_>,
) -> Result<String, PredictError> {
    reporter.report(Progress::PhaseStart { name: "Folding" });
    info!(service, length = sequence.len(), "Submitting sequence");

    let request = TransportRequest::post(url, RequestBody::Text(sequence.to_string()), timeout)
        .with_header("Content-Type", "application/x-www-form-urlencoded");
    let response = transport.send(request).await?;
    reporter.report(Progress::PhaseFinish);
    debug!(service, status = response.status, "Received response");

    if !response.is_success() {
        return Err(PredictError::Service {
            service,
            status: response.status,
            body: response.body,
        });
    }
    Ok(response.body)
}
