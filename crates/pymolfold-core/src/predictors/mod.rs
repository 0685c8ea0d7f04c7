//! # Predictors Module
//!
//! Backend-specific request builders for the structure prediction services.
//! Each backend turns a cleaned sequence into one [`PredictionResult`] shaped as
//! `{"structures": [{"structure", "source"}], "confidence_scores": [...]}` with
//! backend extras left in place.
//!
//! - [`esmfold`] - ESMFold and the CloudMol-hosted PymolFold endpoint (form posts)
//! - [`boltz`] - Boltz2 on NVIDIA Cloud Functions, including multi-entity complexes
//! - [`design`] - ProteinMPNN sequence design and mutation scoring (multipart uploads)
//!
//! [`Fallback`] chains two predictors so that a server error from one is
//! retried on the other.

pub mod boltz;
pub mod design;
pub mod error;
pub mod esmfold;

use async_trait::async_trait;
use tracing::warn;

use crate::core::models::result::PredictionResult;
use crate::engine::progress::ProgressReporter;
use error::PredictError;

#[async_trait]
pub trait StructurePredictor: Send + Sync {
    fn name(&self) -> &'static str;

    /// `sequence` is already cleaned; `name` becomes the record's `source`.
    async fn predict(
        &self,
        sequence: &str,
        name: &str,
        reporter: &ProgressReporter<'_>,
    ) -> Result<PredictionResult, PredictError>;
}

/// Retries on `secondary` when `primary` answers with HTTP 500.
pub struct Fallback<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> Fallback<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<P, S> StructurePredictor for Fallback<P, S>
where
    P: StructurePredictor,
    S: StructurePredictor,
{
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn predict(
        &self,
        sequence: &str,
        name: &str,
        reporter: &ProgressReporter<'_>,
    ) -> Result<PredictionResult, PredictError> {
        match self.primary.predict(sequence, name, reporter).await {
            Err(e) if e.status() == Some(500) => {
                warn!(
                    primary = self.primary.name(),
                    secondary = self.secondary.name(),
                    "Internal server error, switching predictor"
                );
                self.secondary.predict(sequence, name, reporter).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::transport::TransportResponse;
    use crate::engine::transport::mock::ScriptedTransport;
    use esmfold::{EsmFold, PymolFold};
    use std::sync::Arc;

    #[tokio::test]
    async fn fallback_switches_on_internal_server_error() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(TransportResponse::new(500, "boom"))
                .respond(TransportResponse::new(200, "ATOM      1  CA")),
        );
        let predictor = Fallback::new(
            EsmFold::new(transport.clone()),
            PymolFold::new(transport.clone()),
        );

        let result = predictor
            .predict("MKT", "MKT", &ProgressReporter::new())
            .await
            .unwrap();

        assert_eq!(result.structures()[0].structure, "ATOM      1  CA");
        assert_eq!(
            transport.requests()[1].url,
            "https://api.cloudmol.org/protein/esmfold/"
        );
    }

    #[tokio::test]
    async fn fallback_keeps_other_errors() {
        let transport = Arc::new(
            ScriptedTransport::new().respond(TransportResponse::new(422, "bad sequence")),
        );
        let predictor = Fallback::new(
            EsmFold::new(transport.clone()),
            PymolFold::new(transport.clone()),
        );

        let err = predictor
            .predict("MKT", "MKT", &ProgressReporter::new())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(422));
        assert_eq!(transport.requests().len(), 1);
    }
}
