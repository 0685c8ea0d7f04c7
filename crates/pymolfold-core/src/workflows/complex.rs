use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::fold::{FoldedStructure, register};
use super::session::Session;
use crate::core::io::naming::safe_filename;
use crate::core::io::structure::{save_json_output, save_structures};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::predictors::boltz::{Boltz2, BoltzJob, ComplexPrediction};
use crate::predictors::error::PredictError;

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexOutcome {
    pub prediction: ComplexPrediction,
    pub structures: Vec<FoldedStructure>,
    pub json_path: Option<PathBuf>,
}

impl ComplexOutcome {
    pub fn affinity_pic50(&self) -> Option<f64> {
        self.prediction.affinity_pic50()
    }
}

pub fn load_job(path: &Path) -> Result<BoltzJob, PredictError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Runs a Boltz2 job, saves every returned model and optionally dumps the raw answer.
#[instrument(skip_all, name = "complex_workflow")]
pub async fn run(
    predictor: &Boltz2,
    job: &BoltzJob,
    session: &mut Session,
    json_output: Option<&Path>,
    reporter: &ProgressReporter<'_>,
) -> Result<ComplexOutcome, PredictError> {
    let prediction = predictor.predict_job(job, reporter).await?;

    reporter.report(Progress::PhaseStart {
        name: "Saving structures",
    });
    let name = prediction.name.as_deref().map(safe_filename);
    let saved = save_structures(&prediction.result, name.as_deref(), session.workdir())?;
    if saved.is_empty() {
        warn!("No structures were generated");
    }
    let structures = register(&saved, &prediction.result, session);
    let json_path = match json_output {
        Some(path) => Some(save_json_output(prediction.result.as_json(), path)?),
        None => None,
    };
    reporter.report(Progress::PhaseFinish);

    info!(
        count = structures.len(),
        affinity_target = prediction.affinity_target.as_deref().unwrap_or("-"),
        "Complex prediction saved"
    );
    Ok(ComplexOutcome {
        prediction,
        structures,
        json_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::NvcfConfig;
    use crate::engine::credentials::Credential;
    use crate::engine::nvcf::NvcfClient;
    use crate::engine::transport::TransportResponse;
    use crate::engine::transport::mock::ScriptedTransport;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn run_saves_models_and_reports_affinity() {
        let dir = tempdir().unwrap();
        let body = json!({
            "structures": [
                {"structure": "data_m1", "format": "mmcif"},
                {"structure": "data_m2", "format": "mmcif"}
            ],
            "complex_plddt_scores": [0.9, 0.5],
            "affinities": {"B": {"affinity_pic50": [6.5]}}
        });
        let transport = Arc::new(
            ScriptedTransport::new().respond(TransportResponse::new(200, body.to_string())),
        );
        let client = NvcfClient::new(transport, NvcfConfig::boltz2(), Credential::new("k"));
        let predictor = Boltz2::new(client);
        let job: BoltzJob = serde_json::from_value(json!({
            "name": "lig complex",
            "entities": [
                {"type": "Protein", "chain_id": "A", "sequence": "MKT"},
                {"type": "Ligand (CCD)", "chain_id": "B", "ccd_string": "ATP"}
            ],
            "binding_affinity_settings": {"calculate_affinity": true, "selected_ligand": "CHAIN_ID: B"}
        }))
        .unwrap();
        let mut session = Session::new(dir.path());
        let json_path = dir.path().join("result.json");

        let outcome = run(
            &predictor,
            &job,
            &mut session,
            Some(&json_path),
            &ProgressReporter::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.structures.len(), 2);
        assert_eq!(outcome.structures[0].path, dir.path().join("lig_complex_1.cif"));
        assert_eq!(outcome.structures[1].mean_plddt, Some(50.0));
        assert_eq!(outcome.affinity_pic50(), Some(6.5));
        assert_eq!(outcome.json_path.as_deref(), Some(json_path.as_path()));
        assert!(session.object_path("lig_complex_2").is_some());
    }

    #[test]
    fn load_job_reads_front_end_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(
            &path,
            r#"{"entities": [{"type": "Protein", "chain_id": "A", "sequence": "MKT", "msa": true}]}"#,
        )
        .unwrap();
        let job = load_job(&path).unwrap();
        assert_eq!(job.entities.len(), 1);
        assert!(job.entities[0].msa);
        assert_eq!(job.diffusion_samples, 1);
    }
}
