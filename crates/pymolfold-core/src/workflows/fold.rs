use std::path::PathBuf;
use tracing::{info, instrument};

use super::session::Session;
use crate::core::confidence;
use crate::core::io::naming::safe_filename;
use crate::core::io::structure::{SavedStructure, StructureFormat, save_structures};
use crate::core::models::result::PredictionResult;
use crate::core::sequence::{clean_sequence, default_name};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::predictors::StructurePredictor;
use crate::predictors::error::PredictError;

#[derive(Debug, Clone, PartialEq)]
pub struct FoldedStructure {
    pub path: PathBuf,
    pub object_name: String,
    pub format: StructureFormat,
    /// Percent scale. `None` when neither the text nor the result carries pLDDT.
    pub mean_plddt: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoldOutcome {
    pub name: String,
    pub sequence: String,
    pub result: PredictionResult,
    pub structures: Vec<FoldedStructure>,
}

#[instrument(skip_all, name = "fold_workflow", fields(predictor = predictor.name()))]
pub async fn run(
    predictor: &dyn StructurePredictor,
    sequence: &str,
    name: Option<&str>,
    session: &mut Session,
    reporter: &ProgressReporter<'_>,
) -> Result<FoldOutcome, PredictError> {
    let cleaned = clean_sequence(sequence);
    if cleaned.is_empty() {
        return Err(PredictError::InvalidInput(
            "sequence contains no residues".to_string(),
        ));
    }
    let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => safe_filename(n),
        None => default_name(&cleaned),
    };
    info!(name = %name, length = cleaned.len(), "Starting prediction");

    let result = predictor.predict(&cleaned, &name, reporter).await?;

    reporter.report(Progress::PhaseStart {
        name: "Saving structures",
    });
    let saved = save_structures(&result, Some(&name), session.workdir())?;
    let structures = register(&saved, &result, session);
    reporter.report(Progress::PhaseFinish);

    info!(count = structures.len(), "Prediction saved");
    Ok(FoldOutcome {
        name,
        sequence: cleaned,
        result,
        structures,
    })
}

/// Registers saved files as viewer objects and attaches their confidence.
pub(crate) fn register(
    saved: &[SavedStructure],
    result: &PredictionResult,
    session: &mut Session,
) -> Vec<FoldedStructure> {
    saved
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let object_name = s.object_name();
            session.register_object(object_name.clone(), s.path.clone());
            FoldedStructure {
                path: s.path.clone(),
                object_name,
                format: s.format,
                mean_plddt: structure_plddt(s, result, i),
            }
        })
        .collect()
}

fn structure_plddt(saved: &SavedStructure, result: &PredictionResult, index: usize) -> Option<f64> {
    if saved.format == StructureFormat::Pdb && !confidence::residue_plddts(&saved.text).is_empty()
    {
        return Some(confidence::mean_plddt(&saved.text));
    }
    result
        .complex_plddt(index)
        .map(|v| if v <= 1.0 { v * 100.0 } else { v })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictors::esmfold::EsmFold;
    use crate::engine::transport::TransportResponse;
    use crate::engine::transport::mock::ScriptedTransport;
    use std::sync::Arc;
    use tempfile::tempdir;

    const PDB: &str = concat!(
        "HEADER    TEST\n",
        "ATOM      1  CA  MET A   1      11.104   6.134  -6.504  1.00  0.80           C\n",
        "ATOM      2  CA  LYS A   2      11.104   6.134  -6.504  1.00  0.60           C\n",
        "END\n"
    );

    #[tokio::test]
    async fn run_saves_under_default_name_and_registers_object() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(ScriptedTransport::new().respond(TransportResponse::new(200, PDB)));
        let predictor = EsmFold::new(transport.clone());
        let mut session = Session::new(dir.path());

        let outcome = run(&predictor, "mkt/ayi akqr", None, &mut session, &ProgressReporter::new())
            .await
            .unwrap();

        assert_eq!(outcome.sequence, "MKT:AYIAKQR");
        assert_eq!(outcome.name, "MKTKQR");
        let folded = &outcome.structures[0];
        assert_eq!(folded.path, dir.path().join("MKTKQR_1.pdb"));
        assert_eq!(folded.object_name, "MKTKQR_1");
        assert!((folded.mean_plddt.unwrap() - 70.0).abs() < 1e-9);
        assert_eq!(session.object_path("MKTKQR_1"), Some(folded.path.as_path()));
        assert_eq!(
            transport.requests()[0].body,
            Some(crate::engine::transport::RequestBody::Text("MKT:AYIAKQR".to_string()))
        );
    }

    #[tokio::test]
    async fn run_uses_cleaned_user_name() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(ScriptedTransport::new().respond(TransportResponse::new(200, PDB)));
        let predictor = EsmFold::new(transport);
        let mut session = Session::new(dir.path());

        let outcome = run(&predictor, "MKT", Some(" my/run "), &mut session, &ProgressReporter::new())
            .await
            .unwrap();

        assert_eq!(outcome.name, "my_run");
        assert_eq!(outcome.structures[0].path, dir.path().join("my_run_1.pdb"));
    }

    #[tokio::test]
    async fn run_rejects_sequence_without_residues() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(ScriptedTransport::new());
        let predictor = EsmFold::new(transport.clone());
        let mut session = Session::new(dir.path());

        let err = run(&predictor, "123 ::", None, &mut session, &ProgressReporter::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PredictError::InvalidInput(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn cif_structures_fall_back_to_result_plddt() {
        let saved = SavedStructure {
            path: PathBuf::from("x_1.cif"),
            format: StructureFormat::Cif,
            text: "data_x".to_string(),
        };
        let result = PredictionResult::new(serde_json::json!({"complex_plddt_scores": [0.75]}));
        assert_eq!(structure_plddt(&saved, &result, 0), Some(75.0));
        assert_eq!(structure_plddt(&saved, &result, 1), None);
    }
}
