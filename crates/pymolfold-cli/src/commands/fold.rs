use super::{http_transport, report_structures};
use crate::cli::{FoldArgs, PredictorKind};
use crate::config::{AppConfig, build_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use crate::workdir::WorkdirManager;
use pymolfold::engine::nvcf::NvcfClient;
use pymolfold::engine::progress::ProgressReporter;
use pymolfold::predictors::boltz::Boltz2;
use pymolfold::predictors::esmfold::{EsmFold, PymolFold};
use pymolfold::predictors::{Fallback, StructurePredictor};
use pymolfold::workflows;
use pymolfold::workflows::session::Session;
use tracing::info;

pub async fn run(args: FoldArgs) -> Result<()> {
    let workdir_manager = WorkdirManager::new()?;
    let config = build_config(&args.config, &workdir_manager)?;
    let mut session = config.session();
    let predictor = select_predictor(args.predictor, args.no_fallback, &config, &session)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Folding with '{}' into {:?}", predictor.name(), session.workdir());
    let outcome = workflows::fold::run(
        predictor.as_ref(),
        &args.sequence,
        args.name.as_deref(),
        &mut session,
        &reporter,
    )
    .await?;

    println!(
        "Predicted '{}' ({} residues) with {}.",
        outcome.name,
        outcome.sequence.len(),
        predictor.name()
    );
    report_structures(&session, &outcome.structures, args.pml)
}

/// The Boltz2 credential is resolved here so a missing key fails before any request.
fn select_predictor(
    kind: PredictorKind,
    no_fallback: bool,
    config: &AppConfig,
    session: &Session,
) -> Result<Box<dyn StructurePredictor>> {
    let transport = http_transport();
    let esmfold = EsmFold::new(transport.clone());
    let pymolfold = PymolFold::with_base_url(transport.clone(), session.base_url());

    let predictor: Box<dyn StructurePredictor> = match (kind, no_fallback) {
        (PredictorKind::Esmfold, false) => Box::new(Fallback::new(esmfold, pymolfold)),
        (PredictorKind::Esmfold, true) => Box::new(esmfold),
        (PredictorKind::Pymolfold, false) => Box::new(Fallback::new(pymolfold, esmfold)),
        (PredictorKind::Pymolfold, true) => Box::new(pymolfold),
        (PredictorKind::Boltz2, _) => {
            let credential = config.credential()?;
            let client = NvcfClient::new(transport, config.nvcf.clone(), Some(credential));
            Box::new(Boltz2::new(client))
        }
    };
    Ok(predictor)
}
