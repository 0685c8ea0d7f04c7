use super::{http_transport, report_structures};
use crate::cli::ComplexArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use crate::workdir::WorkdirManager;
use pymolfold::engine::nvcf::NvcfClient;
use pymolfold::engine::progress::ProgressReporter;
use pymolfold::predictors::boltz::Boltz2;
use pymolfold::predictors::error::PredictError;
use pymolfold::workflows::complex;
use tracing::{info, warn};

pub async fn run(args: ComplexArgs) -> Result<()> {
    let workdir_manager = WorkdirManager::new()?;
    let config = build_config(&args.config, &workdir_manager)?;

    info!("Loading job description from {:?}", &args.input);
    let job = complex::load_job(&args.input).map_err(|e| match e {
        PredictError::Json(source) => CliError::FileParsing {
            path: args.input.clone(),
            source: source.into(),
        },
        other => other.into(),
    })?;

    let credential = config.credential()?;
    let client = NvcfClient::new(http_transport(), config.nvcf.clone(), Some(credential));
    let predictor = Boltz2::new(client);
    let mut session = config.session();

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let outcome = complex::run(
        &predictor,
        &job,
        &mut session,
        args.json_output.as_deref(),
        &reporter,
    )
    .await?;

    if outcome.structures.is_empty() {
        warn!("Boltz2 returned no structures.");
        println!("Warning: Boltz2 finished but returned no structures.");
    }
    report_structures(&session, &outcome.structures, args.pml)?;

    if let (Some(target), Some(pic50)) = (
        outcome.prediction.affinity_target.as_deref(),
        outcome.affinity_pic50(),
    ) {
        println!("Affinity for chain {}: pIC50 {:.3}", target, pic50);
    }
    if let Some(path) = &outcome.json_path {
        println!("Raw response saved to: {}", path.display());
    }
    Ok(())
}
