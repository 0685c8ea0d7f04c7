use super::http_transport;
use crate::cli::{BatchArgs, BatchMethodArg};
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use crate::workdir::WorkdirManager;
use pymolfold::core::io::fasta::read_fasta_file;
use pymolfold::core::io::summary::write_summary_file;
use pymolfold::engine::progress::ProgressReporter;
use pymolfold::predictors::esmfold::{EsmFold, PymolFold};
use pymolfold::workflows::batch::{self, BatchMethod};
use std::time::Duration;
use tracing::info;

pub async fn run(args: BatchArgs) -> Result<()> {
    let workdir_manager = WorkdirManager::new()?;
    let config = build_config(&args.config, &workdir_manager)?;

    let records = read_fasta_file(&args.fasta).map_err(|e| CliError::FileParsing {
        path: args.fasta.clone(),
        source: e.into(),
    })?;
    if records.is_empty() {
        return Err(CliError::Argument(format!(
            "No sequences found in {}",
            args.fasta.display()
        )));
    }

    let mut options = config.batch.clone();
    options.method = match args.method {
        BatchMethodArg::Esmfold => BatchMethod::EsmFold,
        BatchMethodArg::Pymolfold => BatchMethod::PymolFold,
    };
    if let Some(delay) = args.delay {
        options.delay = Duration::from_secs(delay);
    }
    if let Some(length) = args.max_esmfold_length {
        options.max_esmfold_length = length;
    }

    let mut session = config.session();
    let transport = http_transport();
    let esmfold = EsmFold::new(transport.clone());
    let pymolfold = PymolFold::with_base_url(transport, session.base_url());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Folding {} sequence(s) from {}...", records.len(), args.fasta.display());
    let rows = batch::run(
        &records,
        &esmfold,
        &pymolfold,
        &options,
        &mut session,
        &reporter,
    )
    .await;

    let summary_path = args
        .summary
        .unwrap_or_else(|| session.workdir().join("batch_summary.csv"));
    std::fs::create_dir_all(session.workdir())?;
    write_summary_file(&summary_path, &rows).map_err(|e| CliError::Other(e.into()))?;
    info!("Summary written to {:?}", &summary_path);

    let failed = rows.iter().filter(|r| r.path.is_none()).count();
    println!(
        "✓ {} of {} prediction(s) succeeded. Summary: {}",
        rows.len() - failed,
        rows.len(),
        summary_path.display()
    );
    Ok(())
}
