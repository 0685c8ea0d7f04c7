use super::mpnn_client;
use crate::cli::DmsArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use crate::workdir::WorkdirManager;
use pymolfold::engine::progress::ProgressReporter;
use pymolfold::workflows::design;
use tracing::info;

pub async fn run(args: DmsArgs) -> Result<()> {
    let workdir_manager = WorkdirManager::new()?;
    let config = build_config(&args.config, &workdir_manager)?;
    let session = config.session();
    let client = mpnn_client(&session);

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Scanning mutations of {:?}", &args.structure);
    let outcome =
        design::deep_mutational_scan(&client, &args.structure, &session, &reporter).await?;

    let best = outcome
        .rows
        .iter()
        .max_by(|a, b| a.ensemble.total_cmp(&b.ensemble));
    if let Some(best) = best {
        println!("Best ensemble score: {} ({:.3})", best.mutation, best.ensemble);
    }
    println!(
        "✓ {} mutation(s) scored. Results: {}",
        outcome.rows.len(),
        outcome.csv_path.display()
    );
    Ok(())
}
