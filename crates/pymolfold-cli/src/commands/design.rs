use super::mpnn_client;
use crate::cli::DesignArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use crate::workdir::WorkdirManager;
use pymolfold::engine::progress::ProgressReporter;
use pymolfold::predictors::design::{DesignOptions, designs_to_fasta};
use pymolfold::workflows::design;
use tracing::info;

pub async fn run(args: DesignArgs) -> Result<()> {
    let workdir_manager = WorkdirManager::new()?;
    let config = build_config(&args.config, &workdir_manager)?;
    let session = config.session();
    let client = mpnn_client(&session);

    let options = DesignOptions {
        fix_pos: args.fix_pos,
        chain: args.chain,
        rm_aa: args.rm_aa,
        inverse: args.inverse,
        homooligomeric: args.homooligomeric,
    };

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Designing sequences for {:?}", &args.structure);
    let outcome = design::design(&client, &args.structure, &options, &session, &reporter).await?;

    for record in designs_to_fasta(&outcome.designs) {
        println!(">{}\n{}", record.id, record.sequence);
    }
    println!(
        "✓ {} design(s) saved to: {}",
        outcome.designs.len(),
        outcome.fasta_path.display()
    );
    Ok(())
}
