use super::mpnn_client;
use crate::cli::MutateArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use crate::workdir::WorkdirManager;
use pymolfold::engine::progress::ProgressReporter;
use pymolfold::predictors::design::PointMutation;
use pymolfold::workflows::design;

pub async fn run(args: MutateArgs) -> Result<()> {
    let mutation =
        PointMutation::parse(&args.mutation).map_err(|e| CliError::Argument(e.to_string()))?;
    let workdir_manager = WorkdirManager::new()?;
    let config = build_config(&args.config, &workdir_manager)?;
    let client = mpnn_client(&config.session());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let score = design::mutate(&client, &args.structure, mutation, &reporter).await?;
    println!("Mutation: {}, score: {}", score.mutation, score.score);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigArgs;
    use std::path::PathBuf;

    #[tokio::test]
    async fn malformed_mutation_fails_before_any_request() {
        let args = MutateArgs {
            structure: PathBuf::from("wt.pdb"),
            mutation: "K12".to_string(),
            config: ConfigArgs::default(),
        };
        let err = run(args).await.unwrap_err();
        assert!(matches!(err, CliError::Argument(msg) if msg.contains("K12")));
    }
}
