use super::http_transport;
use crate::cli::{FetchArgs, FetchSource};
use crate::commands::plddt::{write_coloring_script, write_load_script};
use crate::config::build_config;
use crate::error::Result;
use crate::workdir::WorkdirManager;
use pymolfold::workflows::fetch::{self, FetchSources};
use tracing::info;

pub async fn run(args: FetchArgs) -> Result<()> {
    let workdir_manager = WorkdirManager::new()?;
    let config = build_config(&args.config, &workdir_manager)?;
    let mut session = config.session();
    let transport = http_transport();
    let sources = FetchSources::default();

    let fetched = match &args.source {
        FetchSource::Af { uniprot_id } => {
            info!("Fetching AlphaFold DB model for {}", uniprot_id);
            fetch::alphafold(transport.as_ref(), &sources, uniprot_id, &mut session).await?
        }
        FetchSource::Am { name } => {
            info!("Fetching AlphaMissense structure {}", name);
            fetch::alphamissense(transport.as_ref(), &sources, name, &mut session).await?
        }
    };

    println!(
        "✓ {} saved to: {} (mean pLDDT {:.2})",
        fetched.object_name,
        fetched.path.display(),
        fetched.mean_plddt
    );
    println!("  Source: {}", fetched.source_url);
    if args.pml {
        if let Some(script) = write_coloring_script(&fetched.path, &fetched.object_name)? {
            println!("  Coloring script: {}", script.display());
        }
        let loader = write_load_script(&session)?;
        println!("  Load in PyMOL with: @{}", loader.display());
    }
    Ok(())
}
