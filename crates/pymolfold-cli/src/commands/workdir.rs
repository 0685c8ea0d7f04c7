use crate::cli::{WorkdirArgs, WorkdirCommands};
use crate::error::Result;
use crate::workdir::WorkdirManager;
use tracing::info;

pub async fn run(args: WorkdirArgs) -> Result<()> {
    let manager = WorkdirManager::new()?;
    match args.command {
        WorkdirCommands::Show => {
            let path = manager.current()?;
            println!("{}", std::path::absolute(&path).unwrap_or(path).display());
        }
        WorkdirCommands::Set { path } => {
            let stored = manager.set_custom_path(&path)?;
            std::fs::create_dir_all(&stored)?;
            info!("Custom workdir set to {:?}", &stored);
            println!("✓ Working directory set to: {}", stored.display());
        }
        WorkdirCommands::Reset => {
            manager.reset_path()?;
            println!(
                "✓ Working directory reset to default: {}",
                manager.default_path().display()
            );
        }
    }
    Ok(())
}
