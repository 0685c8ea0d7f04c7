use crate::cli::PlddtArgs;
use crate::error::{CliError, Result};
use pymolfold::core::confidence::{self, ConfidenceBand, PlddtScale};
use pymolfold::workflows::session::Session;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const LOAD_SCRIPT_NAME: &str = "load_session.pml";

pub async fn run(args: PlddtArgs) -> Result<()> {
    let text = fs::read_to_string(&args.file)?;
    let summary = confidence::summarize(&text).ok_or_else(|| CliError::FileParsing {
        path: args.file.clone(),
        source: anyhow::anyhow!("no CA atoms with a B-factor column were found"),
    })?;

    println!("Structure: {}", args.file.display());
    println!(
        "Mean pLDDT: {:.2} over {} residues ({} scale)",
        summary.mean,
        summary.residues,
        match summary.scale {
            PlddtScale::Unit => "0-1",
            PlddtScale::Percent => "0-100",
        }
    );
    for (band, count) in ConfidenceBand::ALL.iter().zip(summary.band_counts) {
        println!("  {:<10} {:>6}", band.to_string(), count);
    }

    if let Some(out) = &args.pml {
        write_script(out, &args.selection, summary.scale)?;
        println!("✓ Coloring script written to: {}", out.display());
    }
    Ok(())
}

/// Writes `<stem>.pml` next to `structure`; `None` when it carries no pLDDT.
pub fn write_coloring_script(structure: &Path, selection: &str) -> Result<Option<PathBuf>> {
    let text = fs::read_to_string(structure)?;
    let Some(summary) = confidence::summarize(&text) else {
        warn!(path = %structure.display(), "No pLDDT values found, skipping coloring script");
        return Ok(None);
    };
    let out = structure.with_extension("pml");
    write_script(&out, selection, summary.scale)?;
    Ok(Some(out))
}

/// Writes `load_session.pml` into the session workdir: one `load` per registered
/// object, followed by its coloring script when one sits next to the structure.
pub fn write_load_script(session: &Session) -> Result<PathBuf> {
    let mut script = String::new();
    for (name, path) in session.objects() {
        script.push_str(&format!("load {}, {}\n", path.display(), name));
        let coloring = path.with_extension("pml");
        if coloring.is_file() {
            script.push_str(&format!("@{}\n", coloring.display()));
        }
    }
    fs::create_dir_all(session.workdir())?;
    let out = session.workdir().join(LOAD_SCRIPT_NAME);
    fs::write(&out, script)?;
    info!(path = %out.display(), "Session load script written");
    Ok(out)
}

fn write_script(out: &Path, selection: &str, scale: PlddtScale) -> Result<()> {
    let mut script = confidence::coloring_commands(selection, scale).join("\n");
    script.push('\n');
    fs::write(out, script)?;
    info!(path = %out.display(), "Coloring script written");
    Ok(())
}
