use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use super::session::Session;
use crate::core::io::dms::{DmsRow, write_dms_file};
use crate::core::io::fasta::write_fasta;
use crate::core::io::naming::safe_filename;
use crate::core::io::structure::free_path;
use crate::engine::progress::ProgressReporter;
use crate::predictors::design::{
    Design, DesignOptions, MutationScore, PointMutation, ProteinMpnn, StructureUpload,
    designs_to_fasta,
};
use crate::predictors::error::PredictError;

pub const DMS_RESULTS_FILE: &str = "dms_results.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct DesignOutcome {
    pub designs: Vec<Design>,
    pub fasta_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub rows: Vec<DmsRow>,
    pub csv_path: PathBuf,
}

pub fn load_structure(path: &Path) -> Result<StructureUpload, PredictError> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(PredictError::InvalidInput(format!(
            "{} is empty",
            path.display()
        )));
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "structure.pdb".to_string());
    Ok(StructureUpload::new(file_name, content))
}

fn stem_of(upload: &StructureUpload) -> String {
    let stem = Path::new(&upload.file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    safe_filename(&stem)
}

/// Designs sequences for `structure` and writes them to `<stem>_mpnn.fasta` in the workdir.
#[instrument(skip_all, name = "design_workflow", fields(structure = %structure.display()))]
pub async fn design(
    client: &ProteinMpnn,
    structure: &Path,
    options: &DesignOptions,
    session: &Session,
    reporter: &ProgressReporter<'_>,
) -> Result<DesignOutcome, PredictError> {
    let upload = load_structure(structure)?;
    let designs = client.design(&upload, options, reporter).await?;

    fs::create_dir_all(session.workdir())?;
    let file_name = format!("{}_mpnn.fasta", stem_of(&upload));
    let fasta_path = free_path(session.workdir(), &file_name, ".fasta");
    let writer = BufWriter::new(File::create(&fasta_path)?);
    write_fasta(writer, &designs_to_fasta(&designs))?;

    info!(path = %fasta_path.display(), count = designs.len(), "Designs written");
    Ok(DesignOutcome {
        designs,
        fasta_path,
    })
}

#[instrument(skip_all, name = "mutate_workflow", fields(mutation = %mutation))]
pub async fn mutate(
    client: &ProteinMpnn,
    structure: &Path,
    mutation: PointMutation,
    reporter: &ProgressReporter<'_>,
) -> Result<MutationScore, PredictError> {
    let upload = load_structure(structure)?;
    client.score_mutation(&upload, mutation, reporter).await
}

/// Scans every single mutation of `structure` into `dms_results.csv` in the workdir.
#[instrument(skip_all, name = "dms_workflow", fields(structure = %structure.display()))]
pub async fn deep_mutational_scan(
    client: &ProteinMpnn,
    structure: &Path,
    session: &Session,
    reporter: &ProgressReporter<'_>,
) -> Result<ScanOutcome, PredictError> {
    let upload = load_structure(structure)?;
    let rows = client.deep_mutational_scan(&upload, reporter).await?;

    fs::create_dir_all(session.workdir())?;
    let csv_path = free_path(session.workdir(), DMS_RESULTS_FILE, ".csv");
    write_dms_file(&csv_path, &rows)?;

    info!(path = %csv_path.display(), mutations = rows.len(), "Scan written");
    Ok(ScanOutcome { rows, csv_path })
}
