use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::naming::clean_filename;
use crate::core::models::result::{PredictionResult, StructureRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureFormat {
    Pdb,
    Cif,
}

impl StructureFormat {
    /// mmCIF files open with a `data_` block; anything else is treated as PDB.
    pub fn detect(text: &str) -> Self {
        if text.starts_with("data_") {
            StructureFormat::Cif
        } else {
            StructureFormat::Pdb
        }
    }

    /// Uses the record's declared format when it names one, else the text.
    pub fn of_record(record: &StructureRecord) -> Self {
        match record.format.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("cif" | "mmcif") => StructureFormat::Cif,
            Some("pdb") => StructureFormat::Pdb,
            _ => Self::detect(&record.structure),
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            StructureFormat::Pdb => ".pdb",
            StructureFormat::Cif => ".cif",
        }
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureFormat::Pdb => write!(f, "PDB"),
            StructureFormat::Cif => write!(f, "mmCIF"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedStructure {
    pub path: PathBuf,
    pub format: StructureFormat,
    pub text: String,
}

impl SavedStructure {
    /// File stem, which doubles as the viewer object name.
    pub fn object_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Writes every structure in `result` into `dir` without overwriting anything.
///
/// With a `name`, files are called `<name>_<i>` (1-based); otherwise the
/// cleaned `source` of each record is used. The suffix follows the format and
/// is only appended when missing. Taken names resolve to `<stem>_<n>` with
/// the smallest free `n`.
pub fn save_structures(
    result: &PredictionResult,
    name: Option<&str>,
    dir: &Path,
) -> io::Result<Vec<SavedStructure>> {
    fs::create_dir_all(dir)?;
    let mut saved = Vec::new();

    for (i, record) in result.structures().into_iter().enumerate() {
        let format = StructureFormat::of_record(&record);
        let suffix = format.suffix();
        let base = match name {
            Some(name) => format!("{}_{}", name, i + 1),
            None => clean_filename(record.source.as_deref().unwrap_or("structure")),
        };
        let file_name = if base.to_ascii_lowercase().ends_with(suffix) {
            base
        } else {
            format!("{}{}", base, suffix)
        };

        let path = free_path(dir, &file_name, suffix);
        fs::write(&path, &record.structure)?;
        debug!(path = %path.display(), %format, "Saved structure");
        saved.push(SavedStructure {
            path,
            format,
            text: record.structure,
        });
    }
    Ok(saved)
}

/// `dir/file_name`, or `<stem>_<n><suffix>` with the smallest free `n` when taken.
pub(crate) fn free_path(dir: &Path, file_name: &str, suffix: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let stem = &file_name[..file_name.len() - suffix.len()];
    (1..)
        .map(|n| dir.join(format!("{}_{}{}", stem, n, suffix)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Pretty-prints `value` with four-space indentation, creating parent directories.
pub fn save_json_output<T: Serialize + ?Sized>(value: &T, path: &Path) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer).map_err(io::Error::other)?;
    fs::write(path, buffer)?;
    Ok(path.to_path_buf())
}
