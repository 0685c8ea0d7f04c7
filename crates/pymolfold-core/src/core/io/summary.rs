use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// One row of the batch summary: `name,method,path,mean_plddt`.
///
/// Failed records keep their row with the last two columns left empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub name: String,
    pub method: String,
    pub path: Option<String>,
    pub mean_plddt: Option<f64>,
}

pub fn write_summary<W: Write>(writer: W, rows: &[SummaryRow]) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_summary_file(path: &Path, rows: &[SummaryRow]) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_path(path)?;
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}
