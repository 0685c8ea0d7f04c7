use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// One scored point mutation of a deep mutational scan.
///
/// The numbered columns are the scores of the individual models, named after
/// their training noise level; `ensemble` averages them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DmsRow {
    pub mutation: String,
    #[serde(rename = "002")]
    pub noise_002: f64,
    #[serde(rename = "010")]
    pub noise_010: f64,
    #[serde(rename = "020")]
    pub noise_020: f64,
    #[serde(rename = "030")]
    pub noise_030: f64,
    pub ensemble: f64,
}

/// Header: `mutation,002,010,020,030,ensemble`.
pub fn write_dms<W: Write>(writer: W, rows: &[DmsRow]) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv.write_record(["mutation", "002", "010", "020", "030", "ensemble"])?;
    }
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_dms_file(path: &Path, rows: &[DmsRow]) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    write_dms(file, rows)
}
