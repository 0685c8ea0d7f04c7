use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Line {line}: sequence data before the first '>' header")]
    SequenceBeforeHeader { line: usize },
    #[error("Line {line}: header has no identifier")]
    EmptyHeader { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub description: Option<String>,
    pub sequence: String,
}

pub fn read_fasta<R: BufRead>(reader: R) -> Result<Vec<FastaRecord>, FastaError> {
    let mut records: Vec<FastaRecord> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            let mut parts = header.trim().splitn(2, char::is_whitespace);
            let id = parts.next().unwrap_or("").to_string();
            if id.is_empty() {
                return Err(FastaError::EmptyHeader { line: index + 1 });
            }
            let description = parts
                .next()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string);
            records.push(FastaRecord {
                id,
                description,
                sequence: String::new(),
            });
        } else {
            match records.last_mut() {
                Some(record) => record.sequence.push_str(line),
                None => return Err(FastaError::SequenceBeforeHeader { line: index + 1 }),
            }
        }
    }
    Ok(records)
}

pub fn read_fasta_file(path: &Path) -> Result<Vec<FastaRecord>, FastaError> {
    let file = File::open(path)?;
    read_fasta(BufReader::new(file))
}

/// One `>` header line and one unwrapped sequence line per record.
pub fn write_fasta<W: Write>(mut writer: W, records: &[FastaRecord]) -> io::Result<()> {
    for record in records {
        match &record.description {
            Some(description) => writeln!(writer, ">{} {}", record.id, description)?,
            None => writeln!(writer, ">{}", record.id)?,
        }
        writeln!(writer, "{}", record.sequence)?;
    }
    writer.flush()
}
