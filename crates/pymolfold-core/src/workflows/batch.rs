use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument};

use super::fold;
use super::session::Session;
use crate::core::io::fasta::FastaRecord;
use crate::core::io::summary::SummaryRow;
use crate::core::sequence::clean_sequence;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::predictors::StructurePredictor;

pub const DEFAULT_MAX_ESMFOLD_LENGTH: usize = 400;
pub const DEFAULT_ESMFOLD_DELAY: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMethod {
    EsmFold,
    PymolFold,
}

impl fmt::Display for BatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchMethod::EsmFold => write!(f, "esmfold"),
            BatchMethod::PymolFold => write!(f, "pymolfold"),
        }
    }
}

impl FromStr for BatchMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "esmfold" => Ok(BatchMethod::EsmFold),
            "pymolfold" => Ok(BatchMethod::PymolFold),
            other => Err(format!(
                "unknown batch method '{}'; expected 'esmfold' or 'pymolfold'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub method: BatchMethod,
    /// Sequences at least this long go to PymolFold even when ESMFold was asked for.
    pub max_esmfold_length: usize,
    /// Pause between consecutive ESMFold requests.
    pub delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            method: BatchMethod::EsmFold,
            max_esmfold_length: DEFAULT_MAX_ESMFOLD_LENGTH,
            delay: DEFAULT_ESMFOLD_DELAY,
        }
    }
}

impl BatchOptions {
    pub fn route(&self, cleaned: &str) -> BatchMethod {
        match self.method {
            BatchMethod::EsmFold if cleaned.len() >= self.max_esmfold_length => {
                BatchMethod::PymolFold
            }
            method => method,
        }
    }
}

/// Folds every FASTA record in order; failures are recorded, never fatal.
#[instrument(skip_all, name = "batch_workflow", fields(records = records.len()))]
pub async fn run(
    records: &[FastaRecord],
    esmfold: &dyn StructurePredictor,
    pymolfold: &dyn StructurePredictor,
    options: &BatchOptions,
    session: &mut Session,
    reporter: &ProgressReporter<'_>,
) -> Vec<SummaryRow> {
    let mut rows = Vec::with_capacity(records.len());
    let mut esmfold_calls = 0usize;

    reporter.report(Progress::TaskStart {
        total_steps: records.len() as u64,
    });
    for record in records {
        let method = options.route(&clean_sequence(&record.sequence));
        let predictor = match method {
            BatchMethod::EsmFold => {
                if esmfold_calls > 0 && !options.delay.is_zero() {
                    sleep(options.delay).await;
                }
                esmfold_calls += 1;
                esmfold
            }
            BatchMethod::PymolFold => pymolfold,
        };

        let silent = ProgressReporter::new();
        let row = match fold::run(predictor, &record.sequence, Some(&record.id), session, &silent)
            .await
        {
            Ok(outcome) => {
                let first = outcome.structures.first();
                info!(id = %record.id, %method, "Folded");
                SummaryRow {
                    name: outcome.name,
                    method: method.to_string(),
                    path: first.map(|s| s.path.display().to_string()),
                    mean_plddt: first.and_then(|s| s.mean_plddt),
                }
            }
            Err(e) => {
                error!(id = %record.id, %method, error = %e, "Prediction failed");
                reporter.report(Progress::Message(format!("{} failed: {}", record.id, e)));
                SummaryRow {
                    name: record.id.clone(),
                    method: method.to_string(),
                    path: None,
                    mean_plddt: None,
                }
            }
        };
        rows.push(row);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::transport::TransportResponse;
    use crate::engine::transport::mock::ScriptedTransport;
    use crate::predictors::esmfold::{EsmFold, PymolFold};
    use std::sync::Arc;
    use tempfile::tempdir;

    const PDB: &str = "HEADER\nATOM      1  CA  MET A   1      11.104   6.134  -6.504  1.00 90.00           C\n";

    fn record(id: &str, sequence: &str) -> FastaRecord {
        FastaRecord {
            id: id.to_string(),
            description: None,
            sequence: sequence.to_string(),
        }
    }

    #[test]
    fn route_sends_long_sequences_to_pymolfold() {
        let options = BatchOptions {
            max_esmfold_length: 5,
            ..BatchOptions::default()
        };
        assert_eq!(options.route("MKTA"), BatchMethod::EsmFold);
        assert_eq!(options.route("MKTAY"), BatchMethod::PymolFold);

        let forced = BatchOptions {
            method: BatchMethod::PymolFold,
            ..BatchOptions::default()
        };
        assert_eq!(forced.route("MKT"), BatchMethod::PymolFold);
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("ESMFold".parse::<BatchMethod>(), Ok(BatchMethod::EsmFold));
        assert!("alphafold".parse::<BatchMethod>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn run_records_failures_and_continues() {
        let dir = tempdir().unwrap();
        let esm_transport = Arc::new(
            ScriptedTransport::new()
                .respond(TransportResponse::new(200, PDB))
                .respond(TransportResponse::new(500, "down")),
        );
        let pf_transport =
            Arc::new(ScriptedTransport::new().respond(TransportResponse::new(200, PDB)));
        let esmfold = EsmFold::new(esm_transport.clone());
        let pymolfold = PymolFold::new(pf_transport.clone());
        let options = BatchOptions {
            max_esmfold_length: 6,
            ..BatchOptions::default()
        };
        let mut session = Session::new(dir.path());
        let records = [
            record("p1", "MKT"),
            record("p2", "MKTAYIAK"),
            record("p3", "GGG"),
        ];

        let started = tokio::time::Instant::now();
        let rows = run(
            &records,
            &esmfold,
            &pymolfold,
            &options,
            &mut session,
            &ProgressReporter::new(),
        )
        .await;

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].method, "esmfold");
        assert_eq!(rows[0].mean_plddt, Some(90.0));
        assert_eq!(rows[1].method, "pymolfold");
        assert!(rows[1].path.as_deref().unwrap().ends_with("p2_1.pdb"));
        assert_eq!(rows[2].name, "p3");
        assert_eq!(rows[2].path, None);
        assert_eq!(esm_transport.requests().len(), 2);
        assert_eq!(pf_transport.requests().len(), 1);
        assert!(started.elapsed() >= DEFAULT_ESMFOLD_DELAY);
    }
}
