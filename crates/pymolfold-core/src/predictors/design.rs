//! ProteinMPNN endpoints of the CloudMol API.
//!
//! All three take a structure file as a multipart upload and answer with JSON:
//! sequence design (`mpnn/`), scoring of one point mutation (`signlemut/`, the
//! server's spelling) and a deep mutational scan over every position (`dms/`).

use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::error::PredictError;
use super::esmfold::{DEFAULT_FORM_TIMEOUT, DEFAULT_PYMOLFOLD_BASE_URL, normalize_base_url};
use crate::core::io::dms::DmsRow;
use crate::core::io::fasta::FastaRecord;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::transport::{FilePart, RequestBody, Transport, TransportRequest};

const SERVICE: &str = "proteinmpnn";
const UPLOAD_FIELD: &str = "file";

/// A structure as it is uploaded: file name plus PDB text.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureUpload {
    pub file_name: String,
    pub content: String,
}

impl StructureUpload {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Query parameters of a design run. Unset positions and chains are left to the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesignOptions {
    /// Residues kept fixed, e.g. `A12,A13`.
    pub fix_pos: Option<String>,
    /// Chains to redesign.
    pub chain: Option<String>,
    /// Amino acids excluded from the designs.
    pub rm_aa: Option<String>,
    /// Redesign the fixed positions instead of the free ones.
    pub inverse: bool,
    pub homooligomeric: bool,
}

impl DesignOptions {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        // Quotes come through from PyMOL command arguments.
        if let Some(fix_pos) = self.fix_pos.as_deref().map(|p| p.replace('"', "")) {
            params.push(("fix_pos", fix_pos));
        }
        if let Some(chain) = &self.chain {
            params.push(("chain", chain.clone()));
        }
        if let Some(rm_aa) = &self.rm_aa {
            params.push(("rm_aa", rm_aa.clone()));
        }
        params.push(("inverse", self.inverse.to_string()));
        params.push(("homooligomeric", self.homooligomeric.to_string()));
        params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub sequence: String,
    pub score: f64,
    /// Identity to the input sequence.
    pub seqid: f64,
}

/// FASTA records named `des_<i>,score=<score>,seqid=<seqid>`.
pub fn designs_to_fasta(designs: &[Design]) -> Vec<FastaRecord> {
    designs
        .iter()
        .enumerate()
        .map(|(i, d)| FastaRecord {
            id: format!("des_{},score={},seqid={}", i, d.score, d.seqid),
            description: None,
            sequence: d.sequence.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MutationScore {
    pub mutation: String,
    pub score: f64,
}

/// A point mutation in `<wild><resseq><mutant>` notation, e.g. `K12E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointMutation {
    pub wild: char,
    pub resseq: i32,
    pub mutant: char,
}

impl PointMutation {
    pub fn new(wild: char, resseq: i32, mutant: char) -> Result<Self, PredictError> {
        let wild = wild.to_ascii_uppercase();
        let mutant = mutant.to_ascii_uppercase();
        for residue in [wild, mutant] {
            if !is_amino_acid(residue) {
                return Err(PredictError::InvalidInput(format!(
                    "'{}' is not a one-letter amino acid code",
                    residue
                )));
            }
        }
        Ok(Self {
            wild,
            resseq,
            mutant,
        })
    }

    pub fn parse(text: &str) -> Result<Self, PredictError> {
        let text = text.trim();
        let invalid =
            || PredictError::InvalidInput(format!("'{}' is not a point mutation like K12E", text));
        let mut chars = text.chars();
        let wild = chars.next().ok_or_else(invalid)?;
        let mutant = chars.next_back().ok_or_else(invalid)?;
        let resseq = chars.as_str().parse().map_err(|_| invalid())?;
        Self::new(wild, resseq, mutant)
    }
}

impl std::fmt::Display for PointMutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.wild, self.resseq, self.mutant)
    }
}

fn is_amino_acid(c: char) -> bool {
    "ACDEFGHIKLMNPQRSTVWY".contains(c)
}

#[derive(Deserialize)]
struct DesignColumns {
    seq: Vec<String>,
    score: Vec<f64>,
    seqid: Vec<f64>,
}

#[derive(Deserialize)]
struct DmsColumns {
    mutation: Vec<String>,
    #[serde(rename = "002")]
    noise_002: Vec<f64>,
    #[serde(rename = "010")]
    noise_010: Vec<f64>,
    #[serde(rename = "020")]
    noise_020: Vec<f64>,
    #[serde(rename = "030")]
    noise_030: Vec<f64>,
    ensemble: Vec<f64>,
}

impl DmsColumns {
    /// Rows stop at the shortest column.
    fn into_rows(self) -> Vec<DmsRow> {
        let len = [
            self.mutation.len(),
            self.noise_002.len(),
            self.noise_010.len(),
            self.noise_020.len(),
            self.noise_030.len(),
            self.ensemble.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0);
        (0..len)
            .map(|i| DmsRow {
                mutation: self.mutation[i].clone(),
                noise_002: self.noise_002[i],
                noise_010: self.noise_010[i],
                noise_020: self.noise_020[i],
                noise_030: self.noise_030[i],
                ensemble: self.ensemble[i],
            })
            .collect()
    }
}

/// Client for the CloudMol ProteinMPNN endpoints.
pub struct ProteinMpnn {
    transport: Arc<dyn Transport>,
    base_url: String,
    timeout: Duration,
}

impl ProteinMpnn {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_base_url(transport, DEFAULT_PYMOLFOLD_BASE_URL)
    }

    pub fn with_base_url(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: normalize_base_url(base_url),
            timeout: DEFAULT_FORM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn design(
        &self,
        structure: &StructureUpload,
        options: &DesignOptions,
        reporter: &ProgressReporter<'_>,
    ) -> Result<Vec<Design>, PredictError> {
        let body = self
            .upload("mpnn/", &options.query(), structure, "Designing", reporter)
            .await?;
        let columns: DesignColumns = serde_json::from_str(&body)?;
        let designs: Vec<Design> = columns
            .seq
            .into_iter()
            .zip(columns.score)
            .zip(columns.seqid)
            .map(|((sequence, score), seqid)| Design {
                sequence,
                score,
                seqid,
            })
            .collect();
        info!(count = designs.len(), "Designs received");
        Ok(designs)
    }

    pub async fn score_mutation(
        &self,
        structure: &StructureUpload,
        mutation: PointMutation,
        reporter: &ProgressReporter<'_>,
    ) -> Result<MutationScore, PredictError> {
        let params = [
            ("wild", mutation.wild.to_string()),
            ("resseq", mutation.resseq.to_string()),
            ("mut", mutation.mutant.to_string()),
        ];
        let body = self
            .upload("signlemut/", &params, structure, "Scoring mutation", reporter)
            .await?;
        let score: MutationScore = serde_json::from_str(&body)?;
        info!(mutation = %score.mutation, score = score.score, "Mutation scored");
        Ok(score)
    }

    pub async fn deep_mutational_scan(
        &self,
        structure: &StructureUpload,
        reporter: &ProgressReporter<'_>,
    ) -> Result<Vec<DmsRow>, PredictError> {
        let body = self
            .upload("dms/", &[], structure, "Scanning mutations", reporter)
            .await?;
        let columns: DmsColumns = serde_json::from_str(&body)?;
        let rows = columns.into_rows();
        info!(mutations = rows.len(), "Deep mutational scan received");
        Ok(rows)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn upload(
        &self,
        path: &str,
        params: &[(&str, String)],
        structure: &StructureUpload,
        phase: &'static str,
        reporter: &ProgressReporter<'_>,
    ) -> Result<String, PredictError> {
        let endpoint = self.endpoint(path);
        let url = if params.is_empty() {
            Url::parse(&endpoint)
        } else {
            Url::parse_with_params(&endpoint, params)
        }
        .map_err(|e| PredictError::InvalidInput(format!("bad URL '{}': {}", endpoint, e)))?;

        reporter.report(Progress::PhaseStart { name: phase });
        info!(url = %endpoint, file = %structure.file_name, "Uploading structure");
        let body = RequestBody::File(FilePart {
            field: UPLOAD_FIELD.to_string(),
            file_name: structure.file_name.clone(),
            content: structure.content.clone(),
        });
        let request = TransportRequest::post(url.as_str(), body, self.timeout)
            .with_header("accept", "application/json");
        let response = self.transport.send(request).await?;
        reporter.report(Progress::PhaseFinish);
        debug!(status = response.status, "Received response");

        if !response.is_success() {
            return Err(PredictError::Service {
                service: SERVICE,
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }
}
