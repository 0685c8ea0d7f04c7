use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument};

use super::StructurePredictor;
use super::error::PredictError;
use crate::core::models::request::PredictionRequest;
use crate::core::models::result::PredictionResult;
use crate::core::sequence::{self, PolymerKind};
use crate::engine::nvcf::NvcfClient;
use crate::engine::progress::{Progress, ProgressReporter};

pub const BOLTZ2_URL: &str = "https://health.api.nvidia.com/v1/biology/mit/boltz2/predict";
pub const MSA_SEARCH_URL: &str =
    "https://health.api.nvidia.com/v1/biology/colabfold/msa-search/predict";

const MONOMER_CHAIN: &str = "A";

fn default_diffusion_samples() -> u32 {
    1
}

/// A multi-entity job as written by the complex builder front-end.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoltzJob {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub binding_affinity_settings: Option<AffinitySettings>,
    #[serde(default = "default_diffusion_samples")]
    pub diffusion_samples: u32,
}

impl BoltzJob {
    pub fn monomer(sequence: &str, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            entities: vec![Entity {
                kind: EntityKind::Protein,
                chain_id: MONOMER_CHAIN.to_string(),
                sequence: sequence.to_string(),
                cyclic: false,
                modifications: Vec::new(),
                msa: true,
                smiles_string: None,
                ccd_string: None,
            }],
            binding_affinity_settings: None,
            diffusion_samples: default_diffusion_samples(),
        }
    }

    /// Chain whose ligand gets an affinity prediction, parsed from `"... CHAIN_ID: B"`.
    pub fn affinity_target(&self) -> Option<String> {
        let settings = self.binding_affinity_settings.as_ref()?;
        if !settings.calculate_affinity {
            return None;
        }
        parse_chain_id(&settings.selected_ligand)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EntityKind {
    Protein,
    #[serde(rename = "DNA")]
    Dna,
    #[serde(rename = "RNA")]
    Rna,
    #[serde(rename = "Ligand (CCD)")]
    LigandCcd,
    #[serde(rename = "Ligand (SMILES)")]
    LigandSmiles,
    #[serde(other)]
    Unknown,
}

impl EntityKind {
    fn polymer_kind(self) -> Option<PolymerKind> {
        match self {
            EntityKind::Protein => Some(PolymerKind::Protein),
            EntityKind::Dna => Some(PolymerKind::Dna),
            EntityKind::Rna => Some(PolymerKind::Rna),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub chain_id: String,
    #[serde(default)]
    pub sequence: String,
    #[serde(default)]
    pub cyclic: bool,
    #[serde(default)]
    pub modifications: Vec<Value>,
    #[serde(default)]
    pub msa: bool,
    #[serde(default)]
    pub smiles_string: Option<String>,
    #[serde(default)]
    pub ccd_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AffinitySettings {
    #[serde(default)]
    pub calculate_affinity: bool,
    #[serde(default)]
    pub selected_ligand: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplingParams {
    pub recycling_steps: u32,
    pub sampling_steps: u32,
    pub diffusion_samples: u32,
    pub step_scale: f64,
    pub without_potentials: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            recycling_steps: 3,
            sampling_steps: 20,
            diffusion_samples: 1,
            step_scale: 1.6,
            without_potentials: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polymer {
    pub id: String,
    pub molecule_type: String,
    pub sequence: String,
    pub cyclic: bool,
    pub modifications: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msa: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ligand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ccd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smiles: Option<String>,
    pub id: String,
    pub predict_affinity: bool,
}

/// Request body of the Boltz2 function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoltzPayload {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub polymers: Vec<Polymer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ligands: Vec<Ligand>,
    #[serde(flatten)]
    pub sampling: SamplingParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplexPrediction {
    pub result: PredictionResult,
    pub name: Option<String>,
    pub affinity_target: Option<String>,
}

impl ComplexPrediction {
    pub fn plddt(&self, index: usize) -> Option<f64> {
        self.result.complex_plddt(index)
    }

    pub fn affinity_pic50(&self) -> Option<f64> {
        self.affinity_target
            .as_deref()
            .and_then(|chain| self.result.affinity_pic50(chain))
    }
}

/// Boltz2 structure prediction hosted on NVIDIA Cloud Functions.
pub struct Boltz2 {
    client: NvcfClient,
    url: String,
    msa_url: String,
    sampling: SamplingParams,
}

impl Boltz2 {
    pub fn new(client: NvcfClient) -> Self {
        Self {
            client,
            url: BOLTZ2_URL.to_string(),
            msa_url: MSA_SEARCH_URL.to_string(),
            sampling: SamplingParams::default(),
        }
    }

    pub fn with_urls(mut self, url: impl Into<String>, msa_url: impl Into<String>) -> Self {
        self.url = url.into();
        self.msa_url = msa_url.into();
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// ColabFold MSA search; returns the `alignments` object of the answer.
    pub async fn msa_search(
        &self,
        sequence: &str,
        reporter: &ProgressReporter<'_>,
    ) -> Result<Value, PredictError> {
        reporter.report(Progress::Message(format!(
            "Searching MSA for {} residues",
            sequence.len()
        )));
        let request = PredictionRequest::new(json!({
            "sequence": sequence,
            "e_value": 0.0001,
            "iterations": 1,
            "databases": ["Uniref30_2302"],
            "output_alignment_formats": ["a3m"],
        }));
        let result = self.client.call(&self.msa_url, &request, reporter).await?;
        result
            .as_json()
            .get("alignments")
            .cloned()
            .ok_or_else(|| PredictError::UnexpectedResponse {
                service: "msa-search",
                reason: "answer has no 'alignments' field".to_string(),
            })
    }

    /// Converts a front-end job into the request body, running MSA searches where asked.
    pub async fn build_payload(
        &self,
        job: &BoltzJob,
        reporter: &ProgressReporter<'_>,
    ) -> Result<BoltzPayload, PredictError> {
        let affinity_target = job.affinity_target();
        let mut polymers = Vec::new();
        let mut ligands = Vec::new();

        for entity in &job.entities {
            if let Some(kind) = entity.kind.polymer_kind() {
                let seq = entity.sequence.trim().to_ascii_uppercase();
                sequence::validate(&seq, kind)?;
                let msa = if kind != PolymerKind::Protein {
                    None
                } else if entity.msa {
                    Some(self.msa_search(&seq, reporter).await?)
                } else {
                    Some(placeholder_msa(&entity.chain_id, &seq))
                };
                polymers.push(Polymer {
                    id: entity.chain_id.clone(),
                    molecule_type: kind.as_str().to_string(),
                    sequence: seq,
                    cyclic: entity.cyclic,
                    modifications: entity.modifications.clone(),
                    msa,
                });
            } else if matches!(entity.kind, EntityKind::LigandCcd | EntityKind::LigandSmiles) {
                let text = entity
                    .smiles_string
                    .clone()
                    .filter(|s| !s.is_empty())
                    .or_else(|| entity.ccd_string.clone())
                    .unwrap_or_default();
                let (ccd, smiles) = if entity.kind == EntityKind::LigandSmiles {
                    (None, Some(text))
                } else {
                    (Some(text), None)
                };
                ligands.push(Ligand {
                    ccd,
                    smiles,
                    id: entity.chain_id.clone(),
                    predict_affinity: affinity_target.as_deref() == Some(entity.chain_id.as_str()),
                });
            }
        }

        if polymers.is_empty() && ligands.is_empty() {
            return Err(PredictError::InvalidInput(
                "job contains no polymers or ligands".to_string(),
            ));
        }

        Ok(BoltzPayload {
            polymers,
            ligands,
            sampling: SamplingParams {
                diffusion_samples: job.diffusion_samples,
                ..self.sampling.clone()
            },
        })
    }

    pub async fn submit(
        &self,
        payload: &BoltzPayload,
        reporter: &ProgressReporter<'_>,
    ) -> Result<PredictionResult, PredictError> {
        let request = PredictionRequest::from_serializable(payload)?;
        Ok(self.client.call(&self.url, &request, reporter).await?)
    }

    #[instrument(skip_all, fields(name = job.name.as_deref().unwrap_or("")))]
    pub async fn predict_job(
        &self,
        job: &BoltzJob,
        reporter: &ProgressReporter<'_>,
    ) -> Result<ComplexPrediction, PredictError> {
        let payload = self.build_payload(job, reporter).await?;
        info!(
            polymers = payload.polymers.len(),
            ligands = payload.ligands.len(),
            "Submitting Boltz2 job"
        );
        let result = self.submit(&payload, reporter).await?;
        Ok(ComplexPrediction {
            result,
            name: job.name.clone(),
            affinity_target: job.affinity_target(),
        })
    }
}

#[async_trait]
impl StructurePredictor for Boltz2 {
    fn name(&self) -> &'static str {
        "boltz2"
    }

    async fn predict(
        &self,
        sequence: &str,
        name: &str,
        reporter: &ProgressReporter<'_>,
    ) -> Result<PredictionResult, PredictError> {
        let job = BoltzJob::monomer(sequence, name);
        Ok(self.predict_job(&job, reporter).await?.result)
    }
}

fn placeholder_msa(chain_id: &str, sequence: &str) -> Value {
    json!({
        "uniref90": {
            "a3m": {
                "alignment": format!(">chain_{}\n{}", chain_id, sequence),
                "format": "a3m",
            }
        }
    })
}

fn parse_chain_id(selected: &str) -> Option<String> {
    let (_, rest) = selected.split_once("CHAIN_ID:")?;
    let id: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if id.is_empty() { None } else { Some(id) }
}
