use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};

use super::session::Session;
use crate::core::confidence;
use crate::core::io::naming::safe_filename;
use crate::engine::transport::{Transport, TransportRequest};
use crate::predictors::error::PredictError;

pub const ALPHAFOLD_BASE_URL: &str = "https://alphafold.ebi.ac.uk/files/";
pub const ALPHAMISSENSE_BASE_URL: &str = "https://alphamissense.hegelab.org/structure/";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct FetchedStructure {
    pub path: PathBuf,
    pub object_name: String,
    pub source_url: String,
    pub mean_plddt: f64,
}

/// Endpoints for the structure databases; overridable for mirrors.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSources {
    pub alphafold: String,
    pub alphamissense: String,
    pub timeout: Duration,
}

impl Default for FetchSources {
    fn default() -> Self {
        Self {
            alphafold: ALPHAFOLD_BASE_URL.to_string(),
            alphamissense: ALPHAMISSENSE_BASE_URL.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

pub fn alphafold_model_name(uniprot_id: &str) -> String {
    format!("AF-{}-F1-model_v4", uniprot_id)
}

#[instrument(skip(transport, sources, session))]
pub async fn alphafold(
    transport: &dyn Transport,
    sources: &FetchSources,
    uniprot_id: &str,
    session: &mut Session,
) -> Result<FetchedStructure, PredictError> {
    let id = uniprot_id.trim().to_ascii_uppercase();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PredictError::InvalidInput(format!(
            "'{}' is not a UniProt accession",
            uniprot_id
        )));
    }
    let object_name = alphafold_model_name(&id);
    let url = format!("{}{}.pdb", sources.alphafold, object_name);
    download(transport, &url, object_name, "alphafold", sources.timeout, session).await
}

/// Redirects are followed by the transport; the file is named after `name`.
#[instrument(skip(transport, sources, session))]
pub async fn alphamissense(
    transport: &dyn Transport,
    sources: &FetchSources,
    name: &str,
    session: &mut Session,
) -> Result<FetchedStructure, PredictError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PredictError::InvalidInput("empty structure name".to_string()));
    }
    let url = format!("{}{}", sources.alphamissense, name);
    download(
        transport,
        &url,
        safe_filename(name),
        "alphamissense",
        sources.timeout,
        session,
    )
    .await
}

async fn download(
    transport: &dyn Transport,
    url: &str,
    object_name: String,
    service: &'static str,
    timeout: Duration,
    session: &mut Session,
) -> Result<FetchedStructure, PredictError> {
    let response = transport.send(TransportRequest::get(url, timeout)).await?;
    if !response.is_success() {
        return Err(PredictError::Service {
            service,
            status: response.status,
            body: response.body,
        });
    }

    fs::create_dir_all(session.workdir())?;
    let path = session.workdir().join(format!("{}.pdb", object_name));
    fs::write(&path, &response.body)?;
    session.register_object(object_name.clone(), path.clone());

    let source_url = if response.final_url.is_empty() {
        url.to_string()
    } else {
        response.final_url
    };
    info!(path = %path.display(), %source_url, "Structure downloaded");
    Ok(FetchedStructure {
        mean_plddt: confidence::mean_plddt(&response.body),
        path,
        object_name,
        source_url,
    })
}
