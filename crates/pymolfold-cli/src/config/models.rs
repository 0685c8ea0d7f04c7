use pymolfold::engine::config::NvcfConfig;
use pymolfold::engine::credentials::Credential;
use pymolfold::engine::error::NvcfError;
use pymolfold::workflows::batch::BatchOptions;
use pymolfold::workflows::session::Session;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Resolved working directory and PymolFold server address.
    pub session: Session,
    pub nvcf: NvcfConfig,
    pub api_key_env: String,
    pub token_file: Option<PathBuf>,
    pub batch: BatchOptions,
}

impl AppConfig {
    /// A fresh session for one command; objects registered in it stay local to that run.
    pub fn session(&self) -> Session {
        self.session.clone()
    }

    /// Looked up only by commands that reach NVIDIA Cloud Functions.
    pub fn credential(&self) -> Result<Credential, NvcfError> {
        Credential::resolve(&self.api_key_env, self.token_file.as_deref())
    }
}
