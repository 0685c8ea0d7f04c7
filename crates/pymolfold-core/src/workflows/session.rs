use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::predictors::esmfold::{DEFAULT_PYMOLFOLD_BASE_URL, normalize_base_url};

/// Per-user context that outlives single predictions.
///
/// Holds the directory results are written to, the PymolFold server address,
/// and which viewer object came from which file.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    workdir: PathBuf,
    base_url: String,
    objects: BTreeMap<String, PathBuf>,
}

impl Session {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            base_url: DEFAULT_PYMOLFOLD_BASE_URL.to_string(),
            objects: BTreeMap::new(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn set_workdir(&mut self, workdir: impl Into<PathBuf>) {
        self.workdir = workdir.into();
        debug!(workdir = %self.workdir.display(), "Working directory changed");
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = normalize_base_url(base_url);
    }

    /// Later registrations under the same name replace earlier ones.
    pub fn register_object(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.objects.insert(name.into(), path.into());
    }

    pub fn object_path(&self, name: &str) -> Option<&Path> {
        self.objects.get(name).map(PathBuf::as_path)
    }

    pub fn objects(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.objects.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }
}
