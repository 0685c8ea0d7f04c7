use crate::error::{CliError, Result};
use directories::{BaseDirs, ProjectDirs};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DEFAULT_WORKDIR_NAME: &str = "PymolFold_workdir";

/// Persists the working directory chosen with `workdir set` across runs.
#[derive(Debug)]
pub struct WorkdirManager {
    path_config: PathBuf,
    default_path: PathBuf,
}

impl WorkdirManager {
    pub fn new() -> Result<Self> {
        let manager = Self {
            path_config: Self::get_path_config_file()?,
            default_path: Self::get_default_workdir()?,
        };
        debug!("WorkdirManager initialized with config file: {:?}", &manager.path_config);
        Ok(manager)
    }

    #[cfg(test)]
    fn with_locations(path_config: PathBuf, default_path: PathBuf) -> Self {
        Self {
            path_config,
            default_path,
        }
    }

    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    /// The persisted custom directory, or the default one.
    pub fn current(&self) -> Result<PathBuf> {
        if !self.path_config.exists() {
            return Ok(self.default_path.clone());
        }
        let custom = fs::read_to_string(&self.path_config)?.trim().to_string();
        if custom.is_empty() {
            warn!("Custom workdir config file is empty, falling back to default path.");
            Ok(self.default_path.clone())
        } else {
            Ok(PathBuf::from(custom))
        }
    }

    pub fn set_custom_path(&self, path: &Path) -> Result<PathBuf> {
        let expanded = expand_tilde(path);
        let path_str = expanded.to_str().ok_or_else(|| {
            CliError::Workdir(format!("Path {:?} is not valid UTF-8.", expanded))
        })?;
        if let Some(parent) = self.path_config.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path_config, path_str)?;
        Ok(expanded)
    }

    pub fn reset_path(&self) -> Result<()> {
        if self.path_config.exists() {
            fs::remove_file(&self.path_config)?;
        }
        Ok(())
    }

    fn get_path_config_file() -> Result<PathBuf> {
        ProjectDirs::from("org", "cloudmol", "pymolfold")
            .map(|dirs| dirs.config_dir().join("path.conf"))
            .ok_or_else(|| {
                CliError::Workdir("Could not determine config directory path.".to_string())
            })
    }

    fn get_default_workdir() -> Result<PathBuf> {
        BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(DEFAULT_WORKDIR_NAME))
            .ok_or_else(|| {
                CliError::Workdir("Could not determine the home directory.".to_string())
            })
    }
}

/// Location of the user-level `config.toml`, whether or not it exists.
pub fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("org", "cloudmol", "pymolfold").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Replaces a leading `~` with the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn manager_in(dir: &Path) -> WorkdirManager {
        WorkdirManager::with_locations(dir.join("conf/path.conf"), dir.join("default"))
    }

    #[test]
    fn current_falls_back_to_default_without_config() {
        let dir = tempdir().unwrap();
        let manager = manager_in(dir.path());
        assert_eq!(manager.current().unwrap(), dir.path().join("default"));
    }

    #[test]
    fn set_and_reset_round_trip_through_config_file() {
        let dir = tempdir().unwrap();
        let manager = manager_in(dir.path());
        let custom = dir.path().join("custom");

        let stored = manager.set_custom_path(&custom).unwrap();
        assert_eq!(stored, custom);
        assert_eq!(manager.current().unwrap(), custom);

        manager.reset_path().unwrap();
        assert_eq!(manager.current().unwrap(), dir.path().join("default"));
        manager.reset_path().unwrap();
    }

    #[test]
    fn empty_config_file_uses_default() {
        let dir = tempdir().unwrap();
        let manager = manager_in(dir.path());
        fs::create_dir_all(dir.path().join("conf")).unwrap();
        fs::write(dir.path().join("conf/path.conf"), "  \n").unwrap();
        assert_eq!(manager.current().unwrap(), dir.path().join("default"));
    }

    #[test]
    fn expand_tilde_only_touches_leading_tilde() {
        assert_eq!(expand_tilde(Path::new("/tmp/~x")), PathBuf::from("/tmp/~x"));
        if let Some(dirs) = BaseDirs::new() {
            assert_eq!(expand_tilde(Path::new("~/runs")), dirs.home_dir().join("runs"));
        }
    }
}
