use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use crate::workdir::{WorkdirManager, default_config_file, expand_tilde};
use pymolfold::engine::config::{NvcfConfigBuilder, StatusPolicy};
use pymolfold::workflows::batch::BatchOptions;
use pymolfold::workflows::session::Session;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Precedence: command-line flags, then `--set`, then the config file, then defaults.
pub fn build_config(args: &ConfigArgs, workdir_manager: &WorkdirManager) -> Result<AppConfig> {
    let config_path = args
        .config
        .clone()
        .or_else(|| default_config_file().filter(|p| p.is_file()));

    let file_config = match &config_path {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    merge(args, file_config, workdir_manager.current()?)
}

fn merge(args: &ConfigArgs, file_config: FileConfig, persisted_workdir: PathBuf) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let nvcf_file = file_config.nvcf.take().unwrap_or_default();
    let batch_file = file_config.batch.take().unwrap_or_default();

    let poll_seconds = args
        .poll_seconds
        .or(nvcf_file.poll_seconds)
        .unwrap_or(defaults.poll_seconds);
    let timeout_seconds = args
        .timeout_seconds
        .or(nvcf_file.timeout_seconds)
        .unwrap_or(defaults.timeout_seconds);
    let max_wait_seconds = args
        .max_wait_seconds
        .or(nvcf_file.max_wait_seconds)
        .unwrap_or(defaults.max_wait_seconds);
    let poll_interval_seconds = nvcf_file
        .poll_interval_seconds
        .unwrap_or(defaults.poll_interval_seconds);
    let terminal_statuses = nvcf_file
        .terminal_statuses
        .unwrap_or(defaults.terminal_statuses);

    let nvcf = NvcfConfigBuilder::new()
        .poll_seconds(poll_seconds)
        .timeout(Duration::from_secs(timeout_seconds))
        .poll_interval(Duration::from_secs(poll_interval_seconds))
        .max_wait(Duration::from_secs(max_wait_seconds))
        .status_url(nvcf_file.status_url.unwrap_or(defaults.status_url))
        .status_policy(StatusPolicy::new(terminal_statuses))
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let mut session = Session::new(expand_tilde(
        &file_config.workdir.take().unwrap_or(persisted_workdir),
    ));
    if let Some(workdir) = &args.workdir {
        session.set_workdir(expand_tilde(workdir));
    }
    session.set_base_url(
        &args
            .base_url
            .clone()
            .or(file_config.base_url.take())
            .unwrap_or(defaults.base_url),
    );

    let batch = BatchOptions {
        max_esmfold_length: batch_file
            .max_esmfold_length
            .unwrap_or(defaults.max_esmfold_length),
        delay: Duration::from_secs(batch_file.delay_seconds.unwrap_or(defaults.delay_seconds)),
        ..BatchOptions::default()
    };

    let config = AppConfig {
        session,
        nvcf,
        api_key_env: file_config.api_key_env.unwrap_or(defaults.api_key_env),
        token_file: file_config.token_file.map(|p| expand_tilde(&p)),
        batch,
    };
    debug!(
        workdir = ?config.session.workdir(),
        base_url = config.session.base_url(),
        poll_seconds,
        timeout_seconds,
        "Configuration resolved"
    );
    Ok(config)
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value) =
            parser::parse_key_value(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;
        let number = |key: &str, value: &str| {
            parser::parse_number(key, value).map_err(|e| CliError::Config(e.to_string()))
        };

        match key {
            "workdir" => config.workdir = Some(PathBuf::from(value)),
            "base-url" => config.base_url = Some(value.to_string()),
            "api-key-env" => config.api_key_env = Some(value.to_string()),
            "token-file" => config.token_file = Some(PathBuf::from(value)),
            "nvcf.poll-seconds" => {
                config.nvcf.get_or_insert_with(Default::default).poll_seconds =
                    Some(number(key, value)?);
            }
            "nvcf.timeout-seconds" => {
                config.nvcf.get_or_insert_with(Default::default).timeout_seconds =
                    Some(number(key, value)?);
            }
            "nvcf.poll-interval-seconds" => {
                config
                    .nvcf
                    .get_or_insert_with(Default::default)
                    .poll_interval_seconds = Some(number(key, value)?);
            }
            "nvcf.max-wait-seconds" => {
                config.nvcf.get_or_insert_with(Default::default).max_wait_seconds =
                    Some(number(key, value)?);
            }
            "nvcf.status-url" => {
                config.nvcf.get_or_insert_with(Default::default).status_url =
                    Some(value.to_string());
            }
            "nvcf.terminal-statuses" => {
                config
                    .nvcf
                    .get_or_insert_with(Default::default)
                    .terminal_statuses = Some(
                    parser::parse_status_list(value)
                        .map_err(|e| CliError::Config(e.to_string()))?,
                );
            }
            "batch.max-esmfold-length" => {
                config
                    .batch
                    .get_or_insert_with(Default::default)
                    .max_esmfold_length = Some(
                    parser::parse_number(key, value)
                        .map_err(|e| CliError::Config(e.to_string()))?,
                );
            }
            "batch.delay-seconds" => {
                config.batch.get_or_insert_with(Default::default).delay_seconds =
                    Some(number(key, value)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
