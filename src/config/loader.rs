// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::consts::{DEFAULT_N_JOBS, DEFAULT_TIMEOUT_SECONDS};
use crate::errors::ConfigError;

/// One dataset-curation session: where the dataset lives, which corpora to
/// retrieve into it and which flows to run over it.
///
/// # Example
/// ```yaml
/// dataset:
///   path: ./dataset
///   overwrite: false
/// runner:
///   n_jobs: 4
///   timeout_seconds: 300
/// retrievers:
///   - kind: local_directory
///     dataset_source: iscas85
///     options:
///       path: ./bench/iscas85
///       layout: per_file
/// flows:
///   - kind: module_info
///   - kind: yosys_aig
///     options:
///       yosys_bin: yosys
///       tool_version: "0.38"
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub retrievers: Vec<RetrieverConfig>,
    #[serde(default)]
    pub flows: Vec<FlowConfig>,
}

#[derive(Debug, Deserialize)]
pub struct DatasetConfig {
    pub path: PathBuf,
    /// Destroy and recreate the dataset directory on open.
    #[serde(default)]
    pub overwrite: bool,
}

/// Flow runner options. Unset values fall back to the built-in defaults.
#[derive(Debug, Deserialize, Default)]
pub struct RunnerConfig {
    pub n_jobs: Option<usize>,
    pub timeout_seconds: Option<u64>,
    /// Recompute designs that already hold a current artifact.
    #[serde(default)]
    pub overwrite: bool,
    /// Parent directory for per-job scratch directories (defaults to the system temp dir).
    pub scratch_dir: Option<PathBuf>,
}

impl RunnerConfig {
    pub fn get_n_jobs(&self) -> usize {
        self.n_jobs.unwrap_or(DEFAULT_N_JOBS)
    }

    pub fn get_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }
}

#[derive(Debug, Deserialize)]
pub struct RetrieverConfig {
    /// Lookup key in the retriever table, e.g. `local_directory`.
    pub kind: String,
    pub dataset_source: String,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
pub struct FlowConfig {
    /// Lookup key in the flow table, e.g. `yosys_aig`.
    pub kind: String,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>,
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a config from a YAML file and reject it unless every retriever and
/// flow kind is known and the runner limits are usable.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg)?;
    Ok(cfg)
}
