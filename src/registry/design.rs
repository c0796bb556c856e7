// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Records stored in the design registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::consts::is_verilog_source;

/// Open, source-specific design metadata (top module, family, tags, license, ...).
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// One hardware design instance as recorded in the registry index.
///
/// `files` are file names relative to the design's `sources/` directory.
/// Records handed out by the registry know where that directory lives, so
/// [`Design::source_paths`] resolves them to absolute paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Design {
    pub design_id: String,
    pub dataset_source: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub files: Vec<String>,
    #[serde(default)]
    pub artifacts: BTreeMap<String, ArtifactRecord>,
    #[serde(default)]
    pub runs: BTreeMap<String, FlowRunRecord>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) sources_dir: PathBuf,
}

impl Design {
    pub fn sources_dir(&self) -> &Path {
        &self.sources_dir
    }

    /// Absolute paths of every source file, in registration order.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| self.sources_dir.join(f)).collect()
    }

    /// Absolute paths of the Verilog/SystemVerilog sources only.
    pub fn verilog_sources(&self) -> Vec<PathBuf> {
        self.source_paths()
            .into_iter()
            .filter(|p| is_verilog_source(p))
            .collect()
    }

    pub fn has_artifact(&self, flow_id: &str) -> bool {
        self.artifacts.contains_key(flow_id)
    }

    pub fn artifact(&self, flow_id: &str) -> Option<&ArtifactRecord> {
        self.artifacts.get(flow_id)
    }

    pub fn run_record(&self, flow_id: &str) -> Option<&FlowRunRecord> {
        self.runs.get(flow_id)
    }
}

/// Input to [`crate::registry::DesignRegistry::add_design`].
///
/// `files` point at the original source files; the registry copies them into
/// the dataset. Source file names must be unique within a design.
#[derive(Debug, Clone)]
pub struct NewDesign {
    pub design_id: String,
    pub dataset_source: String,
    pub metadata: Metadata,
    pub files: Vec<PathBuf>,
}

impl NewDesign {
    pub fn new(design_id: impl Into<String>, dataset_source: impl Into<String>) -> Self {
        Self {
            design_id: design_id.into(),
            dataset_source: dataset_source.into(),
            metadata: Metadata::new(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn with_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Coarse classification of what a flow produces. Kept from the dataset's
/// original `flow_type` tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    Text,
    Graph,
    Source,
}

/// Metadata for the derived output of one successful flow run on one design.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactRecord {
    pub flow_id: String,
    pub flow_type: FlowType,
    #[serde(default)]
    pub tool_version: Option<String>,
    pub data: serde_json::Value,
    /// File names stored under `artifacts/<flow_id>/`.
    #[serde(default)]
    pub files: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A file to be stored alongside an artifact.
#[derive(Debug, Clone)]
pub enum ArtifactFile {
    /// Contents held in memory.
    Inline { name: String, contents: Vec<u8> },
    /// A file already written somewhere (usually the flow's scratch directory); copied in.
    Staged { name: String, path: PathBuf },
}

impl ArtifactFile {
    pub fn inline(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        ArtifactFile::Inline {
            name: name.into(),
            contents: contents.into(),
        }
    }

    pub fn staged(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ArtifactFile::Staged {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ArtifactFile::Inline { name, .. } | ArtifactFile::Staged { name, .. } => name,
        }
    }
}

/// Everything [`crate::registry::DesignRegistry::write_artifact`] persists for one (design, flow).
#[derive(Debug, Clone)]
pub struct ArtifactPayload {
    pub flow_type: FlowType,
    pub tool_version: Option<String>,
    pub data: serde_json::Value,
    pub files: Vec<ArtifactFile>,
}

/// Outcome of a (design, flow) execution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FlowRunStatus {
    Pending,
    Success,
    Failed,
    SkippedNotApplicable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowRunRecord {
    pub status: FlowRunStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
}

impl FlowRunRecord {
    pub fn failed(detail: impl Into<String>, tool_version: Option<String>) -> Self {
        Self {
            status: FlowRunStatus::Failed,
            timestamp: Utc::now(),
            detail: Some(detail.into()),
            tool_version,
        }
    }

    pub fn skipped_not_applicable() -> Self {
        Self {
            status: FlowRunStatus::SkippedNotApplicable,
            timestamp: Utc::now(),
            detail: None,
            tool_version: None,
        }
    }

    pub(crate) fn success(tool_version: Option<String>) -> Self {
        Self {
            status: FlowRunStatus::Success,
            timestamp: Utc::now(),
            detail: None,
            tool_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_serializes_kebab_case() {
        let json = serde_json::to_string(&FlowRunStatus::SkippedNotApplicable).unwrap();
        assert_eq!(json, "\"skipped-not-applicable\"");
        let status: FlowRunStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(status, FlowRunStatus::Failed);
    }

    #[test]
    fn test_source_paths_resolve_against_sources_dir() {
        let design = Design {
            design_id: "c17".to_string(),
            dataset_source: "iscas85".to_string(),
            metadata: Metadata::new(),
            files: vec!["c17.v".to_string(), "init.mem".to_string()],
            artifacts: BTreeMap::new(),
            runs: BTreeMap::new(),
            created_at: Utc::now(),
            sources_dir: PathBuf::from("/data/designs/c17/sources"),
        };

        assert_eq!(
            design.source_paths(),
            vec![
                PathBuf::from("/data/designs/c17/sources/c17.v"),
                PathBuf::from("/data/designs/c17/sources/init.mem"),
            ]
        );
        assert_eq!(
            design.verilog_sources(),
            vec![PathBuf::from("/data/designs/c17/sources/c17.v")]
        );
    }
}
