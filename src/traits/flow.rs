// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::errors::FlowExecutionError;
use crate::registry::{ArtifactFile, Design, FlowType};

/// One unit of per-design analysis.
///
/// Implementations are stateless across designs: `run_one` for one design
/// never depends on another design having been processed, and the runner may
/// call it concurrently for distinct designs. Flows never touch the dataset
/// directory; everything they produce goes back through [`FlowOutput`].
#[async_trait]
pub trait Flow: Send + Sync {
    /// Stable identifier; also the artifact slot name.
    fn flow_id(&self) -> &str;

    fn flow_type(&self) -> FlowType;

    /// Version of the underlying tool, if any. Artifacts produced under a
    /// different version are considered stale.
    fn tool_version(&self) -> Option<String> {
        None
    }

    /// Pure, deterministic applicability check. Must not block or spawn processes.
    fn is_applicable(&self, design: &Design) -> bool;

    async fn run_one(&self, ctx: &FlowContext) -> Result<FlowOutput, FlowExecutionError>;
}

/// Everything a flow gets for one design.
///
/// `scratch_dir` is private to this job and is removed by the runner once the
/// job ends, whatever the outcome.
#[derive(Debug, Clone)]
pub struct FlowContext {
    pub design: Design,
    pub scratch_dir: PathBuf,
    pub timeout: Duration,
    pub cancellation: CancellationToken,
}

impl FlowContext {
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }
}

/// Result payload of a successful `run_one`.
#[derive(Debug, Clone)]
pub struct FlowOutput {
    pub data: serde_json::Value,
    pub files: Vec<ArtifactFile>,
}

impl FlowOutput {
    pub fn new(data: serde_json::Value) -> Self {
        Self {
            data,
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: ArtifactFile) -> Self {
        self.files.push(file);
        self
    }
}
