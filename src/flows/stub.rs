// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test doubles and fixtures for flows and the runner.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::errors::FlowExecutionError;
use crate::registry::{ArtifactFile, Design, FlowType, Metadata};
use crate::traits::{Flow, FlowContext, FlowOutput};

/// Write `files` under `<dir>/<design_id>/sources` and return a [`Design`]
/// pointing at them, without going through a registry.
pub fn design_fixture(dir: &Path, design_id: &str, files: &[(&str, &str)]) -> Design {
    let sources_dir = dir.join(design_id).join("sources");
    fs::create_dir_all(&sources_dir).unwrap();
    for (name, contents) in files {
        fs::write(sources_dir.join(name), contents).unwrap();
    }
    Design {
        design_id: design_id.to_string(),
        dataset_source: "fixture".to_string(),
        metadata: Metadata::new(),
        files: files.iter().map(|(name, _)| name.to_string()).collect(),
        artifacts: BTreeMap::new(),
        runs: BTreeMap::new(),
        created_at: Utc::now(),
        sources_dir,
    }
}

pub fn context_for(design: Design, scratch_dir: &Path, timeout: Duration) -> FlowContext {
    FlowContext {
        design,
        scratch_dir: scratch_dir.to_path_buf(),
        timeout,
        cancellation: CancellationToken::new(),
    }
}

/// Configurable flow: succeeds by default, fails or sleeps for chosen designs,
/// and counts how it was driven.
pub struct StubFlow {
    flow_id: String,
    tool_version: Option<String>,
    failing: HashSet<String>,
    slow: HashSet<String>,
    delay: Duration,
    applicable: Option<HashSet<String>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubFlow {
    pub fn new(flow_id: &str) -> Self {
        Self {
            flow_id: flow_id.to_string(),
            tool_version: None,
            failing: HashSet::new(),
            slow: HashSet::new(),
            delay: Duration::ZERO,
            applicable: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_tool_version(mut self, version: &str) -> Self {
        self.tool_version = Some(version.to_string());
        self
    }

    pub fn failing_for(mut self, design_ids: &[&str]) -> Self {
        self.failing.extend(design_ids.iter().map(|id| id.to_string()));
        self
    }

    /// Sleep `delay` in `run_one` for the given designs, or for every design
    /// when `design_ids` is empty.
    pub fn sleeping_for(mut self, design_ids: &[&str], delay: Duration) -> Self {
        self.slow.extend(design_ids.iter().map(|id| id.to_string()));
        self.delay = delay;
        self
    }

    pub fn applicable_to(mut self, design_ids: &[&str]) -> Self {
        self.applicable = Some(design_ids.iter().map(|id| id.to_string()).collect());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn sleeps_for(&self, design_id: &str) -> bool {
        !self.delay.is_zero() && (self.slow.is_empty() || self.slow.contains(design_id))
    }
}

#[async_trait]
impl Flow for StubFlow {
    fn flow_id(&self) -> &str {
        &self.flow_id
    }

    fn flow_type(&self) -> FlowType {
        FlowType::Text
    }

    fn tool_version(&self) -> Option<String> {
        self.tool_version.clone()
    }

    fn is_applicable(&self, design: &Design) -> bool {
        self.applicable
            .as_ref()
            .map_or(true, |ids| ids.contains(&design.design_id))
    }

    async fn run_one(&self, ctx: &FlowContext) -> Result<FlowOutput, FlowExecutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let design_id = ctx.design.design_id.clone();
        if self.sleeps_for(&design_id) {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&design_id) {
            return Err(FlowExecutionError::analysis(format!("stub failure for {}", design_id)));
        }

        // Staged files must come from scratch; prove the runner gave us one.
        let staged = ctx.scratch_dir().join("stub.json");
        fs::write(&staged, b"{}").map_err(|e| FlowExecutionError::io(&staged, e))?;

        Ok(FlowOutput::new(json!({ "design_id": design_id }))
            .with_file(ArtifactFile::inline("stub.txt", design_id.into_bytes()))
            .with_file(ArtifactFile::staged("stub.json", staged)))
    }
}

/// Write an executable shell script standing in for an external tool.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}
