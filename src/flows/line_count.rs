// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;

use crate::errors::FlowExecutionError;
use crate::registry::{ArtifactFile, Design, FlowType};
use crate::traits::{Flow, FlowContext, FlowOutput};

/// Counts source lines across every file of a design, HDL and memory-init
/// files alike.
pub struct LineCountFlow;

impl LineCountFlow {
    pub const FLOW_ID: &'static str = "line_count";

    pub fn new() -> Self {
        Self
    }
}

impl Default for LineCountFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn count_lines(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    match bytes.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

#[async_trait]
impl Flow for LineCountFlow {
    fn flow_id(&self) -> &str {
        Self::FLOW_ID
    }

    fn flow_type(&self) -> FlowType {
        FlowType::Text
    }

    fn is_applicable(&self, design: &Design) -> bool {
        !design.files.is_empty()
    }

    async fn run_one(&self, ctx: &FlowContext) -> Result<FlowOutput, FlowExecutionError> {
        let mut per_file = BTreeMap::new();
        let mut total = 0usize;
        for (name, path) in ctx.design.files.iter().zip(ctx.design.source_paths()) {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| FlowExecutionError::io(&path, e))?;
            let lines = count_lines(&bytes);
            total += lines;
            per_file.insert(name.clone(), lines);
        }

        Ok(
            FlowOutput::new(json!({ "num_lines": total, "per_file": per_file }))
                .with_file(ArtifactFile::inline("num_lines.txt", total.to_string())),
        )
    }
}
