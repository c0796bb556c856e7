// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

use crate::errors::FlowExecutionError;
use crate::registry::{ArtifactFile, Design, FlowType};
use crate::traits::{Flow, FlowContext, FlowOutput};

static COMMENTS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").ok());

static MODULE_DECLARATION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|[\s;])(?:macro)?module\s+(?:automatic\s+|static\s+)?([A-Za-z_][A-Za-z0-9_$]*)").ok()
});

/// Lists the modules a design declares, in source order.
///
/// A lexical scan, not an elaboration: declarations inside `ifdef` branches
/// are all counted.
pub struct ModuleInfoFlow;

impl ModuleInfoFlow {
    pub const FLOW_ID: &'static str = "module_info";

    pub fn new() -> Self {
        Self
    }
}

impl Default for ModuleInfoFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Module names declared in `source`, deduplicated, first occurrence wins.
pub fn declared_modules(source: &str) -> Result<Vec<String>, FlowExecutionError> {
    let (Some(comments), Some(declaration)) = (COMMENTS.as_ref(), MODULE_DECLARATION.as_ref()) else {
        return Err(FlowExecutionError::analysis("module scanner patterns failed to compile"));
    };

    let stripped = comments.replace_all(source, " ");
    let mut modules: Vec<String> = Vec::new();
    for captures in declaration.captures_iter(&stripped) {
        let name = &captures[1];
        if !modules.iter().any(|m| m == name) {
            modules.push(name.to_string());
        }
    }
    Ok(modules)
}

#[async_trait]
impl Flow for ModuleInfoFlow {
    fn flow_id(&self) -> &str {
        Self::FLOW_ID
    }

    fn flow_type(&self) -> FlowType {
        FlowType::Text
    }

    fn is_applicable(&self, design: &Design) -> bool {
        !design.verilog_sources().is_empty()
    }

    async fn run_one(&self, ctx: &FlowContext) -> Result<FlowOutput, FlowExecutionError> {
        let mut modules: Vec<String> = Vec::new();
        for path in ctx.design.verilog_sources() {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| FlowExecutionError::io(&path, e))?;
            for name in declared_modules(&String::from_utf8_lossy(&bytes))? {
                if !modules.contains(&name) {
                    modules.push(name);
                }
            }
        }

        let listing = modules.join("\n");
        Ok(FlowOutput::new(json!({
            "modules": modules,
            "num_modules": modules.len(),
        }))
        .with_file(ArtifactFile::inline("modules.txt", listing))
        .with_file(ArtifactFile::inline("num_modules.txt", modules.len().to_string())))
    }
}
