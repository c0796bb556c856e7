// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashSet;
use std::ffi::OsStr;

use super::tool::run_tool;
use crate::errors::FlowExecutionError;
use crate::registry::{ArtifactFile, Design, FlowType};
use crate::traits::{Flow, FlowContext, FlowOutput};

/// Concrete syntax trees from `verible-verilog-syntax`, one `<stem>.ast.json`
/// per Verilog source.
pub struct VeribleAstFlow {
    verible_bin: String,
    tool_version: Option<String>,
}

impl VeribleAstFlow {
    pub const FLOW_ID: &'static str = "verible_ast";

    pub fn new(verible_bin: impl Into<String>) -> Self {
        Self {
            verible_bin: verible_bin.into(),
            tool_version: None,
        }
    }

    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = Some(version.into());
        self
    }
}

#[async_trait]
impl Flow for VeribleAstFlow {
    fn flow_id(&self) -> &str {
        Self::FLOW_ID
    }

    fn flow_type(&self) -> FlowType {
        FlowType::Graph
    }

    fn tool_version(&self) -> Option<String> {
        self.tool_version.clone()
    }

    fn is_applicable(&self, design: &Design) -> bool {
        !design.verilog_sources().is_empty()
    }

    async fn run_one(&self, ctx: &FlowContext) -> Result<FlowOutput, FlowExecutionError> {
        let mut output = FlowOutput::new(serde_json::Value::Null);
        let mut names = Vec::new();
        let mut seen = HashSet::new();

        for source in ctx.design.verilog_sources() {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = format!("{}.ast.json", stem);
            if !seen.insert(name.clone()) {
                return Err(FlowExecutionError::analysis(format!(
                    "two sources share the stem '{}'",
                    stem
                )));
            }

            let parsed = run_tool(
                ctx,
                &self.verible_bin,
                [OsStr::new("--export_json"), OsStr::new("--printtree"), source.as_os_str()],
            )
            .await?;
            let tree: serde_json::Value = serde_json::from_str(&parsed.stdout).map_err(|e| {
                FlowExecutionError::analysis(format!(
                    "unparseable syntax tree for {}: {}",
                    source.display(),
                    e
                ))
            })?;
            let pretty = serde_json::to_vec_pretty(&tree)
                .map_err(|e| FlowExecutionError::analysis(e.to_string()))?;

            output = output.with_file(ArtifactFile::inline(name.clone(), pretty));
            names.push(name);
        }

        output.data = json!({ "asts": names, "num_files": names.len() });
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::stub::{context_for, design_fixture};
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_applicability() {
        let dir = TempDir::new().unwrap();
        let flow = VeribleAstFlow::new("verible-verilog-syntax");
        let verilog = design_fixture(dir.path(), "a", &[("a.sv", "")]);
        let data = design_fixture(dir.path(), "b", &[("b.mif", "")]);
        assert!(flow.is_applicable(&verilog));
        assert!(!flow.is_applicable(&data));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_one_tree_per_source() {
        let dir = TempDir::new().unwrap();
        let bin = crate::flows::stub::fake_tool(
            dir.path(),
            "verible-verilog-syntax",
            r#"[ "$1" = "--export_json" ] || exit 2
printf '{"%s":{"tree":{"tag":"kDescriptionList"}}}' "$(basename "$3")""#,
        );
        let design = design_fixture(
            dir.path(),
            "fifo",
            &[("fifo.v", "module fifo; endmodule"), ("fifo_pkg.svh", "`define D 4"), ("init.mem", "00")],
        );
        let scratch = TempDir::new().unwrap();
        let ctx = context_for(design, scratch.path(), Duration::from_secs(10));

        let output = VeribleAstFlow::new(bin.to_string_lossy()).run_one(&ctx).await.unwrap();
        assert_eq!(output.data["num_files"], 2);
        assert_eq!(output.data["asts"], json!(["fifo.ast.json", "fifo_pkg.ast.json"]));
        match &output.files[0] {
            ArtifactFile::Inline { contents, .. } => {
                let tree: serde_json::Value = serde_json::from_slice(contents).unwrap();
                assert_eq!(tree["fifo.v"]["tree"]["tag"], "kDescriptionList");
            }
            other => panic!("expected inline file, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_garbage_output_is_analysis_error() {
        let dir = TempDir::new().unwrap();
        let bin = crate::flows::stub::fake_tool(dir.path(), "verible-verilog-syntax", "echo 'not json'");
        let design = design_fixture(dir.path(), "x", &[("x.v", "module x; endmodule")]);
        let scratch = TempDir::new().unwrap();
        let ctx = context_for(design, scratch.path(), Duration::from_secs(10));

        let err = VeribleAstFlow::new(bin.to_string_lossy()).run_one(&ctx).await.unwrap_err();
        assert!(matches!(err, FlowExecutionError::Analysis { .. }));
    }
}
