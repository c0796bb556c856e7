// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};

use super::tool::run_tool;
use crate::config::consts::is_compilation_unit;
use crate::errors::FlowExecutionError;
use crate::registry::{ArtifactFile, Design, FlowType};
use crate::traits::{Flow, FlowContext, FlowOutput};

const SCRIPT_FILE: &str = "aig.ys";
const AIG_JSON_FILE: &str = "aig_yosys.json";
const STAT_JSON_FILE: &str = "stat.json";

/// Synthesizes a design to an and-inverter graph with Yosys.
///
/// Headers (`.vh`, `.svh`, ...) are not read directly; they are reached
/// through the sources directory on the include path.
pub struct YosysAigFlow {
    yosys_bin: String,
    tool_version: Option<String>,
    max_files: Option<usize>,
}

impl YosysAigFlow {
    pub const FLOW_ID: &'static str = "yosys_aig";

    pub fn new(yosys_bin: impl Into<String>) -> Self {
        Self {
            yosys_bin: yosys_bin.into(),
            tool_version: None,
            max_files: None,
        }
    }

    /// Skip designs with more than `max_files` compilation units; very large
    /// multi-file projects rarely elaborate without a curated file list.
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = Some(max_files);
        self
    }

    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = Some(version.into());
        self
    }
}

fn compilation_units(design: &Design) -> Vec<PathBuf> {
    design
        .verilog_sources()
        .into_iter()
        .filter(|p| is_compilation_unit(p))
        .collect()
}

fn quoted(path: &Path) -> String {
    format!("\"{}\"", path.display().to_string().replace('\\', "\\\\").replace('"', "\\\""))
}

/// Yosys script flattening the design into AIG form.
pub fn synthesis_script(sources: &[PathBuf], include_dir: &Path) -> String {
    let mut script = String::new();
    for source in sources {
        script.push_str(&format!("read_verilog -sv -I {} {}\n", quoted(include_dir), quoted(source)));
    }
    script.push_str("hierarchy -auto-top\n");
    script.push_str("proc\nflatten\nopt_clean\n");
    script.push_str("techmap\nopt\naigmap\nopt_clean\n");
    script.push_str(&format!("tee -q -o {} stat -json\n", STAT_JSON_FILE));
    script.push_str(&format!("write_json {}\n", AIG_JSON_FILE));
    script
}

async fn read_json(path: &Path) -> Result<serde_json::Value, FlowExecutionError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| FlowExecutionError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        FlowExecutionError::analysis(format!("yosys wrote malformed {}: {}", path.display(), e))
    })
}

#[async_trait]
impl Flow for YosysAigFlow {
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
        let units = compilation_units(design).len();
        units > 0 && self.max_files.map_or(true, |max| units <= max)
    }

    async fn run_one(&self, ctx: &FlowContext) -> Result<FlowOutput, FlowExecutionError> {
        let sources = compilation_units(&ctx.design);
        let script_path = ctx.scratch_dir().join(SCRIPT_FILE);
        tokio::fs::write(&script_path, synthesis_script(&sources, ctx.design.sources_dir()))
            .await
            .map_err(|e| FlowExecutionError::io(&script_path, e))?;

        let output = run_tool(ctx, &self.yosys_bin, ["-q", "-s", SCRIPT_FILE]).await?;

        let aig_path = ctx.scratch_dir().join(AIG_JSON_FILE);
        let stat_path = ctx.scratch_dir().join(STAT_JSON_FILE);
        let aig = read_json(&aig_path).await?;
        let stat = read_json(&stat_path).await?;

        let top_modules: Vec<String> = aig
            .get("modules")
            .and_then(|m| m.as_object())
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();

        Ok(FlowOutput::new(json!({
            "modules": top_modules,
            "num_cells": stat.pointer("/design/num_cells").cloned().unwrap_or(serde_json::Value::Null),
            "stat": stat,
        }))
        .with_file(ArtifactFile::staged(AIG_JSON_FILE, aig_path))
        .with_file(ArtifactFile::staged(STAT_JSON_FILE, stat_path))
        .with_file(ArtifactFile::inline("yosys.log", output.stderr)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::stub::{context_for, design_fixture};
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_script_reads_only_compilation_units() {
        let dir = TempDir::new().unwrap();
        let design = design_fixture(
            dir.path(),
            "alu",
            &[("alu.v", ""), ("defs.vh", ""), ("pkg.SV", ""), ("rom.mem", "")],
        );
        let sources = compilation_units(&design);
        let names: Vec<_> = sources
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["alu.v", "pkg.SV"]);

        let script = synthesis_script(&sources, design.sources_dir());
        assert_eq!(script.matches("read_verilog").count(), 2);
        assert!(!script.contains("defs.vh\""));
        assert!(script.contains("aigmap"));
        assert!(script.ends_with("write_json aig_yosys.json\n"));
    }

    #[test]
    fn test_applicability() {
        let dir = TempDir::new().unwrap();
        let headers = design_fixture(dir.path(), "hdr", &[("defs.vh", "`define W 8")]);
        assert!(!YosysAigFlow::new("yosys").is_applicable(&headers));

        let soc = design_fixture(dir.path(), "soc", &[("cpu.v", ""), ("bus.v", ""), ("uart.v", "")]);
        assert!(YosysAigFlow::new("yosys").is_applicable(&soc));
        assert!(YosysAigFlow::new("yosys").with_max_files(3).is_applicable(&soc));
        assert!(!YosysAigFlow::new("yosys").with_max_files(2).is_applicable(&soc));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_with_fake_yosys() {
        let dir = TempDir::new().unwrap();
        let bin = crate::flows::stub::fake_tool(
            dir.path(),
            "yosys",
            r#"[ "$1" = "-q" ] && [ -f "$3" ] || exit 9
echo '{"modules":{"c17":{}}}' > aig_yosys.json
echo '{"design":{"num_cells":6}}' > stat.json
echo 'done' >&2"#,
        );
        let design = design_fixture(dir.path(), "c17", &[("c17.v", "module c17; endmodule\n")]);
        let scratch = TempDir::new().unwrap();
        let ctx = context_for(design, scratch.path(), Duration::from_secs(10));

        let flow = YosysAigFlow::new(bin.to_string_lossy()).with_tool_version("0.38");
        let output = flow.run_one(&ctx).await.unwrap();
        assert_eq!(output.data["num_cells"], 6);
        assert_eq!(output.data["modules"], json!(["c17"]));
        let names: Vec<_> = output.files.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["aig_yosys.json", "stat.json", "yosys.log"]);
        assert_eq!(flow.tool_version().as_deref(), Some("0.38"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_yosys_failure_surfaces_stderr() {
        let dir = TempDir::new().unwrap();
        let bin = crate::flows::stub::fake_tool(
            dir.path(),
            "yosys",
            "echo 'ERROR: syntax error, unexpected TOK_ID' >&2; exit 1",
        );
        let design = design_fixture(dir.path(), "bad", &[("bad.v", "module bad( endmodule\n")]);
        let scratch = TempDir::new().unwrap();
        let ctx = context_for(design, scratch.path(), Duration::from_secs(10));

        let err = YosysAigFlow::new(bin.to_string_lossy()).run_one(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("unexpected TOK_ID"));
    }
}
