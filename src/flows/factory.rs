// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::{LineCountFlow, ModuleInfoFlow, VeribleAstFlow, YosysAigFlow};
use crate::config::{FlowConfig, Options};
use crate::errors::ConfigError;
use crate::traits::Flow;

/// Factory for flows configured under `flows:`
pub struct FlowFactory;

impl FlowFactory {
    /// Create a flow instance from its config entry.
    ///
    /// The `kind` field determines which flow to create:
    /// - "line_count" -> LineCountFlow
    /// - "module_info" -> ModuleInfoFlow
    /// - "yosys_aig" -> YosysAigFlow (options: `yosys_bin`, `tool_version`, `max_files`)
    /// - "verible_ast" -> VeribleAstFlow (options: `verible_bin`, `tool_version`)
    pub fn create(config: &FlowConfig) -> Result<Arc<dyn Flow>, ConfigError> {
        let options = Options::new(&config.kind, &config.options);

        match config.kind.as_str() {
            "line_count" => Ok(Arc::new(LineCountFlow::new())),
            "module_info" => Ok(Arc::new(ModuleInfoFlow::new())),

            // External tools
            "yosys_aig" => {
                let mut flow = YosysAigFlow::new(options.string_or("yosys_bin", "yosys")?);
                if let Some(version) = options.string("tool_version")? {
                    flow = flow.with_tool_version(version);
                }
                if let Some(max_files) = options.usize("max_files")? {
                    flow = flow.with_max_files(max_files);
                }
                Ok(Arc::new(flow))
            }
            "verible_ast" => {
                let mut flow =
                    VeribleAstFlow::new(options.string_or("verible_bin", "verible-verilog-syntax")?);
                if let Some(version) = options.string("tool_version")? {
                    flow = flow.with_tool_version(version);
                }
                Ok(Arc::new(flow))
            }

            other => Err(ConfigError::UnknownKind {
                category: "flow",
                kind: other.to_string(),
                available: Self::list_available_implementations(),
            }),
        }
    }

    /// List all available flow implementations
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec!["line_count", "module_info", "yosys_aig", "verible_ast"]
    }

    /// Check if an implementation is available
    pub fn is_implementation_available(kind: &str) -> bool {
        Self::list_available_implementations().contains(&kind)
    }
}
