// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use crate::config::Config;
use crate::errors::ConfigError;
use crate::flows::FlowFactory;
use crate::retrievers::RetrieverFactory;

/// Check a loaded config for problems that would only surface halfway
/// through a session. All problems are reported together.
pub fn validate_config(cfg: &Config) -> Result<(), ConfigError> {
    let mut problems = Vec::new();

    if cfg.runner.n_jobs == Some(0) {
        problems.push("runner.n_jobs must be at least 1".to_string());
    }
    if cfg.runner.timeout_seconds == Some(0) {
        problems.push("runner.timeout_seconds must be greater than 0".to_string());
    }

    let mut sources = HashSet::new();
    for retriever in &cfg.retrievers {
        if !RetrieverFactory::is_implementation_available(&retriever.kind) {
            problems.push(format!(
                "unknown retriever kind '{}' (available: {})",
                retriever.kind,
                RetrieverFactory::list_available_implementations().join(", ")
            ));
        }
        if retriever.dataset_source.is_empty() {
            problems.push(format!("retriever '{}' has an empty dataset_source", retriever.kind));
        } else if !sources.insert(retriever.dataset_source.as_str()) {
            problems.push(format!(
                "dataset_source '{}' is used by more than one retriever",
                retriever.dataset_source
            ));
        }
    }

    let mut flow_kinds = HashSet::new();
    for flow in &cfg.flows {
        if !FlowFactory::is_implementation_available(&flow.kind) {
            problems.push(format!(
                "unknown flow kind '{}' (available: {})",
                flow.kind,
                FlowFactory::list_available_implementations().join(", ")
            ));
        }
        if !flow_kinds.insert(flow.kind.as_str()) {
            problems.push(format!("flow '{}' is configured more than once", flow.kind));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(problems))
    }
}
