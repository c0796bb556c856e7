// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("configuration validation failed:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),

    #[error("unknown {category} kind '{kind}' (available: {})", available.join(", "))]
    UnknownKind {
        category: &'static str,
        kind: String,
        available: Vec<&'static str>,
    },

    #[error("invalid option '{option}' for '{kind}': {reason}")]
    InvalidOption {
        kind: String,
        option: String,
        reason: String,
    },

    #[error(transparent)]
    Registry(#[from] crate::errors::RegistryError),
}
