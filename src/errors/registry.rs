// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by the design registry.
//!
//! `DuplicateDesign` and `Storage` signal a data-integrity risk and are never
//! retried by callers. `DesignNotFound` is the usual lookup miss.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// A design with this id is already registered.
    #[error("design '{design_id}' already exists in the registry")]
    DuplicateDesign { design_id: String },

    /// No design with this id is registered.
    #[error("design '{design_id}' not found in the registry")]
    DesignNotFound { design_id: String },

    /// The on-disk dataset is missing, corrupt, or has an incompatible layout.
    #[error("storage error at {}: {reason}", path.display())]
    Storage { path: PathBuf, reason: String },

    /// The design record or its file list cannot be registered.
    #[error("invalid design '{design_id}': {reason}")]
    InvalidDesign { design_id: String, reason: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RegistryError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RegistryError::Storage {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(design_id: &str, reason: impl Into<String>) -> Self {
        RegistryError::InvalidDesign {
            design_id: design_id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(design_id: &str) -> Self {
        RegistryError::DesignNotFound {
            design_id: design_id.to_string(),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
