// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The registry index file: the authoritative listing of designs, their
//! artifacts, run records and completed datasets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use super::design::Design;
use crate::config::consts::INDEX_FORMAT_VERSION;
use crate::errors::{RegistryError, RegistryResult};

/// Completion marker written once a retriever has committed its whole corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetEntry {
    pub design_count: usize,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct DatasetIndex {
    pub format_version: u32,
    #[serde(default)]
    pub designs: BTreeMap<String, Design>,
    #[serde(default)]
    pub datasets: BTreeMap<String, DatasetEntry>,
}

impl DatasetIndex {
    pub fn empty() -> Self {
        Self {
            format_version: INDEX_FORMAT_VERSION,
            designs: BTreeMap::new(),
            datasets: BTreeMap::new(),
        }
    }

    pub fn load(path: &Path) -> RegistryResult<Self> {
        let raw = fs::read(path).map_err(|e| RegistryError::io(path, e))?;
        let index: DatasetIndex = serde_json::from_slice(&raw)
            .map_err(|e| RegistryError::storage(path, format!("corrupt registry index: {}", e)))?;
        if index.format_version != INDEX_FORMAT_VERSION {
            return Err(RegistryError::storage(
                path,
                format!(
                    "incompatible index format version {} (expected {})",
                    index.format_version, INDEX_FORMAT_VERSION
                ),
            ));
        }
        Ok(index)
    }

    /// Write the index next to `path` and rename it into place, so readers
    /// only ever observe a complete index.
    pub fn persist(&self, path: &Path) -> RegistryResult<()> {
        let dir = path
            .parent()
            .ok_or_else(|| RegistryError::storage(path, "index path has no parent directory"))?;
        let bytes = serde_json::to_vec_pretty(self)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".index-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| RegistryError::io(dir, e))?;
        tmp.write_all(&bytes).map_err(|e| RegistryError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| RegistryError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| RegistryError::io(path, e.error))?;
        Ok(())
    }
}
