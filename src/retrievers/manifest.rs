// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Retriever for hand-curated design sets described by a YAML manifest.
//!
//! ```yaml
//! designs:
//!   - design_id: uart_tx
//!     files: [rtl/uart_tx.v, rtl/uart_defs.vh]
//!     metadata:
//!       top_module: uart_tx
//!       license: MIT
//! ```
//!
//! File paths are relative to the manifest's directory.

use async_trait::async_trait;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::transaction::{already_present, run_blocking, RetrievalTransaction};
use crate::errors::RetrievalError;
use crate::registry::{DesignRegistry, Metadata, NewDesign};
use crate::traits::{DatasetRetriever, RetrievalOutcome};

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub designs: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ManifestEntry {
    pub design_id: String,
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, RetrievalError> {
        let content = fs::read_to_string(path).map_err(|e| RetrievalError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| RetrievalError::Manifest {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[derive(Clone)]
pub struct ManifestRetriever {
    registry: Arc<DesignRegistry>,
    dataset_source: String,
    manifest_path: PathBuf,
}

impl ManifestRetriever {
    pub fn new(registry: Arc<DesignRegistry>, dataset_source: impl Into<String>, manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            dataset_source: dataset_source.into(),
            manifest_path: manifest_path.into(),
        }
    }

    fn designs(&self) -> Result<Vec<NewDesign>, RetrievalError> {
        let manifest = Manifest::load(&self.manifest_path)?;
        let base = self
            .manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(manifest
            .designs
            .into_iter()
            .map(|entry| {
                let mut design = NewDesign::new(entry.design_id, &self.dataset_source)
                    .with_files(entry.files.iter().map(|f| base.join(f)));
                design.metadata = entry.metadata;
                design
            })
            .collect())
    }

    fn retrieve(&self) -> Result<RetrievalOutcome, RetrievalError> {
        // parse before touching the registry so a bad manifest changes nothing
        let designs = self.designs()?;

        let mut tx = RetrievalTransaction::begin(&self.registry, &self.dataset_source)?;
        for design in designs {
            if let Err(e) = tx.add(design) {
                return Err(tx.rollback(e));
            }
        }
        tx.commit()
    }
}

#[async_trait]
impl DatasetRetriever for ManifestRetriever {
    fn dataset_source(&self) -> &str {
        &self.dataset_source
    }

    async fn get_dataset(&self) -> Result<RetrievalOutcome, RetrievalError> {
        if let Some(outcome) = already_present(&self.registry, &self.dataset_source) {
            return Ok(outcome);
        }

        let retriever = self.clone();
        run_blocking(&self.dataset_source, move || retriever.retrieve()).await
    }

    async fn remove_dataset(&self) -> Result<usize, RetrievalError> {
        Ok(self.registry.remove_dataset_source(&self.dataset_source)?.len())
    }
}
