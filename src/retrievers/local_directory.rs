// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Retriever for a corpus already on disk (a bundled benchmark archive that
//! has been unpacked, a checked-out repository, ...).

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use super::transaction::{already_present, run_blocking, RetrievalTransaction};
use crate::config::consts::{is_compilation_unit, is_design_source};
use crate::errors::RetrievalError;
use crate::registry::{DesignRegistry, Metadata, NewDesign};
use crate::traits::{DatasetRetriever, RetrievalOutcome};

/// How physical benchmarks map onto designs.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryLayout {
    /// Every `.v` / `.sv` file is one design named after its file stem
    /// (ISCAS-style bundles). Headers are not designs of their own.
    #[default]
    PerFile,
    /// Every immediate subdirectory is one design named after the directory;
    /// all HDL and memory-init files beneath it belong to that design.
    PerDirectory,
}

#[derive(Clone)]
pub struct LocalDirectoryRetriever {
    registry: Arc<DesignRegistry>,
    dataset_source: String,
    root: PathBuf,
    layout: DirectoryLayout,
    id_prefix: Option<String>,
    metadata: Metadata,
}

impl LocalDirectoryRetriever {
    pub fn new(
        registry: Arc<DesignRegistry>,
        dataset_source: impl Into<String>,
        root: impl Into<PathBuf>,
        layout: DirectoryLayout,
    ) -> Self {
        Self {
            registry,
            dataset_source: dataset_source.into(),
            root: root.into(),
            layout,
            id_prefix: None,
            metadata: Metadata::new(),
        }
    }

    /// Prefix every design id, e.g. `"iscas85_"`, to keep corpora apart.
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    /// Metadata applied to every design of this corpus (license, origin, ...).
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    fn design_id(&self, name: &str) -> String {
        match &self.id_prefix {
            Some(prefix) => format!("{}{}", prefix, name),
            None => name.to_string(),
        }
    }

    fn base_design(&self, name: &str, relative: &Path) -> NewDesign {
        let mut design = NewDesign::new(self.design_id(name), &self.dataset_source);
        design.metadata = self.metadata.clone();
        design
            .with_metadata("design_name", name)
            .with_metadata("source_path", relative.to_string_lossy().into_owned())
    }

    fn walk(&self, dir: &Path, max_depth: usize) -> Result<Vec<walkdir::DirEntry>, RetrievalError> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RetrievalError::Io {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf()),
                source: e.into(),
            })
    }

    fn collect(&self) -> Result<Vec<NewDesign>, RetrievalError> {
        if !self.root.is_dir() {
            return Err(RetrievalError::Fetch {
                dataset_source: self.dataset_source.clone(),
                reason: format!("{} is not a directory", self.root.display()),
            });
        }

        let mut designs = Vec::new();
        match self.layout {
            DirectoryLayout::PerFile => {
                for entry in self.walk(&self.root, usize::MAX)? {
                    let path = entry.path();
                    if !entry.file_type().is_file() || !is_compilation_unit(path) {
                        continue;
                    }
                    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                        continue;
                    };
                    let relative = path.strip_prefix(&self.root).unwrap_or(path);
                    designs.push(self.base_design(stem, relative).with_file(path));
                }
            }
            DirectoryLayout::PerDirectory => {
                for entry in self.walk(&self.root, 1)? {
                    if !entry.file_type().is_dir() {
                        continue;
                    }
                    let Some(name) = entry.file_name().to_str() else {
                        continue;
                    };
                    let files: Vec<PathBuf> = self
                        .walk(entry.path(), usize::MAX)?
                        .into_iter()
                        .filter(|e| e.file_type().is_file() && is_design_source(e.path()))
                        .map(|e| e.into_path())
                        .collect();
                    if !files.iter().any(|f| is_compilation_unit(f)) {
                        tracing::warn!(
                            dataset_source = %self.dataset_source,
                            directory = %entry.path().display(),
                            "Skipping directory without Verilog sources"
                        );
                        continue;
                    }
                    let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
                    designs.push(self.base_design(name, relative).with_files(files));
                }
            }
        }
        Ok(designs)
    }

    fn retrieve(&self) -> Result<RetrievalOutcome, RetrievalError> {
        let mut tx = RetrievalTransaction::begin(&self.registry, &self.dataset_source)?;
        let designs = match self.collect() {
            Ok(designs) => designs,
            Err(e) => return Err(tx.rollback(e)),
        };
        for design in designs {
            if let Err(e) = tx.add(design) {
                return Err(tx.rollback(e));
            }
        }
        tx.commit()
    }
}

#[async_trait]
impl DatasetRetriever for LocalDirectoryRetriever {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn registry(dir: &TempDir) -> Arc<DesignRegistry> {
        Arc::new(DesignRegistry::open_or_create(dir.path().join("dataset"), false).unwrap())
    }

    #[tokio::test]
    async fn test_per_file_layout_registers_one_design_per_verilog_file() {
        let data = TempDir::new().unwrap();
        let corpus = TempDir::new().unwrap();
        write(corpus.path(), "c17.v", "module c17(); endmodule\n");
        write(corpus.path(), "sub/c432.v", "module c432(); endmodule\n");
        write(corpus.path(), "README.md", "not hdl\n");

        let registry = registry(&data);
        let retriever = LocalDirectoryRetriever::new(registry.clone(), "iscas85", corpus.path(), DirectoryLayout::PerFile)
            .with_id_prefix("iscas85_");

        let outcome = retriever.get_dataset().await.unwrap();
        assert_eq!(outcome, RetrievalOutcome::Retrieved { designs: 2 });

        let design = registry.get_design("iscas85_c432").unwrap();
        assert_eq!(design.files, vec!["c432.v"]);
        assert_eq!(design.metadata["design_name"], "c432");
        assert_eq!(design.metadata["source_path"], "sub/c432.v");
        assert!(design.source_paths()[0].is_file());
    }

    #[tokio::test]
    async fn test_per_file_layout_ignores_headers() {
        let data = TempDir::new().unwrap();
        let corpus = TempDir::new().unwrap();
        write(corpus.path(), "c17.v", "`include \"c17.h\"\nmodule c17(); endmodule\n");
        write(corpus.path(), "c17.h", "`define N 5\n");
        write(corpus.path(), "include/defs.vh", "`define W 8\n");
        write(corpus.path(), "alu.sv", "module alu(); endmodule\n");

        let registry = registry(&data);
        let retriever = LocalDirectoryRetriever::new(registry.clone(), "iscas85", corpus.path(), DirectoryLayout::PerFile);

        let outcome = retriever.get_dataset().await.unwrap();

        assert_eq!(outcome, RetrievalOutcome::Retrieved { designs: 2 });
        let ids: Vec<String> = registry
            .list_designs(crate::registry::DesignFilter::all())
            .map(|d| d.design_id)
            .collect();
        assert_eq!(ids, vec!["alu", "c17"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_designs_of_incomplete_earlier_run() {
        let data = TempDir::new().unwrap();
        let corpus = TempDir::new().unwrap();
        write(corpus.path(), "c17.v", "module c17(); endmodule\n");

        let registry = registry(&data);
        registry
            .add_design(NewDesign::new("c17", "iscas85").with_file(corpus.path().join("c17.v")))
            .unwrap();
        let retriever = LocalDirectoryRetriever::new(
            registry.clone(),
            "iscas85",
            corpus.path().join("missing"),
            DirectoryLayout::PerFile,
        );

        let err = retriever.get_dataset().await.unwrap_err();

        assert!(matches!(err, RetrievalError::Fetch { .. }));
        assert_eq!(registry.len(), 1);
        assert!(registry.get_design("c17").unwrap().source_paths()[0].is_file());
        assert!(registry.dataset_entry("iscas85").is_none());
    }

    #[tokio::test]
    async fn test_per_directory_layout_and_idempotence() {
        let data = TempDir::new().unwrap();
        let corpus = TempDir::new().unwrap();
        write(corpus.path(), "uart/rtl/uart_tx.v", "module uart_tx(); endmodule\n");
        write(corpus.path(), "uart/rtl/defs.vh", "`define W 8\n");
        write(corpus.path(), "uart/rom.mem", "00\n");
        write(corpus.path(), "docs_only/notes.txt", "nothing here\n");

        let registry = registry(&data);
        let retriever =
            LocalDirectoryRetriever::new(registry.clone(), "opencores", corpus.path(), DirectoryLayout::PerDirectory);

        let first = retriever.get_dataset().await.unwrap();
        assert_eq!(first, RetrievalOutcome::Retrieved { designs: 1 });
        let design = registry.get_design("uart").unwrap();
        assert_eq!(design.files.len(), 3);

        let second = retriever.get_dataset().await.unwrap();
        assert_eq!(second, RetrievalOutcome::AlreadyPresent { designs: 1 });
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_collision_rolls_back_whole_corpus() {
        let data = TempDir::new().unwrap();
        let corpus = TempDir::new().unwrap();
        write(corpus.path(), "a/adder.v", "module adder(); endmodule\n");
        write(corpus.path(), "b/adder.v", "module adder(); endmodule\n");
        write(corpus.path(), "b/mult.v", "module mult(); endmodule\n");

        let registry = registry(&data);
        let retriever =
            LocalDirectoryRetriever::new(registry.clone(), "dupes", corpus.path(), DirectoryLayout::PerFile);

        let err = retriever.get_dataset().await.unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::Registry(crate::errors::RegistryError::DuplicateDesign { .. })
        ));
        assert!(registry.is_empty());
        assert!(registry.dataset_entry("dupes").is_none());
    }

    #[tokio::test]
    async fn test_remove_dataset_only_touches_own_designs() {
        let data = TempDir::new().unwrap();
        let iscas = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        write(iscas.path(), "c17.v", "module c17(); endmodule\n");
        write(other.path(), "s27.v", "module s27(); endmodule\n");

        let registry = registry(&data);
        let a = LocalDirectoryRetriever::new(registry.clone(), "iscas85", iscas.path(), DirectoryLayout::PerFile);
        let b = LocalDirectoryRetriever::new(registry.clone(), "iscas89", other.path(), DirectoryLayout::PerFile);
        a.get_dataset().await.unwrap();
        b.get_dataset().await.unwrap();

        assert_eq!(a.remove_dataset().await.unwrap(), 1);
        assert!(!registry.contains("c17"));
        assert!(registry.contains("s27"));

        // removal clears the marker, so the corpus can be fetched again
        assert_eq!(
            a.get_dataset().await.unwrap(),
            RetrievalOutcome::Retrieved { designs: 1 }
        );
    }
}
