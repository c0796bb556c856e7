// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Durable, crash-consistent design store.
//!
//! On-disk layout:
//!
//! ```text
//! <root>/index.json                              authoritative listing
//! <root>/designs/<design_id>/sources/<file>      copied source files
//! <root>/designs/<design_id>/artifacts/<flow>/   artifact.json + flow files
//! <root>/.staging/                               in-flight writes
//! ```
//!
//! Every mutation stages its files under `.staging/`, renames them into
//! place and then commits the index with a write-and-rename. The index is the
//! only thing readers trust: a directory that is not in the index is an
//! orphan from an interrupted write and is removed the next time the dataset
//! is opened.

use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::design::{
    ArtifactFile, ArtifactPayload, ArtifactRecord, Design, FlowRunRecord, FlowRunStatus, NewDesign,
};
use super::filter::DesignFilter;
use super::index::{DatasetEntry, DatasetIndex};
use crate::config::consts::{
    ARTIFACTS_DIR_NAME, ARTIFACT_METADATA_FILE_NAME, DESIGNS_DIR_NAME, INDEX_FILE_NAME,
    SOURCES_DIR_NAME, STAGING_DIR_NAME,
};
use crate::errors::{RegistryError, RegistryResult};
use crate::observability::messages::registry::{
    ArtifactCommitted, DesignRegistered, DesignsRemoved, OrphanRemoved, RegistryOpened,
};
use crate::observability::messages::StructuredLog;

/// The design registry. Share it between retrievers, flows and runners with
/// an `Arc`; all methods take `&self`.
///
/// Mutations are serialized on the index lock only for the final rename and
/// index commit. Copying files happens outside the lock, so writers to
/// different designs proceed in parallel while writers to the same artifact
/// slot apply one after the other (last writer wins).
#[derive(Debug)]
pub struct DesignRegistry {
    root: PathBuf,
    index: Mutex<DatasetIndex>,
}

impl DesignRegistry {
    /// Open the dataset at `path`, creating an empty one if needed.
    ///
    /// With `overwrite`, any existing directory at `path` is destroyed first.
    /// Without it, a non-empty directory that is not a dataset is a
    /// [`RegistryError::Storage`] error.
    pub fn open_or_create(path: impl AsRef<Path>, overwrite: bool) -> RegistryResult<Self> {
        let root = path.as_ref().to_path_buf();

        if overwrite && root.exists() {
            fs::remove_dir_all(&root).map_err(|e| RegistryError::io(&root, e))?;
        }

        let index_path = root.join(INDEX_FILE_NAME);
        let (index, created) = if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| RegistryError::io(&root, e))?;
            (Self::initialize(&root)?, true)
        } else if !root.is_dir() {
            return Err(RegistryError::storage(&root, "dataset path is not a directory"));
        } else if index_path.is_file() {
            (DatasetIndex::load(&index_path)?, false)
        } else if is_empty_dir(&root)? {
            (Self::initialize(&root)?, true)
        } else {
            return Err(RegistryError::storage(
                &root,
                "directory is not empty and does not contain a design dataset",
            ));
        };

        let registry = Self {
            root,
            index: Mutex::new(index),
        };
        registry.recover()?;

        RegistryOpened {
            root: &registry.root,
            design_count: registry.len(),
            created,
        }
        .log();

        Ok(registry)
    }

    fn initialize(root: &Path) -> RegistryResult<DatasetIndex> {
        for dir in [DESIGNS_DIR_NAME, STAGING_DIR_NAME] {
            let path = root.join(dir);
            fs::create_dir_all(&path).map_err(|e| RegistryError::io(&path, e))?;
        }
        let index = DatasetIndex::empty();
        index.persist(&root.join(INDEX_FILE_NAME))?;
        Ok(index)
    }

    /// Bring the directory tree back in line with the index after an
    /// interrupted write.
    fn recover(&self) -> RegistryResult<()> {
        let staging = self.staging_dir();
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| RegistryError::io(&staging, e))?;
        }
        fs::create_dir_all(&staging).map_err(|e| RegistryError::io(&staging, e))?;

        let designs_dir = self.designs_dir();
        fs::create_dir_all(&designs_dir).map_err(|e| RegistryError::io(&designs_dir, e))?;

        let index = self.index.lock();

        for (design_id, design) in &index.designs {
            let sources = self.sources_dir(design_id);
            if !sources.is_dir() {
                return Err(RegistryError::storage(
                    &sources,
                    format!("index references design '{}' but its sources are missing", design_id),
                ));
            }

            let artifacts_dir = self.design_dir(design_id).join(ARTIFACTS_DIR_NAME);
            if artifacts_dir.is_dir() {
                for entry in read_dir(&artifacts_dir)? {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if !design.artifacts.contains_key(&name) {
                        remove_orphan(&entry.path())?;
                    }
                }
            }
        }

        for entry in read_dir(&designs_dir)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !index.designs.contains_key(&name) {
                remove_orphan(&entry.path())?;
            }
        }

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn designs_dir(&self) -> PathBuf {
        self.root.join(DESIGNS_DIR_NAME)
    }

    pub fn design_dir(&self, design_id: &str) -> PathBuf {
        self.designs_dir().join(design_id)
    }

    pub fn sources_dir(&self, design_id: &str) -> PathBuf {
        self.design_dir(design_id).join(SOURCES_DIR_NAME)
    }

    pub fn artifact_dir(&self, design_id: &str, flow_id: &str) -> PathBuf {
        self.design_dir(design_id)
            .join(ARTIFACTS_DIR_NAME)
            .join(flow_id)
    }

    fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR_NAME)
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE_NAME)
    }

    fn stage(&self, prefix: &str) -> RegistryResult<TempDir> {
        let staging = self.staging_dir();
        tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(&staging)
            .map_err(|e| RegistryError::io(&staging, e))
    }

    fn hydrate(&self, mut design: Design) -> Design {
        design.sources_dir = self.sources_dir(&design.design_id);
        design
    }

    pub fn len(&self) -> usize {
        self.index.lock().designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, design_id: &str) -> bool {
        self.index.lock().designs.contains_key(design_id)
    }

    /// Register a new design, copying its source files into the dataset.
    ///
    /// Either the design directory and the index entry both appear, or
    /// neither does.
    pub fn add_design(&self, new_design: NewDesign) -> RegistryResult<Design> {
        if self.contains(&new_design.design_id) {
            return Err(RegistryError::DuplicateDesign {
                design_id: new_design.design_id,
            });
        }
        let (staged, design) = self.stage_design(new_design)?;
        let design_id = design.design_id.clone();

        let target = self.design_dir(&design_id);
        {
            let mut index = self.index.lock();
            if index.designs.contains_key(&design_id) {
                return Err(RegistryError::DuplicateDesign { design_id });
            }
            if target.exists() {
                // not in the index, so it's a leftover from an interrupted write
                remove_orphan(&target)?;
            }
            fs::rename(staged.path(), &target).map_err(|e| RegistryError::io(&target, e))?;

            index.designs.insert(design_id.clone(), design.clone());
            if let Err(e) = index.persist(&self.index_path()) {
                index.designs.remove(&design_id);
                let _ = fs::remove_dir_all(&target);
                return Err(e);
            }
        }

        DesignRegistered {
            design_id: &design.design_id,
            dataset_source: &design.dataset_source,
            file_count: design.files.len(),
        }
        .log();

        Ok(self.hydrate(design))
    }

    /// Validate `new_design` and copy its sources into a staging directory.
    /// Nothing becomes visible until the caller renames the staged directory
    /// into place and commits the index.
    fn stage_design(&self, new_design: NewDesign) -> RegistryResult<(TempDir, Design)> {
        let NewDesign {
            design_id,
            dataset_source,
            metadata,
            files,
        } = new_design;

        validate_path_component(&design_id, &design_id, "design id")?;
        if dataset_source.is_empty() {
            return Err(RegistryError::invalid(&design_id, "dataset source is empty"));
        }
        if files.is_empty() {
            return Err(RegistryError::invalid(&design_id, "a design needs at least one source file"));
        }

        let staged = self.stage("design-")?;
        let staged_sources = staged.path().join(SOURCES_DIR_NAME);
        fs::create_dir_all(&staged_sources).map_err(|e| RegistryError::io(&staged_sources, e))?;

        let mut file_names = Vec::with_capacity(files.len());
        let mut seen = HashSet::new();
        for file in &files {
            if !file.is_file() {
                return Err(RegistryError::invalid(
                    &design_id,
                    format!("source file {} does not exist", file.display()),
                ));
            }
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    RegistryError::invalid(&design_id, format!("unusable file name {}", file.display()))
                })?
                .to_string();
            if !seen.insert(name.clone()) {
                return Err(RegistryError::invalid(
                    &design_id,
                    format!("duplicate source file name '{}'", name),
                ));
            }
            let dest = staged_sources.join(&name);
            fs::copy(file, &dest).map_err(|e| RegistryError::io(file, e))?;
            file_names.push(name);
        }

        let design = Design {
            design_id,
            dataset_source,
            metadata,
            files: file_names,
            artifacts: Default::default(),
            runs: Default::default(),
            created_at: Utc::now(),
            sources_dir: PathBuf::new(),
        };
        Ok((staged, design))
    }

    pub fn get_design(&self, design_id: &str) -> RegistryResult<Design> {
        let design = self
            .index
            .lock()
            .designs
            .get(design_id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(design_id))?;
        Ok(self.hydrate(design))
    }

    /// Lazily iterate the designs matching `filter`, in design id order.
    ///
    /// The set of ids is captured when iteration starts; each record is read
    /// from the current index as it is yielded, and designs removed in the
    /// meantime are skipped. Call again to restart from fresh state.
    pub fn list_designs(&self, filter: DesignFilter) -> Designs<'_> {
        let ids: Vec<String> = self.index.lock().designs.keys().cloned().collect();
        Designs {
            registry: self,
            ids: ids.into_iter(),
            filter,
        }
    }

    /// Absolute source file paths of one design.
    pub fn source_paths(&self, design_id: &str) -> RegistryResult<Vec<PathBuf>> {
        Ok(self.get_design(design_id)?.source_paths())
    }

    pub fn has_artifact(&self, design_id: &str, flow_id: &str) -> bool {
        self.index
            .lock()
            .designs
            .get(design_id)
            .map_or(false, |d| d.artifacts.contains_key(flow_id))
    }

    pub fn get_artifact(&self, design_id: &str, flow_id: &str) -> RegistryResult<Option<ArtifactRecord>> {
        let index = self.index.lock();
        let design = index
            .designs
            .get(design_id)
            .ok_or_else(|| RegistryError::not_found(design_id))?;
        Ok(design.artifacts.get(flow_id).cloned())
    }

    /// Store the output of a successful flow run, replacing any earlier
    /// artifact for the same (design, flow). Also records the success run
    /// record in the same index commit.
    pub fn write_artifact(
        &self,
        design_id: &str,
        flow_id: &str,
        payload: ArtifactPayload,
    ) -> RegistryResult<ArtifactRecord> {
        validate_path_component(design_id, flow_id, "flow id")?;
        if !self.contains(design_id) {
            return Err(RegistryError::not_found(design_id));
        }

        let staged = self.stage("artifact-")?;
        let mut file_names = Vec::with_capacity(payload.files.len());
        let mut seen = HashSet::new();
        for file in &payload.files {
            let name = file.name();
            validate_path_component(design_id, name, "artifact file name")?;
            if name == ARTIFACT_METADATA_FILE_NAME || !seen.insert(name.to_string()) {
                return Err(RegistryError::invalid(
                    design_id,
                    format!("artifact file name '{}' is reserved or duplicated", name),
                ));
            }
            let dest = staged.path().join(name);
            match file {
                ArtifactFile::Inline { contents, .. } => {
                    fs::write(&dest, contents).map_err(|e| RegistryError::io(&dest, e))?;
                }
                ArtifactFile::Staged { path, .. } => {
                    fs::copy(path, &dest).map_err(|e| RegistryError::io(path, e))?;
                }
            }
            file_names.push(name.to_string());
        }

        let record = ArtifactRecord {
            flow_id: flow_id.to_string(),
            flow_type: payload.flow_type,
            tool_version: payload.tool_version,
            data: payload.data,
            files: file_names,
            created_at: Utc::now(),
        };
        let metadata_path = staged.path().join(ARTIFACT_METADATA_FILE_NAME);
        fs::write(&metadata_path, serde_json::to_vec_pretty(&record)?)
            .map_err(|e| RegistryError::io(&metadata_path, e))?;

        let target = self.artifact_dir(design_id, flow_id);
        let retired = self.stage("retired-")?;
        let retired_slot = retired.path().join(flow_id);
        {
            let mut index = self.index.lock();
            let design = index
                .designs
                .get_mut(design_id)
                .ok_or_else(|| RegistryError::not_found(design_id))?;

            let parent = self.design_dir(design_id).join(ARTIFACTS_DIR_NAME);
            fs::create_dir_all(&parent).map_err(|e| RegistryError::io(&parent, e))?;

            let had_previous = target.exists();
            if had_previous {
                fs::rename(&target, &retired_slot).map_err(|e| RegistryError::io(&target, e))?;
            }
            if let Err(e) = fs::rename(staged.path(), &target) {
                if had_previous {
                    let _ = fs::rename(&retired_slot, &target);
                }
                return Err(RegistryError::io(&target, e));
            }

            let previous_artifact = design.artifacts.insert(flow_id.to_string(), record.clone());
            let previous_run = design.runs.insert(
                flow_id.to_string(),
                FlowRunRecord::success(record.tool_version.clone()),
            );

            if let Err(e) = index.persist(&self.index_path()) {
                if let Some(design) = index.designs.get_mut(design_id) {
                    restore(&mut design.artifacts, flow_id, previous_artifact);
                    restore(&mut design.runs, flow_id, previous_run);
                }
                let _ = fs::remove_dir_all(&target);
                if had_previous {
                    let _ = fs::rename(&retired_slot, &target);
                }
                return Err(e);
            }
        }

        ArtifactCommitted {
            design_id,
            flow_id,
            file_count: record.files.len(),
        }
        .log();

        Ok(record)
    }

    /// Persist failed / skipped run records for one flow in a single index
    /// commit. Success records are only written by [`Self::write_artifact`].
    /// Records for designs that no longer exist are dropped.
    pub fn record_runs(&self, flow_id: &str, records: Vec<(String, FlowRunRecord)>) -> RegistryResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        if let Some((design_id, _)) = records
            .iter()
            .find(|(_, r)| r.status == FlowRunStatus::Success)
        {
            return Err(RegistryError::invalid(
                design_id,
                "success run records are written together with the artifact",
            ));
        }

        let mut index = self.index.lock();
        let mut previous = Vec::with_capacity(records.len());
        for (design_id, record) in records {
            if let Some(design) = index.designs.get_mut(&design_id) {
                let old = design.runs.insert(flow_id.to_string(), record);
                previous.push((design_id, old));
            }
        }

        if let Err(e) = index.persist(&self.index_path()) {
            for (design_id, old) in previous {
                if let Some(design) = index.designs.get_mut(&design_id) {
                    restore(&mut design.runs, flow_id, old);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    /// Delete one design, its sources and all its artifacts.
    pub fn remove_design(&self, design_id: &str) -> RegistryResult<()> {
        let removed = self.remove_where(|d| d.design_id == design_id, None)?;
        if removed.is_empty() {
            return Err(RegistryError::not_found(design_id));
        }
        Ok(())
    }

    /// Delete every design produced by `dataset_source` along with its
    /// completion marker. Returns the removed design ids.
    pub fn remove_dataset_source(&self, dataset_source: &str) -> RegistryResult<Vec<String>> {
        self.remove_where(|d| d.dataset_source == dataset_source, Some(dataset_source))
    }

    fn remove_where<F>(&self, predicate: F, dataset_marker: Option<&str>) -> RegistryResult<Vec<String>>
    where
        F: Fn(&Design) -> bool,
    {
        let retired = self.stage("retired-")?;
        let mut removed = Vec::new();
        {
            let mut index = self.index.lock();
            let ids: Vec<String> = index
                .designs
                .values()
                .filter(|d| predicate(d))
                .map(|d| d.design_id.clone())
                .collect();
            let marker_present = dataset_marker.map_or(false, |s| index.datasets.contains_key(s));
            if ids.is_empty() && !marker_present {
                return Ok(removed);
            }

            let mut taken = Vec::with_capacity(ids.len());
            for id in &ids {
                if let Some(design) = index.designs.remove(id) {
                    taken.push(design);
                }
            }
            let taken_marker = dataset_marker.and_then(|s| index.datasets.remove(s).map(|m| (s, m)));

            if let Err(e) = index.persist(&self.index_path()) {
                for design in taken {
                    index.designs.insert(design.design_id.clone(), design);
                }
                if let Some((source, marker)) = taken_marker {
                    index.datasets.insert(source.to_string(), marker);
                }
                return Err(e);
            }

            // index no longer lists these; move the directories out of the tree
            for id in ids {
                let dir = self.design_dir(&id);
                if dir.exists() {
                    fs::rename(&dir, retired.path().join(&id)).map_err(|e| RegistryError::io(&dir, e))?;
                }
                removed.push(id);
            }
        }

        if !removed.is_empty() {
            DesignsRemoved {
                dataset_source: dataset_marker,
                count: removed.len(),
            }
            .log();
        }
        Ok(removed)
    }

    /// Record that a retriever finished committing its corpus.
    pub fn mark_dataset_complete(&self, dataset_source: &str, design_count: usize) -> RegistryResult<()> {
        let mut index = self.index.lock();
        let previous = index.datasets.insert(
            dataset_source.to_string(),
            DatasetEntry {
                design_count,
                completed_at: Utc::now(),
            },
        );
        if let Err(e) = index.persist(&self.index_path()) {
            restore(&mut index.datasets, dataset_source, previous);
            return Err(e);
        }
        Ok(())
    }

    pub fn dataset_entry(&self, dataset_source: &str) -> Option<DatasetEntry> {
        self.index.lock().datasets.get(dataset_source).cloned()
    }

    /// Drop the completion marker of `dataset_source`, leaving its designs in
    /// place, so the next retrieval rebuilds the corpus. Returns whether a
    /// marker existed.
    pub fn clear_dataset_marker(&self, dataset_source: &str) -> RegistryResult<bool> {
        let mut index = self.index.lock();
        let Some(previous) = index.datasets.remove(dataset_source) else {
            return Ok(false);
        };
        if let Err(e) = index.persist(&self.index_path()) {
            index.datasets.insert(dataset_source.to_string(), previous);
            return Err(e);
        }
        Ok(true)
    }

    /// Finish a corpus retrieval in a single index commit.
    ///
    /// Each of `replacements` takes over the record of the existing design of
    /// `dataset_source` with the same id, discarding its old sources and
    /// artifacts. Designs of the source listed in `retire` are removed. The
    /// completion marker is written in the same commit, so a failure leaves
    /// the registry as it was.
    pub fn complete_dataset(
        &self,
        dataset_source: &str,
        replacements: Vec<NewDesign>,
        retire: &[String],
        design_count: usize,
    ) -> RegistryResult<Vec<Design>> {
        let mut staged = Vec::with_capacity(replacements.len());
        let mut replaced_ids = HashSet::new();
        for mut new_design in replacements {
            if !replaced_ids.insert(new_design.design_id.clone()) {
                return Err(RegistryError::DuplicateDesign {
                    design_id: new_design.design_id,
                });
            }
            new_design.dataset_source = dataset_source.to_string();
            staged.push(self.stage_design(new_design)?);
        }
        let retired = self.stage("retired-")?;

        let designs: Vec<Design> = staged.iter().map(|(_, design)| design.clone()).collect();
        let retiring: Vec<String>;
        {
            let mut index = self.index.lock();
            for design in &designs {
                if let Some(existing) = index.designs.get(&design.design_id) {
                    if existing.dataset_source != dataset_source {
                        return Err(RegistryError::DuplicateDesign {
                            design_id: design.design_id.clone(),
                        });
                    }
                }
            }
            retiring = retire
                .iter()
                .filter(|id| !replaced_ids.contains(*id))
                .filter(|id| {
                    index
                        .designs
                        .get(*id)
                        .map_or(false, |d| d.dataset_source == dataset_source)
                })
                .cloned()
                .collect();

            let mut swap = DirSwap::default();
            if let Err(e) = self.swap_design_dirs(&mut swap, staged, &retiring, retired.path()) {
                self.undo_swap(swap, retired.path());
                return Err(e);
            }

            let mut previous = Vec::with_capacity(retiring.len() + designs.len());
            for id in &retiring {
                previous.push((id.clone(), index.designs.remove(id)));
            }
            for design in &designs {
                let old = index.designs.insert(design.design_id.clone(), design.clone());
                previous.push((design.design_id.clone(), old));
            }
            let previous_marker = index.datasets.insert(
                dataset_source.to_string(),
                DatasetEntry {
                    design_count,
                    completed_at: Utc::now(),
                },
            );

            if let Err(e) = index.persist(&self.index_path()) {
                for (id, old) in previous.into_iter().rev() {
                    restore(&mut index.designs, &id, old);
                }
                restore(&mut index.datasets, dataset_source, previous_marker);
                self.undo_swap(swap, retired.path());
                return Err(e);
            }
        }

        for design in &designs {
            DesignRegistered {
                design_id: &design.design_id,
                dataset_source,
                file_count: design.files.len(),
            }
            .log();
        }
        if !retiring.is_empty() {
            DesignsRemoved {
                dataset_source: Some(dataset_source),
                count: retiring.len(),
            }
            .log();
        }

        Ok(designs.into_iter().map(|d| self.hydrate(d)).collect())
    }

    /// Move the current directories of every touched design aside into
    /// `retired`, then rename the staged replacements into place.
    fn swap_design_dirs(
        &self,
        swap: &mut DirSwap,
        staged: Vec<(TempDir, Design)>,
        retiring: &[String],
        retired: &Path,
    ) -> RegistryResult<()> {
        let replaced = staged.iter().map(|(_, d)| d.design_id.as_str());
        for id in retiring.iter().map(String::as_str).chain(replaced) {
            let dir = self.design_dir(id);
            if dir.exists() {
                fs::rename(&dir, retired.join(id)).map_err(|e| RegistryError::io(&dir, e))?;
                swap.moved_aside.push(id.to_string());
            }
        }
        for (tmp, design) in &staged {
            let target = self.design_dir(&design.design_id);
            fs::rename(tmp.path(), &target).map_err(|e| RegistryError::io(&target, e))?;
            swap.placed.push(design.design_id.clone());
        }
        Ok(())
    }

    fn undo_swap(&self, swap: DirSwap, retired: &Path) {
        for id in swap.placed {
            let _ = fs::remove_dir_all(self.design_dir(&id));
        }
        for id in swap.moved_aside {
            let _ = fs::rename(retired.join(&id), self.design_dir(&id));
        }
    }

    /// Dataset sources with a completion marker, in name order.
    pub fn completed_datasets(&self) -> Vec<String> {
        self.index.lock().datasets.keys().cloned().collect()
    }
}

/// Directories moved by [`DesignRegistry::complete_dataset`], kept so a
/// failed commit can put them back.
#[derive(Default)]
struct DirSwap {
    moved_aside: Vec<String>,
    placed: Vec<String>,
}

/// Lazy iterator returned by [`DesignRegistry::list_designs`].
pub struct Designs<'a> {
    registry: &'a DesignRegistry,
    ids: std::vec::IntoIter<String>,
    filter: DesignFilter,
}

impl Iterator for Designs<'_> {
    type Item = Design;

    fn next(&mut self) -> Option<Design> {
        for id in self.ids.by_ref() {
            let current = self.registry.index.lock().designs.get(&id).cloned();
            if let Some(design) = current {
                let design = self.registry.hydrate(design);
                if self.filter.matches(&design) {
                    return Some(design);
                }
            }
        }
        None
    }
}

fn restore<V>(map: &mut std::collections::BTreeMap<String, V>, key: &str, previous: Option<V>) {
    match previous {
        Some(value) => {
            map.insert(key.to_string(), value);
        }
        None => {
            map.remove(key);
        }
    }
}

/// Ids and file names become directory entries, so they must be a single
/// plain path component that cannot collide with the staging area.
fn validate_path_component(design_id: &str, value: &str, what: &str) -> RegistryResult<()> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.starts_with('.')
        || value.contains(&['/', '\\', '\0'][..]);
    if invalid {
        return Err(RegistryError::invalid(
            design_id,
            format!("{} '{}' is not a valid path component", what, value),
        ));
    }
    Ok(())
}

fn is_empty_dir(path: &Path) -> RegistryResult<bool> {
    let mut entries = fs::read_dir(path).map_err(|e| RegistryError::io(path, e))?;
    Ok(entries.next().is_none())
}

fn read_dir(path: &Path) -> RegistryResult<Vec<fs::DirEntry>> {
    fs::read_dir(path)
        .map_err(|e| RegistryError::io(path, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| RegistryError::io(path, e))
}

fn remove_orphan(path: &Path) -> RegistryResult<()> {
    OrphanRemoved { path }.log();
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| RegistryError::io(path, e))
}
