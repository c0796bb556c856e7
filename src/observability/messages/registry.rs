// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for design registry events.

use std::fmt::{Display, Formatter};
use std::path::Path;

use super::StructuredLog;

/// Dataset opened or created.
///
/// # Log Level
/// `info!`
pub struct RegistryOpened<'a> {
    pub root: &'a Path,
    pub design_count: usize,
    pub created: bool,
}

impl Display for RegistryOpened<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let verb = if self.created { "Created" } else { "Opened" };
        write!(
            f,
            "{} design dataset at {} with {} designs",
            verb,
            self.root.display(),
            self.design_count
        )
    }
}

impl StructuredLog for RegistryOpened<'_> {
    fn log(&self) {
        tracing::info!(
            root = %self.root.display(),
            design_count = self.design_count,
            created = self.created,
            "{}", self
        );
    }
}

/// Design committed to the index.
///
/// # Log Level
/// `debug!` - retrievers add thousands of these
pub struct DesignRegistered<'a> {
    pub design_id: &'a str,
    pub dataset_source: &'a str,
    pub file_count: usize,
}

impl Display for DesignRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered design '{}' from '{}' ({} files)",
            self.design_id, self.dataset_source, self.file_count
        )
    }
}

impl StructuredLog for DesignRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            design_id = self.design_id,
            dataset_source = self.dataset_source,
            file_count = self.file_count,
            "{}", self
        );
    }
}

/// Artifact committed for a (design, flow) pair.
///
/// # Log Level
/// `debug!`
pub struct ArtifactCommitted<'a> {
    pub design_id: &'a str,
    pub flow_id: &'a str,
    pub file_count: usize,
}

impl Display for ArtifactCommitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stored '{}' artifact for design '{}' ({} files)",
            self.flow_id, self.design_id, self.file_count
        )
    }
}

impl StructuredLog for ArtifactCommitted<'_> {
    fn log(&self) {
        tracing::debug!(
            design_id = self.design_id,
            flow_id = self.flow_id,
            file_count = self.file_count,
            "{}", self
        );
    }
}

/// Designs deleted from the registry.
///
/// # Log Level
/// `info!`
pub struct DesignsRemoved<'a> {
    pub dataset_source: Option<&'a str>,
    pub count: usize,
}

impl Display for DesignsRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.dataset_source {
            Some(source) => write!(f, "Removed {} designs from '{}'", self.count, source),
            None => write!(f, "Removed {} designs", self.count),
        }
    }
}

impl StructuredLog for DesignsRemoved<'_> {
    fn log(&self) {
        tracing::info!(
            dataset_source = self.dataset_source,
            count = self.count,
            "{}", self
        );
    }
}

/// Leftover from an interrupted write removed during recovery.
///
/// # Log Level
/// `warn!`
pub struct OrphanRemoved<'a> {
    pub path: &'a Path,
}

impl Display for OrphanRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Removing {} which is not listed in the registry index",
            self.path.display()
        )
    }
}

impl StructuredLog for OrphanRemoved<'_> {
    fn log(&self) {
        tracing::warn!(path = %self.path.display(), "{}", self);
    }
}
