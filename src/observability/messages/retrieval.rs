// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for dataset retrieval.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use super::StructuredLog;

/// Retrieval of a corpus started.
///
/// # Log Level
/// `info!`
pub struct RetrievalStarted<'a> {
    pub dataset_source: &'a str,
}

impl Display for RetrievalStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Retrieving dataset '{}'", self.dataset_source)
    }
}

impl StructuredLog for RetrievalStarted<'_> {
    fn log(&self) {
        tracing::info!(dataset_source = self.dataset_source, "{}", self);
    }
}

/// The corpus is already present; nothing to do. Not an error.
///
/// # Log Level
/// `info!`
pub struct RetrievalSkipped<'a> {
    pub dataset_source: &'a str,
    pub design_count: usize,
}

impl Display for RetrievalSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dataset '{}' already populated with {} designs, skipping",
            self.dataset_source, self.design_count
        )
    }
}

impl StructuredLog for RetrievalSkipped<'_> {
    fn log(&self) {
        tracing::info!(
            dataset_source = self.dataset_source,
            design_count = self.design_count,
            "{}", self
        );
    }
}

/// Corpus committed.
///
/// # Log Level
/// `info!`
pub struct RetrievalCompleted<'a> {
    pub dataset_source: &'a str,
    pub design_count: usize,
    pub duration: Duration,
}

impl Display for RetrievalCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dataset '{}' retrieved: {} designs in {:?}",
            self.dataset_source, self.design_count, self.duration
        )
    }
}

impl StructuredLog for RetrievalCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            dataset_source = self.dataset_source,
            design_count = self.design_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// A failed retrieval removed the designs it had already added.
///
/// # Log Level
/// `error!`
pub struct RetrievalRolledBack<'a> {
    pub dataset_source: &'a str,
    pub removed: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for RetrievalRolledBack<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Retrieval of '{}' failed, rolled back {} designs: {}",
            self.dataset_source, self.removed, self.error
        )
    }
}

impl StructuredLog for RetrievalRolledBack<'_> {
    fn log(&self) {
        tracing::error!(
            dataset_source = self.dataset_source,
            removed = self.removed,
            error = %self.error,
            "{}", self
        );
    }
}
