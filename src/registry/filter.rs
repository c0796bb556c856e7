// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use regex::Regex;
use std::fmt;
use std::sync::Arc;

use super::design::Design;

type Predicate = Arc<dyn Fn(&Design) -> bool + Send + Sync>;

/// Selects designs by dataset source, id pattern, metadata values or an
/// arbitrary predicate. All configured conditions must hold.
///
/// ```
/// use design_dataset::registry::DesignFilter;
///
/// let filter = DesignFilter::all()
///     .with_dataset_source("iscas85")
///     .with_metadata("family", "combinational");
/// # let _ = filter;
/// ```
#[derive(Clone, Default)]
pub struct DesignFilter {
    dataset_source: Option<String>,
    id_pattern: Option<Regex>,
    metadata: Vec<(String, serde_json::Value)>,
    predicate: Option<Predicate>,
}

impl DesignFilter {
    /// Matches every design.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_dataset_source(mut self, dataset_source: impl Into<String>) -> Self {
        self.dataset_source = Some(dataset_source.into());
        self
    }

    /// Match design ids against `pattern`, anchored at the start of the id.
    pub fn with_id_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.id_pattern = Some(Regex::new(&format!("^(?:{})", pattern))?);
        Ok(self)
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Design) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn matches(&self, design: &Design) -> bool {
        if let Some(source) = &self.dataset_source {
            if &design.dataset_source != source {
                return false;
            }
        }
        if let Some(pattern) = &self.id_pattern {
            if !pattern.is_match(&design.design_id) {
                return false;
            }
        }
        let metadata_matches = self
            .metadata
            .iter()
            .all(|(key, expected)| design.metadata.get(key) == Some(expected));
        if !metadata_matches {
            return false;
        }
        self.predicate.as_ref().map_or(true, |p| p(design))
    }
}

impl fmt::Debug for DesignFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesignFilter")
            .field("dataset_source", &self.dataset_source)
            .field("id_pattern", &self.id_pattern.as_ref().map(|r| r.as_str()))
            .field("metadata", &self.metadata)
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}
