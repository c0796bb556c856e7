// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt::{Display, Formatter};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDesign {
    pub design_id: String,
    /// Human-readable diagnostic, e.g. the tool's stderr tail.
    pub detail: String,
}

/// Outcome of one flow batch. Every design selected by the filter lands in
/// exactly one list; lists are sorted by design id.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub flow_id: String,
    pub success: Vec<String>,
    pub failed: Vec<FailedDesign>,
    /// Designs the flow is not applicable to.
    pub skipped: Vec<String>,
    /// Designs that already held a current artifact.
    pub up_to_date: Vec<String>,
    /// Designs whose job was queued or in flight when the run was cancelled.
    pub cancelled: Vec<String>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn new(flow_id: impl Into<String>) -> Self {
        Self {
            flow_id: flow_id.into(),
            ..Default::default()
        }
    }

    pub fn success_count(&self) -> usize {
        self.success.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn total(&self) -> usize {
        self.success.len()
            + self.failed.len()
            + self.skipped.len()
            + self.up_to_date.len()
            + self.cancelled.len()
    }

    /// No failures and nothing left undone by cancellation.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.cancelled.is_empty()
    }

    pub fn failure(&self, design_id: &str) -> Option<&FailedDesign> {
        self.failed.iter().find(|f| f.design_id == design_id)
    }

    pub(crate) fn sort(&mut self) {
        self.success.sort();
        self.failed.sort_by(|a, b| a.design_id.cmp(&b.design_id));
        self.skipped.sort();
        self.up_to_date.sort();
        self.cancelled.sort();
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}: {} succeeded, {} failed, {} not applicable, {} up to date, {} cancelled ({:.1}s)",
            self.flow_id,
            self.success.len(),
            self.failed.len(),
            self.skipped.len(),
            self.up_to_date.len(),
            self.cancelled.len(),
            self.duration.as_secs_f64()
        )?;
        for failure in &self.failed {
            write!(f, "\n  {}: {}", failure.design_id, failure.detail)?;
        }
        Ok(())
    }
}
