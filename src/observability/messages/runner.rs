// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for flow batch runs.

use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

use super::StructuredLog;

/// Flow batch started.
///
/// # Log Level
/// `info!`
pub struct FlowRunStarted<'a> {
    pub flow_id: &'a str,
    pub n_jobs: usize,
    pub timeout: Duration,
}

impl Display for FlowRunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running flow '{}': n_jobs={}, timeout={:?}",
            self.flow_id, self.n_jobs, self.timeout
        )
    }
}

impl StructuredLog for FlowRunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            flow_id = self.flow_id,
            n_jobs = self.n_jobs,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }
}

impl FlowRunStarted<'_> {
    pub fn span(&self) -> Span {
        tracing::info_span!("flow_run", flow_id = self.flow_id, n_jobs = self.n_jobs)
    }
}

/// One design's job finished and its artifact is stored.
///
/// # Log Level
/// `debug!`
pub struct DesignSucceeded<'a> {
    pub flow_id: &'a str,
    pub design_id: &'a str,
    pub duration: Duration,
}

impl Display for DesignSucceeded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Flow '{}' succeeded on '{}' in {:?}",
            self.flow_id, self.design_id, self.duration
        )
    }
}

impl StructuredLog for DesignSucceeded<'_> {
    fn log(&self) {
        tracing::debug!(
            flow_id = self.flow_id,
            design_id = self.design_id,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// One design's job failed; the batch continues.
///
/// # Log Level
/// `warn!`
pub struct DesignFailed<'a> {
    pub flow_id: &'a str,
    pub design_id: &'a str,
    pub detail: &'a str,
}

impl Display for DesignFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Flow '{}' failed on '{}': {}",
            self.flow_id, self.design_id, self.detail
        )
    }
}

impl StructuredLog for DesignFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            flow_id = self.flow_id,
            design_id = self.design_id,
            detail = self.detail,
            "{}", self
        );
    }
}

/// Flow batch finished (possibly after cancellation).
///
/// # Log Level
/// `info!`
pub struct FlowRunCompleted<'a> {
    pub flow_id: &'a str,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub up_to_date: usize,
    pub cancelled: usize,
    pub duration: Duration,
}

impl Display for FlowRunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Flow '{}' finished in {:?}: {} succeeded, {} failed, {} not applicable, {} up to date, {} cancelled",
            self.flow_id,
            self.duration,
            self.success,
            self.failed,
            self.skipped,
            self.up_to_date,
            self.cancelled
        )
    }
}

impl StructuredLog for FlowRunCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            flow_id = self.flow_id,
            success = self.success,
            failed = self.failed,
            skipped = self.skipped,
            up_to_date = self.up_to_date,
            cancelled = self.cancelled,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_message_lists_every_count() {
        let msg = FlowRunCompleted {
            flow_id: "module_info",
            success: 2,
            failed: 1,
            skipped: 3,
            up_to_date: 4,
            cancelled: 0,
            duration: Duration::from_millis(5),
        };
        let text = msg.to_string();
        assert!(text.contains("'module_info'"));
        assert!(text.contains("2 succeeded"));
        assert!(text.contains("1 failed"));
        assert!(text.contains("3 not applicable"));
        assert!(text.contains("4 up to date"));
    }
}
