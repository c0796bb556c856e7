// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of one flow on one design.
///
/// The flow runner records these per design and carries on with the batch.
#[derive(Error, Debug)]
pub enum FlowExecutionError {
    #[error("'{tool}' timed out after {after:?}")]
    Timeout { tool: String, after: Duration },

    /// The external tool exited unsuccessfully. `stderr` holds its diagnostics.
    #[error("'{tool}' exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("failed to launch '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("run cancelled")]
    Cancelled,

    /// The analysis itself rejected the design (unparseable output, no usable sources, ...).
    #[error("analysis failed: {reason}")]
    Analysis { reason: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FlowExecutionError {
    pub fn analysis(reason: impl Into<String>) -> Self {
        FlowExecutionError::Analysis {
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlowExecutionError::Io {
            path: path.into(),
            source,
        }
    }
}
