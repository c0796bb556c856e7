// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::RegistryError;

/// Batch-level failure of a flow run. Per-design failures never surface here.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to prepare scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("flow worker task failed: {0}")]
    Join(#[source] tokio::task::JoinError),
}
