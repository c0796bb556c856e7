// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::RetrievalError;

/// Populates the registry with one external corpus.
#[async_trait]
pub trait DatasetRetriever: Send + Sync {
    /// Identifier stamped on every design this retriever adds.
    fn dataset_source(&self) -> &str;

    /// Fetch and register the corpus unless it is already present.
    ///
    /// On error, every design added by this call has been removed again.
    async fn get_dataset(&self) -> Result<RetrievalOutcome, RetrievalError>;

    /// Delete every design this retriever added. Returns how many were removed.
    async fn remove_dataset(&self) -> Result<usize, RetrievalError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    /// The corpus was already in the registry; nothing was fetched.
    AlreadyPresent { designs: usize },
    /// The corpus was fetched and this many designs were registered.
    Retrieved { designs: usize },
}

impl RetrievalOutcome {
    pub fn design_count(&self) -> usize {
        match self {
            RetrievalOutcome::AlreadyPresent { designs } | RetrievalOutcome::Retrieved { designs } => *designs,
        }
    }
}
