// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

use super::RegistryError;

/// Failure while obtaining or normalizing one corpus.
///
/// A retriever returning this error has already rolled back every design it
/// registered during the failed call.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The raw source material could not be obtained.
    #[error("failed to fetch '{dataset_source}': {reason}")]
    Fetch {
        dataset_source: String,
        reason: String,
    },

    /// The raw material was obtained but could not be turned into designs.
    #[error("failed to normalize '{dataset_source}': {reason}")]
    Normalize {
        dataset_source: String,
        reason: String,
    },

    #[error("invalid manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
