// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::{DirectoryLayout, LocalDirectoryRetriever, ManifestRetriever};
use crate::config::{Options, RetrieverConfig};
use crate::errors::ConfigError;
use crate::registry::{DesignRegistry, Metadata};
use crate::traits::DatasetRetriever;

/// Factory for dataset retrievers configured under `retrievers:`
pub struct RetrieverFactory;

impl RetrieverFactory {
    /// Create a retriever bound to `registry` from its config entry.
    ///
    /// The `kind` field selects the implementation:
    /// - "local_directory" -> LocalDirectoryRetriever (options: `path`, `layout`, `id_prefix`, `metadata`)
    /// - "manifest" -> ManifestRetriever (options: `manifest`)
    pub fn create(
        config: &RetrieverConfig,
        registry: Arc<DesignRegistry>,
    ) -> Result<Arc<dyn DatasetRetriever>, ConfigError> {
        let options = Options::new(&config.kind, &config.options);

        match config.kind.as_str() {
            "local_directory" => {
                let root = options.required_path("path")?;
                let layout = options.parse::<DirectoryLayout>("layout")?.unwrap_or_default();
                let mut retriever =
                    LocalDirectoryRetriever::new(registry, config.dataset_source.clone(), root, layout);
                if let Some(prefix) = options.string("id_prefix")? {
                    retriever = retriever.with_id_prefix(prefix);
                }
                if let Some(metadata) = options.parse::<Metadata>("metadata")? {
                    retriever = retriever.with_metadata(metadata);
                }
                Ok(Arc::new(retriever))
            }
            "manifest" => {
                let manifest = options.required_path("manifest")?;
                Ok(Arc::new(ManifestRetriever::new(
                    registry,
                    config.dataset_source.clone(),
                    manifest,
                )))
            }
            other => Err(ConfigError::UnknownKind {
                category: "retriever",
                kind: other.to_string(),
                available: Self::list_available_implementations(),
            }),
        }
    }

    /// List all available retriever implementations
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec!["local_directory", "manifest"]
    }

    /// Check if an implementation is available
    pub fn is_implementation_available(kind: &str) -> bool {
        Self::list_available_implementations().contains(&kind)
    }
}
