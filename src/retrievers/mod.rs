// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dataset retrievers.
//!
//! A retriever brings one external corpus into the registry under its
//! `dataset_source` tag. Every retriever goes through a
//! [`RetrievalTransaction`], so a corpus is either fully registered and
//! marked complete or not present at all.

mod factory;
mod local_directory;
mod manifest;
mod transaction;

pub use factory::RetrieverFactory;
pub use local_directory::{DirectoryLayout, LocalDirectoryRetriever};
pub use manifest::{Manifest, ManifestEntry, ManifestRetriever};
pub use transaction::{already_present, RetrievalTransaction};
