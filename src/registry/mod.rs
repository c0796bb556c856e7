// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Persistent design registry: the single source of truth for which designs
//! exist and what has been computed about them.

mod design;
mod filter;
mod index;
mod store;


pub use design::{
    ArtifactFile, ArtifactPayload, ArtifactRecord, Design, FlowRunRecord, FlowRunStatus, FlowType,
    Metadata, NewDesign,
};
pub use filter::DesignFilter;
pub use index::DatasetEntry;
pub use store::{DesignRegistry, Designs};
