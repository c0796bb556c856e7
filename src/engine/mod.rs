// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Batch execution of flows over the registry.

mod runner;
mod summary;


pub use runner::{FlowRunner, RunnerOptions};
pub use summary::{FailedDesign, RunSummary};
