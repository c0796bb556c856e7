// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod flow;
mod registry;
mod retrieval;
mod runner;

pub use config::ConfigError;
pub use flow::FlowExecutionError;
pub use registry::{RegistryError, RegistryResult};
pub use retrieval::RetrievalError;
pub use runner::RunnerError;
