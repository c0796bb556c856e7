// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // session config + runtime wiring
pub mod engine;     // flow batch runner
pub mod errors;     // error handling
pub mod flows;      // analysis flows
pub mod observability;
pub mod registry;   // on-disk design store
pub mod retrievers; // corpus retrievers
pub mod traits;     // Flow / DatasetRetriever abstractions
