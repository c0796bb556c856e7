// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `registry` - dataset open/recovery and design/artifact commits
//! * `retrieval` - corpus retrieval lifecycle
//! * `runner` - flow batch lifecycle and per-design outcomes

pub mod registry;
pub mod retrieval;
pub mod runner;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    fn log(&self);
}
