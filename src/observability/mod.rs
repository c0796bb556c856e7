// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Log messages are struct types with a `Display` implementation, grouped by
//! subsystem under [`messages`], so the same event always renders the same
//! text and carries the same structured fields.
//!
//! # Usage
//!
//! ```rust
//! use design_dataset::observability::messages::runner::DesignFailed;
//! use design_dataset::observability::messages::StructuredLog;
//!
//! let msg = DesignFailed {
//!     flow_id: "yosys_aig",
//!     design_id: "c432",
//!     detail: "'yosys' timed out after 300s",
//! };
//!
//! msg.log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` when set, otherwise `default_filter`
/// (for example `"info"`). Calling this twice is harmless; the second call
/// is ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
