// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod flow;
pub mod retriever;

pub use flow::{Flow, FlowContext, FlowOutput};
pub use retriever::{DatasetRetriever, RetrievalOutcome};
