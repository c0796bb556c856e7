// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Analysis flows.
//!
//! Pure flows read the design sources directly; tool flows drive an external
//! EDA binary through [`tool::run_tool`] inside the job's scratch directory.

mod factory;
mod line_count;
mod module_info;
pub mod tool;
mod verible_ast;
mod yosys_aig;

#[cfg(test)]
pub(crate) mod stub;

pub use factory::FlowFactory;
pub use line_count::LineCountFlow;
pub use module_info::{declared_modules, ModuleInfoFlow};
pub use verible_ast::VeribleAstFlow;
pub use yosys_aig::{synthesis_script, YosysAigFlow};
