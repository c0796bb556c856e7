// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default number of concurrent flow jobs
pub const DEFAULT_N_JOBS: usize = 1;
/// Default per-design job timeout (10 minutes); EDA tools can hang indefinitely
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 600;

/// Name of the authoritative registry index file under the dataset root
pub const INDEX_FILE_NAME: &str = "index.json";
/// Directory holding one subdirectory per design
pub const DESIGNS_DIR_NAME: &str = "designs";
/// Scratch area for in-flight writes; wiped when a dataset is opened
pub const STAGING_DIR_NAME: &str = ".staging";
pub const SOURCES_DIR_NAME: &str = "sources";
pub const ARTIFACTS_DIR_NAME: &str = "artifacts";
/// Per-flow artifact metadata file inside `artifacts/<flow_id>/`
pub const ARTIFACT_METADATA_FILE_NAME: &str = "artifact.json";
/// Index layout version written by this crate
pub const INDEX_FORMAT_VERSION: u32 = 1;

pub const VERILOG_SOURCE_EXTENSIONS: &[&str] = &["v", "sv", "svh", "vh", "h", "inc"];
/// Files that stand on their own; the remaining Verilog extensions are headers.
pub const COMPILATION_UNIT_EXTENSIONS: &[&str] = &["v", "sv"];
pub const HARDWARE_DATA_TEXT_EXTENSIONS: &[&str] = &["coe", "mif", "mem"];

/// True for Verilog/SystemVerilog sources and headers (case-insensitive).
pub fn is_verilog_source(path: &std::path::Path) -> bool {
    has_extension_in(path, VERILOG_SOURCE_EXTENSIONS)
}

/// True for `.v` / `.sv` files, excluding include headers.
pub fn is_compilation_unit(path: &std::path::Path) -> bool {
    has_extension_in(path, COMPILATION_UNIT_EXTENSIONS)
}

/// True for anything a design may carry as a source file: HDL plus memory init data.
pub fn is_design_source(path: &std::path::Path) -> bool {
    has_extension_in(path, VERILOG_SOURCE_EXTENSIONS)
        || has_extension_in(path, HARDWARE_DATA_TEXT_EXTENSIONS)
}

fn has_extension_in(path: &std::path::Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}
