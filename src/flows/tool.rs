// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded invocation of external EDA tools.

use std::ffi::OsStr;
use std::process::Stdio;
use tokio::process::Command;

use crate::errors::FlowExecutionError;
use crate::traits::FlowContext;

/// Keep only the end of stderr in failure diagnostics; tools like yosys print
/// the actual error last, after pages of progress output.
const STDERR_TAIL_BYTES: usize = 4096;

#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` inside the job's scratch directory.
///
/// The child is killed if the job timeout elapses, if the run is cancelled,
/// or if the returned future is dropped. A non-zero exit becomes
/// [`FlowExecutionError::ToolFailed`] carrying the tail of stderr.
pub async fn run_tool<I, S>(
    ctx: &FlowContext,
    program: &str,
    args: I,
) -> Result<ToolOutput, FlowExecutionError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let child = Command::new(program)
        .args(args)
        .current_dir(ctx.scratch_dir())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| FlowExecutionError::Spawn {
            tool: program.to_string(),
            source: e,
        })?;

    let output = tokio::select! {
        biased;
        _ = ctx.cancellation.cancelled() => return Err(FlowExecutionError::Cancelled),
        waited = tokio::time::timeout(ctx.timeout, child.wait_with_output()) => match waited {
            Err(_) => {
                return Err(FlowExecutionError::Timeout {
                    tool: program.to_string(),
                    after: ctx.timeout,
                })
            }
            Ok(result) => result.map_err(|e| FlowExecutionError::Spawn {
                tool: program.to_string(),
                source: e,
            })?,
        },
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(FlowExecutionError::ToolFailed {
            tool: program.to_string(),
            status: output.status.to_string(),
            stderr: tail(stderr.trim_end(), STDERR_TAIL_BYTES).to_string(),
        });
    }

    Ok(ToolOutput { stdout, stderr })
}

fn tail(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
