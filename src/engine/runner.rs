// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::summary::{FailedDesign, RunSummary};
use crate::config::consts::{DEFAULT_N_JOBS, DEFAULT_TIMEOUT_SECONDS};
use crate::config::RunnerConfig;
use crate::errors::{FlowExecutionError, RunnerError};
use crate::observability::messages::runner::{
    DesignFailed, DesignSucceeded, FlowRunCompleted, FlowRunStarted,
};
use crate::observability::messages::StructuredLog;
use crate::registry::{ArtifactPayload, Design, DesignFilter, DesignRegistry, FlowRunRecord};
use crate::traits::{Flow, FlowContext};

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Upper bound on concurrently running jobs. Values below 1 are treated as 1.
    pub n_jobs: usize,
    /// Per-design wall-clock limit.
    pub timeout: Duration,
    /// Recompute designs that already hold a current artifact.
    pub overwrite: bool,
    /// Parent of the per-job scratch directories; the system temp dir when unset.
    pub scratch_root: Option<PathBuf>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            n_jobs: DEFAULT_N_JOBS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            overwrite: false,
            scratch_root: None,
        }
    }
}

impl RunnerOptions {
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            n_jobs: config.get_n_jobs(),
            timeout: config.get_timeout(),
            overwrite: config.overwrite,
            scratch_root: config.scratch_dir.clone(),
        }
    }
}

/// Runs one flow over a filtered set of designs with bounded parallelism.
///
/// Each job gets its own scratch directory and is bounded by the configured
/// timeout. A job's outcome is committed to the registry only after it
/// finishes successfully; failures are recorded as run records and never
/// abort the batch. Cancelling the token stops queued jobs from starting and
/// drops in-flight ones, killing any child processes they own.
pub struct FlowRunner {
    registry: Arc<DesignRegistry>,
    options: RunnerOptions,
    cancellation: CancellationToken,
}

enum JobOutcome {
    Succeeded { design_id: String, duration: Duration },
    Failed { design_id: String, detail: String },
    Cancelled { design_id: String },
}

impl FlowRunner {
    pub fn new(registry: Arc<DesignRegistry>, options: RunnerOptions) -> Self {
        Self {
            registry,
            options,
            cancellation: CancellationToken::new(),
        }
    }

    /// Share an externally owned token, e.g. one cancelled on Ctrl-C.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn registry(&self) -> &Arc<DesignRegistry> {
        &self.registry
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Apply `flow` to every design matching `filter`.
    ///
    /// Per-design failures land in the summary; only registry failures while
    /// recording run outcomes abort with an error.
    pub async fn build_flow(
        &self,
        flow: Arc<dyn Flow>,
        filter: DesignFilter,
    ) -> Result<RunSummary, RunnerError> {
        let n_jobs = self.options.n_jobs.max(1);
        let started = FlowRunStarted {
            flow_id: flow.flow_id(),
            n_jobs,
            timeout: self.options.timeout,
        };
        started.log();
        let span = started.span();

        self.run_batch(flow, filter, n_jobs).instrument(span).await
    }

    fn is_up_to_date(&self, flow: &dyn Flow, design: &Design) -> bool {
        !self.options.overwrite
            && design
                .artifact(flow.flow_id())
                .map_or(false, |artifact| artifact.tool_version == flow.tool_version())
    }

    async fn run_batch(
        &self,
        flow: Arc<dyn Flow>,
        filter: DesignFilter,
        n_jobs: usize,
    ) -> Result<RunSummary, RunnerError> {
        let started = Instant::now();
        let flow_id = flow.flow_id().to_string();
        let mut summary = RunSummary::new(&flow_id);

        if let Some(root) = &self.options.scratch_root {
            std::fs::create_dir_all(root).map_err(RunnerError::Scratch)?;
        }

        let mut pending = Vec::new();
        for design in self.registry.list_designs(filter) {
            if !flow.is_applicable(&design) {
                summary.skipped.push(design.design_id);
            } else if self.is_up_to_date(flow.as_ref(), &design) {
                summary.up_to_date.push(design.design_id);
            } else {
                pending.push(design);
            }
        }

        let skipped_records = summary
            .skipped
            .iter()
            .map(|id| (id.clone(), FlowRunRecord::skipped_not_applicable()))
            .collect();
        self.registry.record_runs(&flow_id, skipped_records)?;

        let semaphore = Arc::new(Semaphore::new(n_jobs));
        let mut jobs = JoinSet::new();
        for design in pending {
            let semaphore = semaphore.clone();
            let flow = flow.clone();
            let registry = self.registry.clone();
            let options = self.options.clone();
            let cancellation = self.cancellation.clone();

            jobs.spawn(async move {
                let design_id = design.design_id.clone();
                let _permit = tokio::select! {
                    biased;
                    _ = cancellation.cancelled() => return JobOutcome::Cancelled { design_id },
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return JobOutcome::Cancelled { design_id },
                    },
                };
                if cancellation.is_cancelled() {
                    return JobOutcome::Cancelled { design_id };
                }

                // The job runs in its own task so a panicking flow is reported
                // against its design. Owning it in a JoinSet aborts it, and
                // kills its child processes, when this wrapper is dropped.
                let mut job = JoinSet::new();
                job.spawn(run_job(flow, registry, options, cancellation, design));
                match job.join_next().await {
                    Some(Ok(outcome)) => outcome,
                    Some(Err(e)) if e.is_panic() => JobOutcome::Failed {
                        design_id,
                        detail: "flow panicked".to_string(),
                    },
                    _ => JobOutcome::Cancelled { design_id },
                }
            });
        }

        let mut failed_records = Vec::new();
        while let Some(joined) = jobs.join_next().await {
            match joined.map_err(RunnerError::Join)? {
                JobOutcome::Succeeded { design_id, duration } => {
                    DesignSucceeded {
                        flow_id: &flow_id,
                        design_id: &design_id,
                        duration,
                    }
                    .log();
                    summary.success.push(design_id);
                }
                JobOutcome::Failed { design_id, detail } => {
                    DesignFailed {
                        flow_id: &flow_id,
                        design_id: &design_id,
                        detail: &detail,
                    }
                    .log();
                    failed_records.push((
                        design_id.clone(),
                        FlowRunRecord::failed(detail.clone(), flow.tool_version()),
                    ));
                    summary.failed.push(FailedDesign { design_id, detail });
                }
                JobOutcome::Cancelled { design_id } => summary.cancelled.push(design_id),
            }
        }

        self.registry.record_runs(&flow_id, failed_records)?;

        summary.sort();
        summary.duration = started.elapsed();
        FlowRunCompleted {
            flow_id: &flow_id,
            success: summary.success.len(),
            failed: summary.failed.len(),
            skipped: summary.skipped.len(),
            up_to_date: summary.up_to_date.len(),
            cancelled: summary.cancelled.len(),
            duration: summary.duration,
        }
        .log();

        Ok(summary)
    }
}

async fn run_job(
    flow: Arc<dyn Flow>,
    registry: Arc<DesignRegistry>,
    options: RunnerOptions,
    cancellation: CancellationToken,
    design: Design,
) -> JobOutcome {
    let started = Instant::now();
    let design_id = design.design_id.clone();
    let flow_id = flow.flow_id().to_string();

    let mut scratch = tempfile::Builder::new();
    let prefix = format!("{}-{}-", flow_id, design_id);
    scratch.prefix(&prefix);
    let scratch = match &options.scratch_root {
        Some(root) => scratch.tempdir_in(root),
        None => scratch.tempdir(),
    };
    let scratch = match scratch {
        Ok(dir) => dir,
        Err(e) => {
            return JobOutcome::Failed {
                design_id,
                detail: format!("failed to create scratch directory: {}", e),
            }
        }
    };

    let ctx = FlowContext {
        design,
        scratch_dir: scratch.path().to_path_buf(),
        timeout: options.timeout,
        cancellation: cancellation.child_token(),
    };

    let result = tokio::select! {
        biased;
        _ = cancellation.cancelled() => Err(FlowExecutionError::Cancelled),
        ran = tokio::time::timeout(options.timeout, flow.run_one(&ctx)) => match ran {
            Ok(result) => result,
            Err(_) => Err(FlowExecutionError::Timeout {
                tool: flow_id.clone(),
                after: options.timeout,
            }),
        },
    };

    let output = match result {
        Ok(output) => output,
        Err(FlowExecutionError::Cancelled) => return JobOutcome::Cancelled { design_id },
        Err(e) => {
            return JobOutcome::Failed {
                design_id,
                detail: e.to_string(),
            }
        }
    };
    if cancellation.is_cancelled() {
        return JobOutcome::Cancelled { design_id };
    }

    let payload = ArtifactPayload {
        flow_type: flow.flow_type(),
        tool_version: flow.tool_version(),
        data: output.data,
        files: output.files,
    };
    let commit_id = design_id.clone();
    let committed = tokio::task::spawn_blocking(move || {
        registry.write_artifact(&commit_id, &flow_id, payload)
    })
    .await;

    // Staged artifact files live in scratch until the commit has copied them.
    drop(scratch);

    match committed {
        Ok(Ok(_)) => JobOutcome::Succeeded {
            design_id,
            duration: started.elapsed(),
        },
        Ok(Err(e)) => JobOutcome::Failed {
            design_id,
            detail: format!("failed to store artifact: {}", e),
        },
        Err(e) => JobOutcome::Failed {
            design_id,
            detail: format!("artifact commit task failed: {}", e),
        },
    }
}
