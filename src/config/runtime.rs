// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::engine::{FlowRunner, RunSummary, RunnerOptions};
use crate::errors::{ConfigError, RetrievalError, RunnerError};
use crate::flows::FlowFactory;
use crate::registry::{DesignFilter, DesignRegistry};
use crate::retrievers::RetrieverFactory;
use crate::traits::{DatasetRetriever, Flow, RetrievalOutcome};

/// Everything one curation session needs, wired to a single registry.
pub struct Runtime {
    pub registry: Arc<DesignRegistry>,
    pub retrievers: Vec<Arc<dyn DatasetRetriever>>,
    pub flows: Vec<Arc<dyn Flow>>,
    pub runner: FlowRunner,
}

impl Runtime {
    /// Run every retriever in config order. Stops at the first failure; the
    /// failing retriever has already rolled its corpus back.
    pub async fn retrieve_all(&self) -> Result<Vec<(String, RetrievalOutcome)>, RetrievalError> {
        let mut outcomes = Vec::with_capacity(self.retrievers.len());
        for retriever in &self.retrievers {
            let outcome = retriever.get_dataset().await?;
            outcomes.push((retriever.dataset_source().to_string(), outcome));
        }
        Ok(outcomes)
    }

    /// Run every flow in config order over the designs matching `filter`.
    /// Stops early once the runner's cancellation token fires.
    pub async fn build_all(&self, filter: DesignFilter) -> Result<Vec<RunSummary>, RunnerError> {
        let mut summaries = Vec::with_capacity(self.flows.len());
        for flow in &self.flows {
            if self.runner.cancellation_token().is_cancelled() {
                break;
            }
            summaries.push(self.runner.build_flow(flow.clone(), filter.clone()).await?);
        }
        Ok(summaries)
    }
}

/// Session runtime builder - opens the dataset and instantiates the
/// configured retrievers, flows and runner.
///
/// # Examples
///
/// ```no_run
/// use design_dataset::config::{load_and_validate_config, RuntimeBuilder};
///
/// let config = load_and_validate_config("session.yaml").unwrap();
/// let runtime = RuntimeBuilder::from_config(&config).unwrap();
/// assert_eq!(runtime.flows.len(), config.flows.len());
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    pub fn from_config(cfg: &Config) -> Result<Runtime, ConfigError> {
        Self::from_config_with_cancellation(cfg, CancellationToken::new())
    }

    /// Same as [`Self::from_config`], with the runner observing `cancellation`.
    pub fn from_config_with_cancellation(
        cfg: &Config,
        cancellation: CancellationToken,
    ) -> Result<Runtime, ConfigError> {
        // Reject unknown kinds before touching the dataset directory.
        let flows = cfg
            .flows
            .iter()
            .map(FlowFactory::create)
            .collect::<Result<Vec<_>, _>>()?;

        let registry = Arc::new(DesignRegistry::open_or_create(
            &cfg.dataset.path,
            cfg.dataset.overwrite,
        )?);

        let retrievers = cfg
            .retrievers
            .iter()
            .map(|r| RetrieverFactory::create(r, registry.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        let runner = FlowRunner::new(registry.clone(), RunnerOptions::from_config(&cfg.runner))
            .with_cancellation(cancellation);

        Ok(Runtime {
            registry,
            retrievers,
            flows,
            runner,
        })
    }
}
