// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! All-or-nothing registration of one corpus.

use std::collections::HashSet;
use std::time::Instant;

use crate::errors::{RegistryError, RetrievalError};
use crate::observability::messages::retrieval::{
    RetrievalCompleted, RetrievalRolledBack, RetrievalSkipped, RetrievalStarted,
};
use crate::observability::messages::StructuredLog;
use crate::registry::{DesignFilter, DesignRegistry, NewDesign};
use crate::traits::RetrievalOutcome;

/// Returns the outcome to report when `dataset_source` has already been
/// committed, logging the skip.
pub fn already_present(registry: &DesignRegistry, dataset_source: &str) -> Option<RetrievalOutcome> {
    let entry = registry.dataset_entry(dataset_source)?;
    RetrievalSkipped {
        dataset_source,
        design_count: entry.design_count,
    }
    .log();
    Some(RetrievalOutcome::AlreadyPresent {
        designs: entry.design_count,
    })
}

/// Run a blocking retrieval body (walking a corpus, copying sources,
/// committing the index) off the async executor.
pub(crate) async fn run_blocking<F>(dataset_source: &str, retrieve: F) -> Result<RetrievalOutcome, RetrievalError>
where
    F: FnOnce() -> Result<RetrievalOutcome, RetrievalError> + Send + 'static,
{
    tokio::task::spawn_blocking(retrieve)
        .await
        .map_err(|e| RetrievalError::Fetch {
            dataset_source: dataset_source.to_string(),
            reason: format!("retrieval task failed: {}", e),
        })?
}

/// Tracks the designs added during one `get_dataset` call.
///
/// Designs of the same source left by an earlier retrieval that never
/// committed stay untouched until [`commit`](Self::commit): re-fetched ids
/// replace them and the rest are removed, together with writing the dataset
/// completion marker. Anything else (an explicit
/// [`rollback`](Self::rollback), an early return, a dropped future) removes
/// the designs added so far and leaves the earlier ones in place.
pub struct RetrievalTransaction<'a> {
    registry: &'a DesignRegistry,
    dataset_source: String,
    stale: HashSet<String>,
    added: Vec<String>,
    replacements: Vec<NewDesign>,
    started: Instant,
    finished: bool,
}

impl<'a> RetrievalTransaction<'a> {
    pub fn begin(registry: &'a DesignRegistry, dataset_source: &str) -> Result<Self, RetrievalError> {
        RetrievalStarted { dataset_source }.log();
        let stale: HashSet<String> = registry
            .list_designs(DesignFilter::all().with_dataset_source(dataset_source))
            .map(|d| d.design_id)
            .collect();
        if !stale.is_empty() {
            tracing::warn!(
                dataset_source,
                designs = stale.len(),
                "Found designs from an incomplete earlier retrieval; they are replaced on commit"
            );
        }
        Ok(Self {
            registry,
            dataset_source: dataset_source.to_string(),
            stale,
            added: Vec::new(),
            replacements: Vec::new(),
            started: Instant::now(),
            finished: false,
        })
    }

    pub fn dataset_source(&self) -> &str {
        &self.dataset_source
    }

    /// Register one design under this transaction's dataset source. A design
    /// whose id an earlier incomplete retrieval already holds is staged and
    /// swapped in at commit.
    pub fn add(&mut self, mut design: NewDesign) -> Result<(), RetrievalError> {
        design.dataset_source = self.dataset_source.clone();
        if self.stale.contains(&design.design_id) {
            if self.replacements.iter().any(|r| r.design_id == design.design_id) {
                return Err(RegistryError::DuplicateDesign {
                    design_id: design.design_id,
                }
                .into());
            }
            self.replacements.push(design);
            return Ok(());
        }
        let added = self.registry.add_design(design)?;
        self.added.push(added.design_id);
        Ok(())
    }

    /// Ids registered so far, including those pending replacement at commit.
    pub fn added(&self) -> Vec<&str> {
        self.added
            .iter()
            .map(String::as_str)
            .chain(self.replacements.iter().map(|d| d.design_id.as_str()))
            .collect()
    }

    fn design_count(&self) -> usize {
        self.added.len() + self.replacements.len()
    }

    pub fn commit(mut self) -> Result<RetrievalOutcome, RetrievalError> {
        let design_count = self.design_count();
        if design_count == 0 {
            let err = RetrievalError::Normalize {
                dataset_source: self.dataset_source.clone(),
                reason: "no designs were found".to_string(),
            };
            self.rollback_inner(&err);
            return Err(err);
        }

        let replacements = std::mem::take(&mut self.replacements);
        let retire: Vec<String> = self
            .stale
            .iter()
            .filter(|id| !replacements.iter().any(|r| &r.design_id == *id))
            .cloned()
            .collect();
        if let Err(e) =
            self.registry
                .complete_dataset(&self.dataset_source, replacements, &retire, design_count)
        {
            let err = RetrievalError::from(e);
            self.rollback_inner(&err);
            return Err(err);
        }
        self.finished = true;
        RetrievalCompleted {
            dataset_source: &self.dataset_source,
            design_count,
            duration: self.started.elapsed(),
        }
        .log();
        Ok(RetrievalOutcome::Retrieved {
            designs: design_count,
        })
    }

    /// Undo everything added so far and hand the error back.
    pub fn rollback(mut self, error: RetrievalError) -> RetrievalError {
        self.rollback_inner(&error);
        error
    }

    fn rollback_inner(&mut self, error: &dyn std::error::Error) {
        self.finished = true;
        self.replacements.clear();
        let mut removed = 0;
        for design_id in self.added.drain(..) {
            match self.registry.remove_design(&design_id) {
                Ok(()) => removed += 1,
                Err(e) => tracing::error!(
                    design_id = %design_id,
                    error = %e,
                    "Failed to roll back design"
                ),
            }
        }
        RetrievalRolledBack {
            dataset_source: &self.dataset_source,
            removed,
            error,
        }
        .log();
    }
}

impl Drop for RetrievalTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let interrupted = RetrievalError::Fetch {
                dataset_source: self.dataset_source.clone(),
                reason: "retrieval interrupted before commit".to_string(),
            };
            self.rollback_inner(&interrupted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ArtifactPayload, FlowType};
    use std::fs;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, format!("module {}(); endmodule\n", name.trim_end_matches(".v"))).unwrap();
        path
    }

    #[test]
    fn test_commit_writes_marker_and_skip_detects_it() {
        let data = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        let registry = DesignRegistry::open_or_create(data.path().join("ds"), false).unwrap();

        let mut tx = RetrievalTransaction::begin(&registry, "iscas85").unwrap();
        tx.add(NewDesign::new("c17", "ignored").with_file(fixture(&src, "c17.v")))
            .unwrap();
        let outcome = tx.commit().unwrap();

        assert_eq!(outcome, RetrievalOutcome::Retrieved { designs: 1 });
        assert_eq!(registry.get_design("c17").unwrap().dataset_source, "iscas85");
        assert_eq!(
            already_present(&registry, "iscas85"),
            Some(RetrievalOutcome::AlreadyPresent { designs: 1 })
        );
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let data = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        let registry = DesignRegistry::open_or_create(data.path().join("ds"), false).unwrap();

        {
            let mut tx = RetrievalTransaction::begin(&registry, "iscas85").unwrap();
            tx.add(NewDesign::new("c17", "iscas85").with_file(fixture(&src, "c17.v")))
                .unwrap();
            tx.add(NewDesign::new("c432", "iscas85").with_file(fixture(&src, "c432.v")))
                .unwrap();
            assert_eq!(registry.len(), 2);
        }

        assert!(registry.is_empty());
        assert!(registry.dataset_entry("iscas85").is_none());
        assert!(!registry.design_dir("c17").exists());
    }

    fn leftover_design(registry: &DesignRegistry, src: &TempDir, design_id: &str) {
        registry
            .add_design(NewDesign::new(design_id, "iscas85").with_file(fixture(src, &format!("{}.v", design_id))))
            .unwrap();
        registry
            .write_artifact(
                design_id,
                "module_info",
                ArtifactPayload {
                    flow_type: FlowType::Text,
                    tool_version: None,
                    data: serde_json::json!({ "num_modules": 1 }),
                    files: Vec::new(),
                },
            )
            .unwrap();
    }

    #[test]
    fn test_failed_retrieval_keeps_designs_of_incomplete_earlier_run() {
        let data = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        let registry = DesignRegistry::open_or_create(data.path().join("ds"), false).unwrap();
        leftover_design(&registry, &src, "c17");
        assert!(registry.dataset_entry("iscas85").is_none());

        let mut tx = RetrievalTransaction::begin(&registry, "iscas85").unwrap();
        tx.add(NewDesign::new("c17", "iscas85").with_file(fixture(&src, "c17.v")))
            .unwrap();
        tx.add(NewDesign::new("c432", "iscas85").with_file(fixture(&src, "c432.v")))
            .unwrap();
        let err = tx.rollback(RetrievalError::Fetch {
            dataset_source: "iscas85".to_string(),
            reason: "connection reset".to_string(),
        });

        assert!(matches!(err, RetrievalError::Fetch { .. }));
        assert_eq!(registry.len(), 1);
        assert!(registry.has_artifact("c17", "module_info"));
        assert!(registry.sources_dir("c17").join("c17.v").is_file());
        assert!(!registry.contains("c432"));
        assert!(registry.dataset_entry("iscas85").is_none());
    }

    #[test]
    fn test_commit_replaces_refetched_and_retires_missing_leftovers() {
        let data = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        let fresh = TempDir::new().unwrap();
        let registry = DesignRegistry::open_or_create(data.path().join("ds"), false).unwrap();
        leftover_design(&registry, &src, "c17");
        leftover_design(&registry, &src, "c499");

        let c17 = fresh.path().join("c17.v");
        fs::write(&c17, "module c17(N1, N22); endmodule\n").unwrap();
        let mut tx = RetrievalTransaction::begin(&registry, "iscas85").unwrap();
        tx.add(NewDesign::new("c17", "iscas85").with_file(&c17)).unwrap();
        tx.add(NewDesign::new("c432", "iscas85").with_file(fixture(&src, "c432.v")))
            .unwrap();
        // nothing is swapped before commit
        assert!(registry.has_artifact("c17", "module_info"));
        assert_eq!(tx.added(), vec!["c432", "c17"]);

        let outcome = tx.commit().unwrap();

        assert_eq!(outcome, RetrievalOutcome::Retrieved { designs: 2 });
        assert_eq!(registry.dataset_entry("iscas85").unwrap().design_count, 2);
        let ids: Vec<String> = registry.list_designs(DesignFilter::all()).map(|d| d.design_id).collect();
        assert_eq!(ids, vec!["c17", "c432"]);
        assert!(!registry.has_artifact("c17", "module_info"));
        assert_eq!(
            fs::read_to_string(registry.sources_dir("c17").join("c17.v")).unwrap(),
            "module c17(N1, N22); endmodule\n"
        );
        assert!(!registry.design_dir("c499").exists());

        let reopened = DesignRegistry::open_or_create(data.path().join("ds"), false).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(!reopened.has_artifact("c17", "module_info"));
    }

    #[test]
    fn test_leftover_id_added_twice_is_a_duplicate() {
        let data = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        let registry = DesignRegistry::open_or_create(data.path().join("ds"), false).unwrap();
        leftover_design(&registry, &src, "c17");

        let mut tx = RetrievalTransaction::begin(&registry, "iscas85").unwrap();
        tx.add(NewDesign::new("c17", "iscas85").with_file(fixture(&src, "c17.v")))
            .unwrap();
        let err = tx
            .add(NewDesign::new("c17", "iscas85").with_file(fixture(&src, "c17.v")))
            .unwrap_err();

        assert!(matches!(
            err,
            RetrievalError::Registry(RegistryError::DuplicateDesign { .. })
        ));
        drop(tx);
        assert!(registry.has_artifact("c17", "module_info"));
    }

    #[test]
    fn test_empty_commit_is_a_normalize_error() {
        let data = TempDir::new().unwrap();
        let registry = DesignRegistry::open_or_create(data.path().join("ds"), false).unwrap();

        let tx = RetrievalTransaction::begin(&registry, "empty").unwrap();
        assert!(matches!(tx.commit(), Err(RetrievalError::Normalize { .. })));
        assert!(registry.dataset_entry("empty").is_none());
    }
}
