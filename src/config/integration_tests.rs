// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::time::Duration;
use tempfile::TempDir;

use crate::config::{load_and_validate_config, RuntimeBuilder};
use crate::errors::ConfigError;
use crate::registry::DesignFilter;
use crate::traits::RetrievalOutcome;

fn session(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let corpus = dir.path().join("iscas85");
    fs::create_dir_all(&corpus).unwrap();
    fs::write(corpus.join("c17.v"), "module c17 (N1, N22);\nendmodule\n").unwrap();
    fs::write(corpus.join("c432.v"), "module c432 (N1, N223);\nendmodule\n").unwrap();

    let yaml = format!(
        "dataset:\n  path: {}\n{}",
        dir.path().join("dataset").display(),
        body.replace("$CORPUS", &corpus.display().to_string())
    );
    let path = dir.path().join("session.yaml");
    fs::write(&path, yaml).unwrap();
    path
}

#[tokio::test]
async fn test_session_from_yaml_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = session(
        &dir,
        r#"runner:
  n_jobs: 2
  timeout_seconds: 30
retrievers:
  - kind: local_directory
    dataset_source: iscas85
    options:
      path: $CORPUS
      metadata:
        license: public-domain
flows:
  - kind: line_count
  - kind: module_info
"#,
    );

    let config = load_and_validate_config(&path).unwrap();
    let runtime = RuntimeBuilder::from_config(&config).unwrap();
    assert_eq!(runtime.runner.options().n_jobs, 2);
    assert_eq!(runtime.runner.options().timeout, Duration::from_secs(30));

    let outcomes = runtime.retrieve_all().await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0].1, RetrievalOutcome::Retrieved { .. }));
    assert_eq!(outcomes[0].1.design_count(), 2);

    let summaries = runtime.build_all(DesignFilter::all()).await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert!(summaries.iter().all(|s| s.success_count() == 2));

    let c17 = runtime.registry.get_design("c17").unwrap();
    assert_eq!(c17.metadata["license"], "public-domain");
    assert_eq!(c17.artifact("module_info").unwrap().data["modules"][0], "c17");

    // A second session over the same dataset has nothing left to do.
    let runtime = RuntimeBuilder::from_config(&config).unwrap();
    let outcomes = runtime.retrieve_all().await.unwrap();
    assert!(matches!(outcomes[0].1, RetrievalOutcome::AlreadyPresent { .. }));
    let summaries = runtime.build_all(DesignFilter::all()).await.unwrap();
    assert!(summaries.iter().all(|s| s.up_to_date.len() == 2 && s.success_count() == 0));
}

#[test]
fn test_bad_option_reported_before_dataset_is_created() {
    let dir = TempDir::new().unwrap();
    let path = session(
        &dir,
        r#"flows:
  - kind: yosys_aig
    options:
      yosys_bin: { nested: true }
"#,
    );

    let config = load_and_validate_config(&path).unwrap();
    let err = RuntimeBuilder::from_config(&config).err().unwrap();
    assert!(matches!(err, ConfigError::InvalidOption { .. }));
    assert!(!dir.path().join("dataset").exists());
}

#[test]
fn test_foreign_dataset_directory_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = session(&dir, "");
    fs::create_dir_all(dir.path().join("dataset")).unwrap();
    fs::write(dir.path().join("dataset/README"), "mine").unwrap();

    let config = load_and_validate_config(&path).unwrap();
    let err = RuntimeBuilder::from_config(&config).err().unwrap();
    assert!(matches!(err, ConfigError::Registry(_)));
}

#[test]
fn test_validation_collects_every_problem() {
    let dir = TempDir::new().unwrap();
    let path = session(
        &dir,
        r#"runner:
  n_jobs: 0
retrievers:
  - { kind: local_directory, dataset_source: iscas85, options: { path: $CORPUS } }
  - { kind: local_directory, dataset_source: iscas85, options: { path: $CORPUS } }
flows:
  - kind: module_info
  - kind: module_info
"#,
    );

    match load_and_validate_config(&path) {
        Err(ConfigError::Invalid(problems)) => assert_eq!(problems.len(), 3, "{:?}", problems),
        other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
    }
}
