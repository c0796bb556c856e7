// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::env;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use design_dataset::config::{load_and_validate_config, RuntimeBuilder};
use design_dataset::observability::init_tracing;
use design_dataset::registry::DesignFilter;
use design_dataset::traits::RetrievalOutcome;

#[tokio::main]
async fn main() {
    init_tracing("info");

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <session.yaml> [session2.yaml ...]", args[0]);
        eprintln!("Example: {} configs/iscas85.yaml", args[0]);
        std::process::exit(1);
    }

    let cancellation = CancellationToken::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n⛔ Interrupted, cancelling running jobs...");
            on_interrupt.cancel();
        }
    });

    let mut failed = false;
    for (i, config_file) in args[1..].iter().enumerate() {
        if i > 0 {
            println!("\n{}", "─".repeat(80));
        }
        if cancellation.is_cancelled() {
            break;
        }

        if let Err(e) = run_single_config(config_file, cancellation.clone()).await {
            eprintln!("❌ Failed to run {}: {:#}", config_file, e);
            failed = true;
        }
    }

    if failed || cancellation.is_cancelled() {
        std::process::exit(1);
    }
}

async fn run_single_config(config_file: &str, cancellation: CancellationToken) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let config = load_and_validate_config(config_file)
        .with_context(|| format!("loading {}", config_file))?;
    let runtime = RuntimeBuilder::from_config_with_cancellation(&config, cancellation)
        .context("building session runtime")?;

    println!("📋 Configuration: {}", config_file);
    println!("🗄️  Dataset: {} ({} designs)", runtime.registry.root().display(), runtime.registry.len());
    println!("⚙️  Jobs: {}, timeout {:?}", runtime.runner.options().n_jobs, runtime.runner.options().timeout);

    println!("\n📥 Retrieval:");
    for (dataset_source, outcome) in runtime.retrieve_all().await? {
        match outcome {
            RetrievalOutcome::AlreadyPresent { designs } => {
                println!("  • {}: already present ({} designs)", dataset_source, designs)
            }
            RetrievalOutcome::Retrieved { designs } => {
                println!("  • {}: retrieved {} designs", dataset_source, designs)
            }
        }
    }

    println!("\n🔄 Flows:");
    for summary in runtime.build_all(DesignFilter::all()).await? {
        let marker = if summary.is_complete() { "✅" } else { "⚠️ " };
        println!("  {} {}", marker, summary);
    }

    println!("\n⏱️  Total Time: {:?}", start_time.elapsed());
    Ok(())
}
