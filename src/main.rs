use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{error, info};

use fp_normalizer::classifier::classify;
use fp_normalizer::config::Config;
use fp_normalizer::engine::NormalizerEngine;
use fp_normalizer::logging;
use fp_normalizer::types::SnapshotSummary;

#[derive(Parser)]
#[command(name = "fp_normalizer")]
#[command(about = "Normalizes raw device-telemetry snapshots into canonical attribute records")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize one snapshot file or every *.json file in a directory
    Normalize {
        /// Snapshot file or directory of snapshot files
        #[arg(long)]
        input: PathBuf,
        /// Directory for normalized output (defaults to the input's directory)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Pretty-print the normalized JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Print the domain that owns an attribute key
    Classify {
        /// Attribute key to classify
        #[arg(long)]
        key: String,
    },
}

/// Collects the snapshot files behind `input`: the file itself, or every
/// `*.json` in the directory except earlier normalization output.
async fn snapshot_files(input: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let metadata = tokio::fs::metadata(input)
        .await
        .with_context(|| format!("cannot access '{}'", input.display()))?;
    if metadata.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(input)
        .await
        .with_context(|| format!("cannot list '{}'", input.display()))?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json")
            && !path.to_string_lossy().ends_with(".normalized.json")
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

async fn normalize_file(
    engine: Arc<NormalizerEngine>,
    input: PathBuf,
    output_dir: Option<PathBuf>,
    pretty: bool,
) -> anyhow::Result<SnapshotSummary> {
    let content = tokio::fs::read_to_string(&input)
        .await
        .with_context(|| format!("failed to read snapshot '{}'", input.display()))?;
    let snapshot: Value = serde_json::from_str(&content)
        .with_context(|| format!("invalid JSON in '{}'", input.display()))?;

    let normalized = engine.normalize_snapshot(&snapshot)?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("snapshot");
    let out_name = format!("{stem}.normalized.json");
    let out_path = match &output_dir {
        Some(dir) => dir.join(out_name),
        None => input.with_file_name(out_name),
    };
    let serialized = if pretty {
        serde_json::to_string_pretty(&normalized)?
    } else {
        serde_json::to_string(&normalized)?
    };
    tokio::fs::write(&out_path, serialized)
        .await
        .with_context(|| format!("failed to write '{}'", out_path.display()))?;

    info!("wrote normalized snapshot to {}", out_path.display());
    Ok(normalized.summary)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Normalize {
            input,
            output,
            pretty,
        } => {
            let output_dir = output.or(config.normalizer.output_dir);
            let pretty = pretty || config.normalizer.pretty;
            if let Some(dir) = &output_dir {
                tokio::fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("cannot create '{}'", dir.display()))?;
            }

            let files = snapshot_files(&input).await?;
            if files.is_empty() {
                println!("⚠️  No snapshot files found in {}", input.display());
                return Ok(());
            }
            println!("🔄 Normalizing {} snapshot file(s)...", files.len());

            let engine = Arc::new(NormalizerEngine::default());
            let mut handles = Vec::new();
            for file in files {
                let engine = engine.clone();
                let output_dir = output_dir.clone();
                handles.push(tokio::spawn(async move {
                    let name = file.display().to_string();
                    let outcome = normalize_file(engine, file, output_dir, pretty).await;
                    (name, outcome)
                }));
            }

            let mut failures = 0usize;
            for handle in handles {
                let (name, outcome) = handle.await?;
                match outcome {
                    Ok(summary) => {
                        println!("\n📊 {}", name);
                        println!("   Total attributes: {}", summary.total);
                        println!("   Normalized: {}", summary.normalized);
                        println!("   Dropped: {}", summary.dropped);
                    }
                    Err(e) => {
                        failures += 1;
                        error!("normalization failed for {}: {}", name, e);
                        println!("❌ {}: {}", name, e);
                    }
                }
            }
            if failures == 0 {
                println!("\n✅ Normalization completed successfully");
            } else {
                println!("\n⚠️  Completed with {} failure(s)", failures);
            }
        }
        Commands::Classify { key } => {
            let domain = classify(&key);
            println!("🔎 {}: {}", key, domain.as_str());
        }
    }
    Ok(())
}
