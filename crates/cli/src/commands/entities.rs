//! Batch entity extraction, consolidation, and the prominence report.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use consolidate::consolidate_batches;
use extract::{BatchExtractor, ExtractorConfig};
use oracle::{DEFAULT_TIMEOUT_SECS, Oracle};
use report::{DEFAULT_THRESHOLD_PERCENT, prominence_threshold, render_entity_report};

#[derive(Args, Debug)]
pub struct EntitiesArgs {
    /// Corpus JSON file to mine for entities
    pub input: PathBuf,

    /// Report file; defaults to entity_report.md beside the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the consolidated entities to this JSON file
    #[arg(short = 'j', long)]
    pub json_output: Option<PathBuf>,

    /// Stories per extraction call
    #[arg(short, long, default_value_t = extract::DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Prominence threshold as a percentage of total stories
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD_PERCENT)]
    pub threshold: usize,

    /// Model passed to `llm -m`; omit to use the `llm` default model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Seconds to wait for each model call
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Directory for per-batch response dumps
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,
}

pub async fn run(args: EntitiesArgs) -> Result<()> {
    let oracle = super::build_oracle(args.model.as_deref(), args.timeout);
    execute(oracle, args).await
}

pub async fn execute(oracle: Arc<dyn Oracle>, args: EntitiesArgs) -> Result<()> {
    let stories = corpus::load_corpus(&args.input).await?;
    println!("Loaded {} stories", stories.len());

    if let Some(dir) = &args.debug_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let extractor = BatchExtractor::new(
        oracle,
        ExtractorConfig {
            batch_size: args.batch_size,
            debug_dir: args.debug_dir.clone(),
        },
    );
    let outcomes = extractor.run(&stories).await?;
    let batch_count = outcomes.len();
    let failures: Vec<String> = outcomes
        .iter()
        .filter_map(|outcome| {
            outcome
                .failure
                .as_ref()
                .map(|failure| format!("Batch {}: {}", outcome.batch_num, failure))
        })
        .collect();

    println!("Consolidating entities across all batches...");
    let aggregate = consolidate_batches(outcomes.iter().map(|outcome| &outcome.entities));

    println!("\nExtraction Summary:");
    println!("  Individuals: {}", aggregate.individuals.len());
    println!("  Events: {}", aggregate.events.len());
    println!("  Places: {}", aggregate.places.len());

    if let Some(path) = &args.json_output {
        corpus::write_json_pretty(path, &aggregate).await?;
        println!("Structured data saved to {}", path.display());
    }

    let markdown = render_entity_report(&aggregate, stories.len(), args.threshold);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_file_name("entity_report.md"));
    tokio::fs::write(&output, &markdown)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("\nEntity report saved to {}", output.display());
    println!(
        "  Analyzed {} stories in {} batches",
        stories.len(),
        batch_count
    );
    println!(
        "  Prominence threshold: {}% ({} stories)",
        args.threshold,
        prominence_threshold(stories.len(), args.threshold)
    );

    if !failures.is_empty() {
        println!("\n{} batches degraded to empty results:", failures.len());
        for failure in &failures {
            println!("  - {failure}");
        }
    }
    Ok(())
}
