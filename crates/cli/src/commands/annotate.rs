//! Per-story annotation over a corpus file, resumable across runs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use annotate::{AnnotateRunner, RunSummary, RunnerConfig};
use anyhow::Result;
use clap::Args;
use oracle::{DEFAULT_TIMEOUT_SECS, Oracle};

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Corpus JSON file to annotate
    pub input: PathBuf,

    /// Output file, rewritten after every story
    #[arg(short, long, default_value = "annotated_stories.json")]
    pub output: PathBuf,

    /// Model passed to `llm -m`
    #[arg(short, long)]
    pub model: String,

    /// Seconds to wait for each model call
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Downsample the filtered work list to this many stories
    #[arg(long)]
    pub sample: Option<usize>,

    /// Work through the whole filtered list without sampling
    #[arg(long, conflicts_with = "sample")]
    pub no_sample: bool,

    /// Seed for reproducible sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Truncate the work list after sampling, for quick test runs
    #[arg(long)]
    pub limit: Option<usize>,

    /// Annotate only, skipping the summarization call
    #[arg(long)]
    pub skip_summary: bool,

    /// Seconds between the two model calls for one story
    #[arg(long)]
    pub inter_call_delay: Option<f64>,

    /// Seconds to pause after each story
    #[arg(long)]
    pub story_delay: Option<f64>,
}

pub async fn run(args: AnnotateArgs) -> Result<()> {
    let oracle = super::build_oracle(Some(&args.model), args.timeout);
    execute(oracle, args).await
}

pub async fn execute(oracle: Arc<dyn Oracle>, args: AnnotateArgs) -> Result<()> {
    let runner = AnnotateRunner::new(oracle, runner_config(&args));
    let summary = runner.run(&args.input, &args.output).await?;
    print_summary(&summary, &args);
    Ok(())
}

fn runner_config(args: &AnnotateArgs) -> RunnerConfig {
    let mut config = RunnerConfig::default();
    if args.no_sample {
        config.sample_target = None;
    } else if args.sample.is_some() {
        config.sample_target = args.sample;
    }
    if let Some(seed) = args.seed {
        config.sample_seed = seed;
    }
    config.limit = args.limit;
    config.skip_summary = args.skip_summary;
    if let Some(secs) = args.inter_call_delay {
        config.inter_call_delay = Duration::from_secs_f64(secs);
    }
    if let Some(secs) = args.story_delay {
        config.story_delay = Duration::from_secs_f64(secs);
    }
    config
}

fn print_summary(summary: &RunSummary, args: &AnnotateArgs) {
    println!("Total stories in input: {}", summary.total_input);
    println!("Filtered out: {}", summary.filtered_out);
    println!("Processed in this run: {}", summary.processed_this_run);
    println!("Total stories in output: {}", summary.total_in_output);
    println!(
        "Successfully annotated: {}/{}",
        summary.successful_annotations, summary.total_in_output
    );
    if !args.skip_summary {
        println!(
            "Summaries generated in this run: {}/{}",
            summary.summaries_generated, summary.processed_this_run
        );
    }

    println!("\nTheme breakdown:");
    for (theme, count) in &summary.theme_breakdown {
        println!("  {theme}: {count}");
    }
    println!("\nSeason breakdown:");
    for (season, count) in &summary.season_breakdown {
        println!("  {season}: {count}");
    }

    println!("\nOutput saved to: {}", args.output.display());

    if !summary.errors.is_empty() {
        println!("\n{} errors occurred:", summary.errors.len());
        for error in summary.errors.iter().take(5) {
            println!("  - {error}");
        }
        if summary.errors.len() > 5 {
            println!("  ... and {} more", summary.errors.len() - 5);
        }
    }
}
