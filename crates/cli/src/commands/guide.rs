//! Narrative coverage guide synthesis.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use oracle::{DEFAULT_TIMEOUT_SECS, Oracle};
use synthesis::{
    DEFAULT_FAN_IN, DEFAULT_GUIDE_BATCH_SIZE, GuideBuilder, GuideConfig, render_batch_summaries,
};

#[derive(Args, Debug)]
pub struct GuideArgs {
    /// Corpus JSON file to synthesize
    pub input: PathBuf,

    /// Guide file; defaults to beatbook.md beside the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stories per summary batch
    #[arg(short, long, default_value_t = DEFAULT_GUIDE_BATCH_SIZE)]
    pub batch_size: usize,

    /// Summaries consolidated per reduction call
    #[arg(long, default_value_t = DEFAULT_FAN_IN)]
    pub fan_in: usize,

    /// Beat name woven into the prompts and the document title
    #[arg(short, long, default_value = "this beat")]
    pub topic: String,

    /// File of background text folded into the final prompt
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Stop after the batch summaries and write those alone
    #[arg(long)]
    pub summaries_only: bool,

    /// Model passed to `llm -m`; omit to use the `llm` default model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Seconds to wait for each model call
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Directory for per-batch summary dumps
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,
}

pub async fn run(args: GuideArgs) -> Result<()> {
    let oracle = super::build_oracle(args.model.as_deref(), args.timeout);
    execute(oracle, args).await
}

pub async fn execute(oracle: Arc<dyn Oracle>, args: GuideArgs) -> Result<()> {
    let stories = corpus::load_corpus(&args.input).await?;
    println!("Loaded {} stories", stories.len());

    let context = match &args.context {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };
    if let Some(dir) = &args.debug_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let builder = GuideBuilder::new(
        oracle,
        GuideConfig {
            batch_size: args.batch_size,
            fan_in: args.fan_in,
            topic: args.topic.clone(),
            context,
            debug_dir: args.debug_dir.clone(),
        },
    );
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_file_name("beatbook.md"));

    if args.summaries_only {
        let mut errors = Vec::new();
        let leaves = builder.summarize_batches(&stories, &mut errors).await?;
        let path = summaries_path(&output);
        tokio::fs::write(&path, render_batch_summaries(&leaves))
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Batch summaries saved to {}", path.display());
        println!(
            "  Analyzed {} stories in {} batches",
            stories.len(),
            leaves.len()
        );
        print_errors(&errors);
        return Ok(());
    }

    let outcome = builder.build(&stories).await?;
    tokio::fs::write(&output, &outcome.markdown)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Beat book saved to {}", output.display());
    println!(
        "  Analyzed {} stories in {} batches",
        stories.len(),
        outcome.batch_count
    );
    if let Some((start, end)) = &synthesis::analyze(&stories).date_range {
        println!("  Date range: {start} to {end}");
    }
    print_errors(&outcome.errors);
    Ok(())
}

/// `<stem>_summaries.md` next to the would-be guide file.
fn summaries_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("beatbook");
    output.with_file_name(format!("{stem}_summaries.md"))
}

fn print_errors(errors: &[String]) {
    if !errors.is_empty() {
        println!("  {} model calls degraded:", errors.len());
        for error in errors {
            println!("    - {error}");
        }
    }
}
