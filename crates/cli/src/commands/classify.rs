//! Whole-corpus topic classification.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use annotate::{ClassifyConfig, TopicClassifier};
use anyhow::Result;
use clap::Args;
use oracle::{DEFAULT_TIMEOUT_SECS, Oracle};

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Corpus JSON file to classify
    pub input: PathBuf,

    /// Output file for the classified corpus
    #[arg(short, long, default_value = "classified_stories.json")]
    pub output: PathBuf,

    /// Model passed to `llm -m`; omit to use the `llm` default model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Seconds to wait for each model call
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Seconds between model calls
    #[arg(long)]
    pub delay: Option<f64>,

    /// Assign "Other" everywhere without calling the model
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(args: ClassifyArgs) -> Result<()> {
    let oracle = super::build_oracle(args.model.as_deref(), args.timeout);
    execute(oracle, args).await
}

pub async fn execute(oracle: Arc<dyn Oracle>, args: ClassifyArgs) -> Result<()> {
    let mut config = ClassifyConfig {
        dry_run: args.dry_run,
        ..ClassifyConfig::default()
    };
    if let Some(secs) = args.delay {
        config.delay = Duration::from_secs_f64(secs);
    }

    let mut stories = corpus::load_corpus(&args.input).await?;
    println!("Processing {} stories...", stories.len());
    if let Some(model) = &args.model {
        println!("Using model: {model}");
    }
    if args.dry_run {
        println!("Dry-run mode: no model calls will be made; topics will be set to 'Other'.");
    }

    TopicClassifier::new(oracle, config).run(&mut stories).await;

    corpus::write_json_pretty(&args.output, &stories).await?;
    println!("Wrote {} ({} stories)", args.output.display(), stories.len());
    Ok(())
}
