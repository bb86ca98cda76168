//! Offline chronological beat book. The one stage that never touches
//! the model: everything comes from stored story metadata.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use report::{DEFAULT_TOP_N, render_chronicle};

#[derive(Args, Debug)]
pub struct ChronicleArgs {
    /// Corpus JSON file to chronicle
    pub input: PathBuf,

    /// Output file; defaults to beatbook_chronological.md beside the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Entries per trend list
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,
}

pub async fn run(args: ChronicleArgs) -> Result<()> {
    let stories = corpus::load_corpus(&args.input).await?;
    println!("Loaded {} stories", stories.len());

    let markdown = render_chronicle(&stories, args.top_n);
    let output = args
        .output
        .unwrap_or_else(|| args.input.with_file_name("beatbook_chronological.md"));
    tokio::fs::write(&output, &markdown)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Beat book saved to {}", output.display());
    Ok(())
}
