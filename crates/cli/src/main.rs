use anyhow::Result;
use clap::Parser;
use newsbeat::Cli;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so piped stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    newsbeat::run(Cli::parse()).await
}
