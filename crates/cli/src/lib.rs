//! Command-line front end for the newsbeat pipeline. Each subcommand
//! wires files and flags onto one pipeline stage; the stages themselves
//! live in the library crates.

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "newsbeat",
    version,
    about = "Turn a local-news story archive into entity reports and beat books"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Annotate each story with entities, themes, and a quote-preserving summary
    Annotate(commands::annotate::AnnotateArgs),
    /// Assign every story one topic from a fixed list
    Classify(commands::classify::ClassifyArgs),
    /// Extract entities in batches and render the prominence report
    Entities(commands::entities::EntitiesArgs),
    /// Synthesize a narrative coverage guide for the beat
    Guide(commands::guide::GuideArgs),
    /// Render the chronological beat book from stored metadata
    Chronicle(commands::chronicle::ChronicleArgs),
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Annotate(args) => commands::annotate::run(args).await,
        Command::Classify(args) => commands::classify::run(args).await,
        Command::Entities(args) => commands::entities::run(args).await,
        Command::Guide(args) => commands::guide::run(args).await,
        Command::Chronicle(args) => commands::chronicle::run(args).await,
    }
}
