//! onchmint command line entry point.

mod app;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "onchmint")]
#[command(about = "Chunked onchfs upload and token mint tooling")]
#[command(version)]
struct Cli {
    /// Config file path (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show chunks, CID and storage cost of a file without touching the ledger
    Inspect {
        file: PathBuf,

        /// Media type (detected from the extension if omitted)
        #[arg(long)]
        media_type: Option<String>,
    },
    /// Run the full upload and mint pipeline against an in-memory ledger
    Simulate {
        file: PathBuf,

        /// Token configuration (TOML)
        #[arg(long)]
        mint: PathBuf,

        #[arg(long)]
        media_type: Option<String>,

        /// Signing account to simulate
        #[arg(long, default_value = app::SIMULATED_ACCOUNT)]
        creator: String,

        /// Token contract (overrides config)
        #[arg(long)]
        collection: Option<String>,

        /// Comma-separated tags (replace those in the mint config)
        #[arg(long)]
        tags: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::Config::load(cli.config.as_deref())?;
    tracing::debug!(content_store = %config.content_store_address, "configuration loaded");

    let rt = tokio::runtime::Runtime::new()?;
    match cli.command {
        Commands::Inspect { file, media_type } => {
            rt.block_on(app::inspect(&config, &file, media_type.as_deref()))
        }
        Commands::Simulate {
            file,
            mint,
            media_type,
            creator,
            collection,
            tags,
        } => rt.block_on(app::simulate(
            &config,
            app::SimulateArgs {
                file,
                mint,
                media_type,
                creator,
                collection,
                tags,
            },
        )),
    }
}
