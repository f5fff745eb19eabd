//! Baladi CLI - catalog management tools.
//!
//! # Usage
//!
//! ```bash
//! # Load categories, products and offers from a YAML file
//! baladi-cli seed catalog seed/catalog.yaml
//!
//! # Check a seed file without touching the backend
//! baladi-cli seed catalog seed/catalog.yaml --dry-run
//!
//! # Show catalog counts
//! baladi-cli stats
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Backend project URL
//! - `SUPABASE_ANON_KEY` - Backend API key

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "baladi-cli")]
#[command(author, version, about = "Baladi storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the backend with catalog data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Show catalog statistics
    Stats,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert categories, products and offers from a YAML file
    Catalog {
        /// Path to the YAML seed file
        file: String,

        /// Validate the file and stop before any backend call
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, dry_run } => {
                commands::seed::catalog(&file, dry_run).await?;
            }
        },
        Commands::Stats => commands::stats::catalog().await?,
    }
    Ok(())
}
