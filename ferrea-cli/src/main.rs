//! Ferrea CLI - Command-line ISBN lookups against the configured providers

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ferrea_core::{ProviderKind, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ferrea")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up book metadata by ISBN
    Lookup {
        /// ISBN to look up
        isbn: String,

        /// Query only this provider (googlebooks, openlibrary)
        #[arg(short, long)]
        provider: Option<ProviderKind>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that every configured provider is reachable
    Health {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for results
    let filter = if cli.verbose {
        "ferrea_cli=debug,ferrea_core=debug"
    } else {
        "ferrea_cli=info,ferrea_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Lookup {
            isbn,
            provider,
            json,
        } => commands::lookup(&settings, &isbn, provider, json).await,

        Commands::Health { json } => commands::health(&settings, json).await,
    }
}
