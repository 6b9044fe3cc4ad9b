//! Vitrine CLI — the main entry point.
//!
//! Commands:
//! - `serve` — Start the assistant gateway HTTP server
//! - `ask`   — Send a single question through the full engine
//! - `check` — Diagnose configuration and knowledge base health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "vitrine",
    about = "Vitrine — conversational assistant gateway",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway HTTP server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question against the configured backend
    Ask {
        /// The question to ask
        message: String,

        /// Reuse an existing session id instead of generating one
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Diagnose configuration and knowledge base health
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask { message, session } => commands::ask::run(message, session).await?,
        Commands::Check => commands::check::run().await?,
    }

    Ok(())
}
