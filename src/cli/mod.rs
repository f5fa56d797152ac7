//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod filter;
pub mod resolve;
pub mod search;
pub mod serve;
pub mod status;

use crate::cache::LocationCache;
use crate::config::Config;
use crate::context::LocationContext;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Location resolution and place search for the classifieds portal
#[derive(Parser)]
#[command(name = "placefinder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the current location and store it
    Resolve(resolve::ResolveArgs),

    /// Search places by postal code or name
    Search(search::SearchArgs),

    /// Show the stored location and filter flag
    Status(status::StatusArgs),

    /// Turn city filtering of listings on or off
    Filter(filter::FilterArgs),

    /// Start the search proxy server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    };
    init_tracing(default_level);

    match cli.command {
        Commands::Resolve(args) => resolve::run(args).await,
        Commands::Search(args) => search::run(args).await,
        Commands::Status(args) => status::run(args).await,
        Commands::Filter(args) => filter::run(args),
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

/// Initialize logging to stderr; `RUST_LOG` overrides the default level
fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// The session context backed by the configured storage, with stored state loaded
fn load_context(config: &Config) -> LocationContext {
    let context = LocationContext::new(LocationCache::new(&config.storage));
    context.load();
    context
}
