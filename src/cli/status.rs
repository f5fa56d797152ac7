//! Status command handler
//!
//! Shows the stored location, the filter flag, and optionally the server.

use crate::cache::LocationCache;
use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Check if the search proxy server is running (tries to connect)
    #[arg(long)]
    pub server: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let config = Config::load()?;
    let cache = LocationCache::new(&config.storage);

    println!("placefinder v{}", env!("CARGO_PKG_VERSION"));
    println!();

    match cache.load_entry() {
        Some(entry) => {
            println!("Location: {}", entry.place.label());
            println!("  {}", entry.place.postal_label());
            if let Some(neighborhood) = &entry.place.neighborhood {
                println!("  Bairro: {}", neighborhood);
            }
            println!("  Saved: {}", entry.saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        None => println!("Location: not resolved"),
    }
    println!(
        "Filter: {}",
        if cache.load_filter_enabled() { "on" } else { "off" }
    );

    if args.server {
        println!();
        check_server_status(&config).await;
    }

    Ok(())
}

/// Check if the server is running
async fn check_server_status(config: &Config) {
    let url = format!("http://{}/api/health", config.server_addr());

    match reqwest::get(&url).await {
        Ok(response) => {
            if response.status().is_success() {
                println!("Server: RUNNING on {}", config.server_addr());
                if let Ok(status) = response.json::<serde_json::Value>().await {
                    if let Some(version) = status.get("version").and_then(|v| v.as_str()) {
                        println!("  Version: {}", version);
                    }
                }
            } else {
                println!("Server: ERROR (status {})", response.status());
            }
        }
        Err(_) => {
            println!("Server: NOT RUNNING on {}", config.server_addr());
        }
    }
}
