//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "fallback.city")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            show_all_config(&config);
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    println!();

    let p = &config.providers;
    println!("[providers]");
    println!("postal_url = \"{}\"", p.postal_url);
    println!("geocoder_url = \"{}\"", p.geocoder_url);
    println!("search_proxy_url = \"{}\"", p.search_proxy_url);
    println!("ip_location_url = \"{}\"", p.ip_location_url);
    println!("user_agent = \"{}\"", p.user_agent);
    println!("accept_language = \"{}\"", p.accept_language);
    println!("country_codes = \"{}\"", p.country_codes);
    println!("search_limit = {}", p.search_limit);
    println!("timeout_secs = {}", p.timeout_secs);
    println!();

    println!("[search]");
    println!("debounce_ms = {}", config.search.debounce_ms);
    println!("min_query_len = {}", config.search.min_query_len);
    println!();

    println!("[fallback]");
    println!("city = \"{}\"", config.fallback.city);
    println!("state = \"{}\"", config.fallback.state);
    println!("postal_code = \"{}\"", config.fallback.postal_code);
    println!();

    println!("[storage]");
    println!("namespace = \"{}\"", config.storage.namespace);
    match &config.storage.dir {
        Some(dir) => println!("dir = \"{}\"", dir.display()),
        None => println!("dir = \"\" # default cache directory"),
    }
}
