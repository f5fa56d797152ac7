//! placefinder CLI entry point
//!
//! Location resolution and place search - CLI + search proxy

use placefinder::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
