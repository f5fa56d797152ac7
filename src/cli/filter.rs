//! Filter command handler

use crate::config::Config;
use crate::error::Result;
use clap::{Args, ValueEnum};

/// Filter command arguments
#[derive(Args)]
pub struct FilterArgs {
    /// Whether listings are scoped to the current city
    #[arg(value_enum)]
    pub state: FilterState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterState {
    On,
    Off,
}

/// Run the filter command
pub fn run(args: FilterArgs) -> Result<()> {
    let config = Config::load()?;
    let context = super::load_context(&config);

    context.set_filter_enabled(args.state == FilterState::On)?;

    let snapshot = context.snapshot();
    match snapshot.city_filter() {
        Some(city) => println!("Filtering listings by {}", city),
        None if snapshot.filter_enabled => {
            println!("Filter on; no location resolved yet (run `placefinder resolve`)")
        }
        None => println!("Filter off"),
    }

    context.teardown()
}
