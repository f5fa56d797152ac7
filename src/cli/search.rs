//! Search command handler
//!
//! Drives a search field from the terminal: one query, a numbered candidate
//! list, and an optional selection into the session location or a form.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::nominatim::NominatimClient;
use crate::geo::proxy::ProxyPlaceSearch;
use crate::geo::viacep::ViaCepClient;
use crate::geo::PlaceSearch;
use crate::place::Place;
use crate::search::{FormLocation, SearchController, SearchOptions, SearchState, SelectionTarget};
use clap::Args;
use std::sync::Arc;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Postal code or place name
    pub query: String,

    /// Select the Nth candidate (1-based)
    #[arg(long, short = 's')]
    pub select: Option<usize>,

    /// Fill a listing form instead of moving the session location
    #[arg(long)]
    pub form: bool,

    /// Query the geocoder directly instead of the search proxy
    #[arg(long)]
    pub direct: bool,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;

    if args.query.trim().chars().count() < config.search.min_query_len {
        return Err(Error::MalformedInput(format!(
            "Query must have at least {} characters",
            config.search.min_query_len
        )));
    }

    if args.direct {
        with_source(NominatimClient::new(&config.providers)?, &config, &args).await
    } else {
        with_source(ProxyPlaceSearch::new(&config.providers)?, &config, &args).await
    }
}

async fn with_source<S>(search: S, config: &Config, args: &SearchArgs) -> Result<()>
where
    S: PlaceSearch + 'static,
{
    let context = Arc::new(super::load_context(config));
    let postal = ViaCepClient::new(&config.providers)?;
    let options = SearchOptions::from_config(&config.search).with_auto_select(true);

    if args.form {
        let form = FormLocation::from_place(context.place().as_ref());
        let controller = SearchController::new(postal, search, form, options);
        drive(&controller, args).await?;
        println!("{}", serde_json::to_string_pretty(&controller.target().fields())?);
    } else {
        let controller = SearchController::new(postal, search, Arc::clone(&context), options);
        drive(&controller, args).await?;
    }

    context.flush()
}

/// Type the query, wait for the debounced lookup, then list or select
async fn drive<P, S, T>(controller: &SearchController<P, S, T>, args: &SearchArgs) -> Result<()>
where
    P: crate::geo::PostalLookup + 'static,
    S: PlaceSearch + 'static,
    T: SelectionTarget + 'static,
{
    let mut rx = controller.subscribe();
    controller.on_query_change(args.query.trim());

    // Only terminal states end the wait; intermediate ones may be coalesced
    let candidates: Vec<Place> = loop {
        if rx.changed().await.is_err() {
            break Vec::new();
        }
        match rx.borrow_and_update().clone() {
            SearchState::Results { candidates, .. } => break candidates,
            SearchState::Empty { query } => {
                println!("No places found for {:?}", query);
                return Ok(());
            }
            SearchState::Selected { place, .. } => {
                println!("Selected {}", place.label());
                return Ok(());
            }
            SearchState::Searching { .. } | SearchState::Idle => {}
        }
    };

    match args.select {
        Some(n) => {
            let place = n
                .checked_sub(1)
                .and_then(|i| candidates.get(i))
                .cloned()
                .ok_or_else(|| {
                    Error::MalformedInput(format!(
                        "No candidate {} (found {})",
                        n,
                        candidates.len()
                    ))
                })?;
            println!("Selected {}", place.label());
            controller.select(place)
        }
        None => {
            for (i, place) in candidates.iter().enumerate() {
                println!("{:>2}. {:<40} {}", i + 1, place.label(), place.postal_label());
            }
            Ok(())
        }
    }
}
