//! Resolve command handler
//!
//! Runs the resolver once and stores the result as the session location.

use crate::config::Config;
use crate::context::LocationContext;
use crate::error::Result;
use crate::geo::ip_location::IpLocator;
use crate::geo::nominatim::NominatimClient;
use crate::geo::viacep::ViaCepClient;
use crate::geo::{Coordinates, FixedPosition, GeolocationProvider, NoGeolocation};
use crate::place::Place;
use crate::resolver::LocationResolver;
use clap::Args;
use std::sync::Arc;

/// Resolve command arguments
#[derive(Args)]
pub struct ResolveArgs {
    /// Latitude of the current position
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of the current position
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Approximate the position from this host's public IP
    #[arg(long, conflicts_with_all = ["lat", "lon", "no_geolocation"])]
    pub ip: bool,

    /// Skip positioning and use the configured fallback area
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub no_geolocation: bool,

    /// Print the resulting state as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the resolve command
pub async fn run(args: ResolveArgs) -> Result<()> {
    let config = Config::load()?;
    let context = super::load_context(&config);

    let place = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => {
            let coords = Coordinates::new(lat, lon);
            coords.validate()?;
            resolve_with(FixedPosition(coords), &config, &context).await?
        }
        _ if args.ip => resolve_with(IpLocator::new(&config.providers)?, &config, &context).await?,
        _ => resolve_with(NoGeolocation, &config, &context).await?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&context.snapshot())?);
    } else {
        println!("{}", place.label());
        println!("{}", place.postal_label());
        if let Some(neighborhood) = &place.neighborhood {
            println!("Bairro: {}", neighborhood);
        }
    }

    context.teardown()
}

async fn resolve_with<G>(geolocation: G, config: &Config, context: &LocationContext) -> Result<Place>
where
    G: GeolocationProvider + 'static,
{
    let resolver = Arc::new(LocationResolver::new(
        geolocation,
        NominatimClient::new(&config.providers)?,
        ViaCepClient::new(&config.providers)?,
        config.fallback.place(),
    ));
    resolver.resolve_current_location(context).await
}
