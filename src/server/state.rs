//! Server shared state
//!
//! Holds configuration and the upstream geocoder the proxy relays to.

use crate::config::Config;
use crate::error::Result;
use crate::geo::nominatim::NominatimClient;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// Forward-geocoding upstream
    pub geocoder: NominatimClient,
}

impl AppState {
    /// Create new application state
    ///
    /// Fails when the provider settings cannot produce a compliant client
    /// (for instance, an empty user agent).
    pub fn new(config: Config) -> Result<Self> {
        let geocoder = NominatimClient::new(&config.providers)?;
        Ok(Self { config, geocoder })
    }
}
