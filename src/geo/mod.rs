//! Geocoding module
//!
//! Provider traits for the location subsystem and their HTTP adapters:
//! postal-code lookup (ViaCEP), reverse geocoding and forward search
//! (Nominatim, directly or through the first-party proxy), and the
//! geolocation sources that answer "where is this user".

pub mod ip_location;
pub mod nominatim;
pub mod proxy;
pub mod viacep;

use crate::error::{Error, Result};
use crate::place::{Place, PostalCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// A point on the globe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Reject out-of-range coordinates
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::MalformedInput(format!(
                "Latitude {} out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(Error::MalformedInput(format!(
                "Longitude {} out of range [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }
}

/// Address components from a reverse geocode; any of them may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub neighborhood: Option<String>,
}

impl AddressParts {
    /// Build a place, taking every missing required field from `fallback`
    pub fn into_place(self, fallback: &Place) -> Place {
        let postal_code = self
            .postal_code
            .as_deref()
            .and_then(PostalCode::parse)
            .map(|code| code.to_string())
            .unwrap_or_else(|| fallback.postal_code.clone());

        Place {
            city: self.city.unwrap_or_else(|| fallback.city.clone()),
            state: self.state.unwrap_or_else(|| fallback.state.clone()),
            postal_code,
            neighborhood: self.neighborhood,
        }
    }
}

/// Source of the user's current position (single shot, not a watch)
pub trait GeolocationProvider: Send + Sync {
    /// Whether a position source exists at all
    fn is_available(&self) -> bool {
        true
    }

    /// Request the current coordinates
    ///
    /// Fails with `PermissionDenied` when refused, or any other error when the
    /// position can't be determined.
    fn current_position(&self) -> impl Future<Output = Result<Coordinates>> + Send;
}

/// Coordinates to address
pub trait ReverseGeocoder: Send + Sync {
    /// Postal code at the coordinates, as the provider reports it
    fn reverse_geocode(&self, lat: f64, lon: f64) -> impl Future<Output = Option<String>> + Send;

    /// Whatever address components the provider knows for the coordinates
    fn reverse_geocode_full(
        &self,
        lat: f64,
        lon: f64,
    ) -> impl Future<Output = Option<AddressParts>> + Send;
}

/// Postal code to place
pub trait PostalLookup: Send + Sync {
    /// Resolve a postal code; None covers malformed, unregistered and failed
    fn lookup(&self, postal_code: &str) -> impl Future<Output = Option<Place>> + Send;
}

/// Free text to candidate places
pub trait PlaceSearch: Send + Sync {
    /// Deduplicated candidates in provider order; empty on any failure
    fn search(&self, query: &str) -> impl Future<Output = Vec<Place>> + Send;
}

/// Explicit coordinates, e.g. from the command line
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

impl GeolocationProvider for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates> {
        self.0.validate()?;
        Ok(self.0)
    }
}

/// No position source on this host
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

impl GeolocationProvider for NoGeolocation {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Coordinates> {
        Err(Error::PermissionDenied("No geolocation source available".to_string()))
    }
}

/// Build an HTTP client carrying the client identifier and a request timeout
pub(crate) fn http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
}
