//! Current-location resolution
//!
//! Turns best-effort signals into exactly one place, in tiers:
//!
//! 1. position → reverse geocode → postal code → postal lookup
//! 2. position → reverse geocode (full address), gaps filled from the fallback
//! 3. no position → postal lookup of the fallback postal code
//! 4. the fallback place itself
//!
//! Each tier's failure is logged and falls through to the next one.

use crate::context::LocationContext;
use crate::error::{Error, Result};
use crate::geo::{Coordinates, GeolocationProvider, PostalLookup, ReverseGeocoder};
use crate::place::Place;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Location resolver
#[derive(Debug)]
pub struct LocationResolver<G, R, P> {
    geolocation: G,
    reverse: R,
    postal: P,
    fallback: Place,
}

impl<G, R, P> LocationResolver<G, R, P>
where
    G: GeolocationProvider,
    R: ReverseGeocoder,
    P: PostalLookup,
{
    pub fn new(geolocation: G, reverse: R, postal: P, fallback: Place) -> Self {
        Self {
            geolocation,
            reverse,
            postal,
            fallback,
        }
    }

    /// The place used when nothing else works
    pub fn fallback(&self) -> &Place {
        &self.fallback
    }

    /// Resolve a place; always produces one
    pub async fn resolve(&self) -> Place {
        let place = if !self.geolocation.is_available() {
            info!("No geolocation source, using fallback postal code");
            self.from_fallback_postal_code().await
        } else {
            match self.geolocation.current_position().await {
                Ok(coords) => self.from_coordinates(coords).await,
                Err(e) => {
                    info!("Geolocation failed ({}), using fallback postal code", e);
                    self.from_fallback_postal_code().await
                }
            }
        };

        if place.is_valid() {
            place
        } else {
            warn!("Resolved place {:?} is incomplete, using fallback", place);
            self.fallback.clone()
        }
    }

    async fn from_coordinates(&self, coords: Coordinates) -> Place {
        debug!("Resolving position ({}, {})", coords.lat, coords.lon);

        if let Some(postal_code) = self.reverse.reverse_geocode(coords.lat, coords.lon).await {
            if let Some(place) = self.postal.lookup(&postal_code).await {
                return place;
            }
            debug!("Postal lookup for {} gave nothing, using address", postal_code);
        } else {
            debug!("No postal code at position, using address");
        }

        match self.reverse.reverse_geocode_full(coords.lat, coords.lon).await {
            Some(parts) => parts.into_place(&self.fallback),
            None => self.fallback.clone(),
        }
    }

    async fn from_fallback_postal_code(&self) -> Place {
        match self.postal.lookup(&self.fallback.postal_code).await {
            Some(place) => place,
            None => self.fallback.clone(),
        }
    }
}

impl<G, R, P> LocationResolver<G, R, P>
where
    G: GeolocationProvider + 'static,
    R: ReverseGeocoder + 'static,
    P: PostalLookup + 'static,
{
    /// Resolve and publish a fresh place into the context
    ///
    /// The stored place is dropped first so nobody reads a stale one while the
    /// run is in flight. Only a broken store or a crashed run fails; either
    /// leaves the context with its error flag set.
    pub async fn resolve_current_location(
        self: &Arc<Self>,
        context: &LocationContext,
    ) -> Result<Place> {
        let outcome = self.run(context).await;
        if let Err(e) = &outcome {
            warn!("Location resolution failed: {}", e);
            context.fail_resolution(e);
        }
        outcome
    }

    async fn run(self: &Arc<Self>, context: &LocationContext) -> Result<Place> {
        context.begin_resolution()?;

        let resolver = Arc::clone(self);
        let place = tokio::spawn(async move { resolver.resolve().await })
            .await
            .map_err(|e| Error::Resolution(format!("resolution task ended abnormally: {}", e)))?;

        context.set_place(place.clone())?;
        Ok(place)
    }
}
