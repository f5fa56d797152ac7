//! Session-wide location state
//!
//! One `LocationContext` per session holds the current place, the loading and
//! error flags, and the filter toggle. Every surface reads this instance; the
//! place is only written by a resolver run or an explicit user selection.

use crate::cache::LocationCache;
use crate::error::{Error, Result};
use crate::geo::{GeolocationProvider, PostalLookup, ReverseGeocoder};
use crate::place::Place;
use crate::resolver::LocationResolver;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Point-in-time view of the location state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    pub place: Option<Place>,
    pub is_loading: bool,
    pub filter_enabled: bool,
    /// Set when a resolution run failed outright; distinct from "no place yet"
    pub error: Option<String>,
}

impl ContextSnapshot {
    /// City to scope listing queries to, when filtering is on
    pub fn city_filter(&self) -> Option<&str> {
        match (&self.place, self.filter_enabled) {
            (Some(place), true) => Some(place.city.as_str()),
            _ => None,
        }
    }

    /// Placeholder text for search inputs
    pub fn search_placeholder(&self) -> String {
        match &self.place {
            Some(place) => format!("Buscar em {}...", place.city),
            None => "Buscar...".to_string(),
        }
    }
}

/// Shared location state
#[derive(Debug)]
pub struct LocationContext {
    cache: LocationCache,
    state: watch::Sender<ContextSnapshot>,
}

impl LocationContext {
    /// Create an uninitialized context; it reports loading until `init`
    pub fn new(cache: LocationCache) -> Self {
        let (state, _) = watch::channel(ContextSnapshot {
            place: None,
            is_loading: true,
            filter_enabled: false,
            error: None,
        });
        Self { cache, state }
    }

    /// Load the stored state without resolving
    ///
    /// Returns true when no usable place was stored.
    pub fn load(&self) -> bool {
        let place = self.cache.load();
        let filter_enabled = self.cache.load_filter_enabled();
        let missing = place.is_none();

        self.state.send_modify(|s| {
            s.place = place;
            s.filter_enabled = filter_enabled;
            s.is_loading = missing;
            s.error = None;
        });
        missing
    }

    /// Start the session: restore the stored place, or resolve a fresh one
    pub async fn init<G, R, P>(&self, resolver: &Arc<LocationResolver<G, R, P>>) -> ContextSnapshot
    where
        G: GeolocationProvider + 'static,
        R: ReverseGeocoder + 'static,
        P: PostalLookup + 'static,
    {
        if self.load() {
            info!("No stored location, resolving");
            if let Err(e) = resolver.resolve_current_location(self).await {
                warn!("Initial location resolution failed: {}", e);
            }
        } else {
            debug!("Restored stored location");
        }
        self.snapshot()
    }

    /// End the session, flushing the final state to storage
    pub fn teardown(self) -> Result<()> {
        self.flush()
    }

    /// Write the current state to storage
    pub fn flush(&self) -> Result<()> {
        let snapshot = self.snapshot();
        match &snapshot.place {
            Some(place) => self.cache.save(place, snapshot.filter_enabled),
            None => self.cache.save_filter_enabled(snapshot.filter_enabled),
        }
    }

    /// Current state
    pub fn snapshot(&self) -> ContextSnapshot {
        self.state.borrow().clone()
    }

    /// Watch for state changes
    pub fn subscribe(&self) -> watch::Receiver<ContextSnapshot> {
        self.state.subscribe()
    }

    pub fn place(&self) -> Option<Place> {
        self.state.borrow().place.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn filter_enabled(&self) -> bool {
        self.state.borrow().filter_enabled
    }

    /// Replace the current place
    ///
    /// The place is persisted first; if that fails nothing changes.
    pub fn set_place(&self, place: Place) -> Result<()> {
        if !place.is_valid() {
            return Err(Error::MalformedInput(format!(
                "Refusing incomplete place {:?}",
                place
            )));
        }

        self.cache.save(&place, self.filter_enabled())?;
        info!("Location set to {}", place);
        self.state.send_modify(|s| {
            s.place = Some(place);
            s.is_loading = false;
            s.error = None;
        });
        Ok(())
    }

    /// Toggle listing filtering; never triggers a resolution
    ///
    /// Persisted first, like `set_place`.
    pub fn set_filter_enabled(&self, enabled: bool) -> Result<()> {
        self.cache.save_filter_enabled(enabled)?;
        self.state.send_modify(|s| s.filter_enabled = enabled);
        Ok(())
    }

    /// Drop the stored place and show the loading state
    pub(crate) fn begin_resolution(&self) -> Result<()> {
        self.cache.clear()?;
        self.state.send_modify(|s| {
            s.place = None;
            s.is_loading = true;
            s.error = None;
        });
        Ok(())
    }

    /// Record a failed resolution so the UI can offer a retry
    pub(crate) fn fail_resolution(&self, err: &Error) {
        self.state.send_modify(|s| {
            s.is_loading = false;
            s.error = Some(err.to_string());
        });
    }
}
