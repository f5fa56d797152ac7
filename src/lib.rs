//! placefinder: location resolution and place search
//!
//! A library and CLI tool that works out where a classifieds-portal user is
//! and lets them search for a different place.
//!
//! ## Features
//!
//! - Tiered location resolution (position, postal code, address, fallback)
//! - Postal-code lookup (ViaCEP) and geocoding (Nominatim)
//! - Debounced search that routes postal codes and names to different sources
//! - Durable session location with a city-filter toggle
//! - HTTP search proxy + CLI interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use placefinder::config::Config;
//! use placefinder::geo::nominatim::NominatimClient;
//! use placefinder::geo::viacep::ViaCepClient;
//! use placefinder::geo::NoGeolocation;
//! use placefinder::{LocationCache, LocationContext, LocationResolver};
//! use std::sync::Arc;
//!
//! # async fn demo() -> placefinder::Result<()> {
//! let config = Config::default();
//! let resolver = Arc::new(LocationResolver::new(
//!     NoGeolocation,
//!     NominatimClient::new(&config.providers)?,
//!     ViaCepClient::new(&config.providers)?,
//!     config.fallback.place(),
//! ));
//!
//! let context = LocationContext::new(LocationCache::new(&config.storage));
//! let snapshot = context.init(&resolver).await;
//! println!("{}", snapshot.search_placeholder());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod geo;
pub mod place;
pub mod resolver;
pub mod search;
pub mod server;

// Re-export commonly used types
pub use cache::LocationCache;
pub use config::Config;
pub use context::{ContextSnapshot, LocationContext};
pub use error::{Error, Result};
pub use place::{Place, PostalCode};
pub use resolver::LocationResolver;
pub use search::{SearchController, SearchOptions, SearchState};
