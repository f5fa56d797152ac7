//! Place search through the first-party proxy
//!
//! Browser-facing surfaces never call the geocoder directly; they ask our own
//! `/api/location/search` route, which relays the provider's raw results.

use crate::config::ProvidersConfig;
use crate::constants::api::SEARCH_PROXY_PATH;
use crate::error::{Error, Result};
use crate::geo::nominatim::{candidates_from_results, NominatimPlace};
use crate::geo::{http_client, PlaceSearch};
use crate::place::Place;
use tracing::warn;

/// Place search backed by the search proxy
#[derive(Debug, Clone)]
pub struct ProxyPlaceSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl ProxyPlaceSearch {
    /// Create a proxy search client from provider settings
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(&config.user_agent, config.timeout())?,
            endpoint: format!(
                "{}{}",
                config.search_proxy_url.trim_end_matches('/'),
                SEARCH_PROXY_PATH
            ),
        })
    }

    async fn fetch(&self, query: &str) -> Result<Vec<NominatimPlace>> {
        let url = format!("{}?q={}", self.endpoint, urlencoding::encode(query));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::network("Search proxy request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Search proxy returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse search proxy response: {}", e)))
    }
}

impl PlaceSearch for ProxyPlaceSearch {
    async fn search(&self, query: &str) -> Vec<Place> {
        match self.fetch(query).await {
            Ok(results) => candidates_from_results(&results),
            Err(e) => {
                warn!("Place search for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }
}
