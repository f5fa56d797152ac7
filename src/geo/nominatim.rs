//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for reverse geocoding and forward search.
//! Usage policy: 1 request per second and an identifying User-Agent on every
//! request; the client is built with one and refuses to run without it.

use crate::config::ProvidersConfig;
use crate::error::{Error, Result};
use crate::geo::{AddressParts, PlaceSearch, ReverseGeocoder};
use crate::place::{abbreviate_state, candidate_state, dedup_by_area, Place};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
    country_codes: String,
    limit: usize,
}

/// One Nominatim result (search item or reverse response)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NominatimPlace {
    #[serde(default)]
    pub address: NominatimAddress,
    #[serde(default)]
    pub display_name: String,
}

/// Address components Nominatim may attach with `addressdetails=1`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NominatimAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(
        rename = "ISO3166-2-lvl4",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub iso3166_2_lvl4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl NominatimAddress {
    /// Municipality name by priority: city, town, village, municipality
    pub fn city_name(&self) -> Option<&str> {
        present(&self.city)
            .or_else(|| present(&self.town))
            .or_else(|| present(&self.village))
            .or_else(|| present(&self.municipality))
    }

    /// Region code if the address carries any region information
    pub fn region_code(&self) -> Option<String> {
        abbreviate_state(
            present(&self.state_code),
            present(&self.iso3166_2_lvl4),
            present(&self.state),
        )
    }
}

impl NominatimPlace {
    /// Map a search result to a candidate place
    ///
    /// Returns None when no municipality name can be found at all.
    pub fn to_candidate(&self) -> Option<Place> {
        let address = &self.address;
        let city = address
            .city_name()
            .map(str::to_string)
            .or_else(|| {
                self.display_name
                    .split(',')
                    .next()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })?;

        let state = candidate_state(
            present(&address.state_code),
            present(&address.iso3166_2_lvl4),
            present(&address.state),
        );

        Some(Place::new(
            city,
            state,
            present(&address.postcode),
            address.suburb.clone(),
        ))
    }

    /// Address components for a reverse-geocoded point
    pub fn to_address_parts(&self) -> AddressParts {
        let address = &self.address;
        AddressParts {
            city: address.city_name().map(str::to_string),
            state: address.region_code(),
            postal_code: present(&address.postcode).map(str::to_string),
            neighborhood: present(&address.suburb).map(str::to_string),
        }
    }
}

/// Map raw search results to deduplicated candidates
pub fn candidates_from_results(results: &[NominatimPlace]) -> Vec<Place> {
    dedup_by_area(results.iter().filter_map(NominatimPlace::to_candidate).collect())
}

impl NominatimClient {
    /// Create a new Nominatim client from provider settings
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            return Err(Error::Config(
                "Nominatim requires an identifying user agent".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        if let Ok(lang) = HeaderValue::from_str(&config.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, lang);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.geocoder_url.trim_end_matches('/').to_string(),
            country_codes: config.country_codes.clone(),
            limit: config.search_limit,
        })
    }

    /// Reverse geocode with address details
    async fn fetch_reverse(&self, lat: f64, lon: f64) -> Result<NominatimPlace> {
        let url = format!(
            "{}/reverse?format=json&lat={}&lon={}&addressdetails=1",
            self.base_url, lat, lon
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::network("Nominatim request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse Nominatim response: {}", e)))
    }

    /// Forward search, returning the provider's array untouched
    ///
    /// This is what the first-party proxy relays to its callers.
    pub async fn search_raw(&self, query: &str) -> Result<serde_json::Value> {
        let url = format!(
            "{}/search?format=json&q={}&addressdetails=1&countrycodes={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.country_codes),
            self.limit
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::network("Nominatim request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse Nominatim response: {}", e)))?;

        if !body.is_array() {
            return Err(Error::Geo("Nominatim search did not return an array".to_string()));
        }

        debug!(
            "Nominatim search for {:?} returned {} results",
            query,
            body.as_array().map_or(0, Vec::len)
        );
        Ok(body)
    }
}

impl ReverseGeocoder for NominatimClient {
    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Option<String> {
        match self.fetch_reverse(lat, lon).await {
            Ok(result) => present(&result.address.postcode).map(str::to_string),
            Err(e) => {
                warn!("Reverse geocode for ({}, {}) failed: {}", lat, lon, e);
                None
            }
        }
    }

    async fn reverse_geocode_full(&self, lat: f64, lon: f64) -> Option<AddressParts> {
        match self.fetch_reverse(lat, lon).await {
            Ok(result) => Some(result.to_address_parts()),
            Err(e) => {
                warn!("Reverse geocode for ({}, {}) failed: {}", lat, lon, e);
                None
            }
        }
    }
}

impl PlaceSearch for NominatimClient {
    async fn search(&self, query: &str) -> Vec<Place> {
        let raw = match self.search_raw(query).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Place search for {:?} failed: {}", query, e);
                return Vec::new();
            }
        };

        match serde_json::from_value::<Vec<NominatimPlace>>(raw) {
            Ok(results) => candidates_from_results(&results),
            Err(e) => {
                warn!("Unexpected search result shape for {:?}: {}", query, e);
                Vec::new()
            }
        }
    }
}
