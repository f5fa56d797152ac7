//! Centralized constants for the placefinder crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// External API endpoints
pub mod api {
    /// ViaCEP postal-code database
    pub const VIACEP_URL: &str = "https://viacep.com.br";

    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// Path of the first-party search proxy route
    pub const SEARCH_PROXY_PATH: &str = "/api/location/search";

    /// Client identifier sent to public geocoding services
    pub const USER_AGENT: &str = concat!("placefinder/", env!("CARGO_PKG_VERSION"));

    /// Preferred response language for address components
    pub const ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9,en;q=0.8";
}

/// Place record constants
pub mod place {
    /// Postal code sentinel meaning "region known, exact code unknown"
    pub const REGION_SENTINEL: &str = "Geral";

    /// Number of digits in a complete postal code
    pub const POSTAL_CODE_DIGITS: usize = 8;

    /// State sentinel used when a search result carries no region at all
    pub const COUNTRY_SENTINEL: &str = "BR";
}

/// Text-search settings
pub mod search {
    /// Queries shorter than this never reach the network
    pub const MIN_QUERY_LEN: usize = 3;

    /// Trailing-edge debounce delay in milliseconds
    pub const DEBOUNCE_MS: u64 = 300;

    /// Maximum number of forward-geocoding results requested
    pub const RESULT_LIMIT: usize = 5;
}

/// Durable storage settings
pub mod storage {
    /// Storage namespace (directory under the cache dir)
    pub const NAMESPACE: &str = "placefinder";

    /// Key holding the serialized current place
    pub const LOCATION_KEY: &str = "location.json";

    /// Key holding the filter-enabled flag
    pub const FILTER_ENABLED_KEY: &str = "filter-enabled";
}
