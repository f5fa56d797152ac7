//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7879;

/// Default outbound HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 6;

/// Default country filter for forward geocoding
pub const DEFAULT_COUNTRY_CODES: &str = "br";

/// Fallback city when no location can be resolved
pub const DEFAULT_FALLBACK_CITY: &str = "Guaíra";

/// Fallback state code
pub const DEFAULT_FALLBACK_STATE: &str = "SP";

/// Fallback postal code
pub const DEFAULT_FALLBACK_POSTAL_CODE: &str = "14790-000";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "placefinder";
