//! IP-based geolocation
//!
//! Uses ip-api.com to approximate the user's position on hosts that have no
//! position sensor. Single shot: every call asks the service again.

use crate::config::ProvidersConfig;
use crate::error::{Error, Result};
use crate::geo::{http_client, Coordinates, GeolocationProvider};
use serde::Deserialize;
use tracing::debug;

/// IP location service
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: reqwest::Client,
    url: String,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
}

impl IpLocator {
    /// Create an IP locator from provider settings
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(&config.user_agent, config.timeout())?,
            url: config.ip_location_url.clone(),
        })
    }

    /// Fetch location from ip-api.com
    async fn fetch_location(&self) -> Result<Coordinates> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network("IP location request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse IP location response: {}", e)))?;

        if data.status != "success" {
            return Err(Error::Geo(format!(
                "IP location lookup failed: {}",
                data.message.unwrap_or_else(|| data.status.clone())
            )));
        }

        let lat = data.lat.ok_or_else(|| Error::Geo("No latitude in response".to_string()))?;
        let lon = data.lon.ok_or_else(|| Error::Geo("No longitude in response".to_string()))?;

        debug!(
            "IP location resolved near {}",
            data.city.as_deref().unwrap_or("unknown city")
        );

        let coords = Coordinates::new(lat, lon);
        coords.validate()?;
        Ok(coords)
    }
}

impl GeolocationProvider for IpLocator {
    async fn current_position(&self) -> Result<Coordinates> {
        self.fetch_location().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn locator(server: &MockServer) -> IpLocator {
        let config = ProvidersConfig {
            ip_location_url: format!("{}/json", server.uri()),
            ..ProvidersConfig::default()
        };
        IpLocator::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_locate_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "lat": -20.3186,
                "lon": -48.3109,
                "city": "Guaíra",
                "regionName": "São Paulo",
                "country": "Brazil"
            })))
            .mount(&server)
            .await;

        let coords = locator(&server).current_position().await.unwrap();
        assert_eq!(coords, Coordinates::new(-20.3186, -48.3109));
    }

    #[tokio::test]
    async fn test_locate_fail_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail",
                "message": "private range"
            })))
            .mount(&server)
            .await;

        let err = locator(&server).current_position().await.unwrap_err();
        assert!(err.to_string().contains("private range"));
    }

    #[tokio::test]
    async fn test_locate_missing_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success"
            })))
            .mount(&server)
            .await;

        assert!(locator(&server).current_position().await.is_err());
    }
}
