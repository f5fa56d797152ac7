//! ViaCEP postal-code lookup
//!
//! Resolves Brazilian postal codes (CEP) to municipality, state and district.
//! Unregistered codes come back as HTTP 200 with an `erro` flag.

use crate::config::ProvidersConfig;
use crate::constants::api::USER_AGENT;
use crate::error::{Error, Result};
use crate::geo::{http_client, PostalLookup};
use crate::place::{Place, PostalCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// ViaCEP client
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    client: reqwest::Client,
    base_url: String,
}

/// ViaCEP response body
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    uf: Option<String>,
    #[serde(default)]
    bairro: Option<String>,
    /// `true` (or `"true"`) when the code isn't registered
    #[serde(default)]
    erro: Option<serde_json::Value>,
}

impl ViaCepResponse {
    fn is_error(&self) -> bool {
        match &self.erro {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(s)) => s != "false",
            Some(_) => true,
        }
    }
}

impl ViaCepClient {
    /// Create a client from provider settings
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(&config.user_agent, config.timeout())?,
            base_url: config.postal_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client against a specific base URL
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(USER_AGENT, timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch and map one postal code
    async fn fetch(&self, code: PostalCode) -> Result<Place> {
        let url = format!("{}/ws/{}/json/", self.base_url, code.digits());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::network("ViaCEP request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "ViaCEP returned status: {}",
                response.status()
            )));
        }

        let data: ViaCepResponse = response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse ViaCEP response: {}", e)))?;

        if data.is_error() {
            return Err(Error::NotFound(format!("Postal code {} is not registered", code)));
        }

        let city = data.localidade.filter(|c| !c.trim().is_empty());
        let state = data.uf.filter(|s| !s.trim().is_empty());
        match (city, state) {
            (Some(city), Some(state)) => Ok(Place {
                city,
                state: state.to_uppercase(),
                postal_code: code.to_string(),
                neighborhood: data.bairro.filter(|b| !b.trim().is_empty()),
            }),
            _ => Err(Error::NotFound(format!(
                "Postal code {} has no municipality",
                code
            ))),
        }
    }
}

impl PostalLookup for ViaCepClient {
    async fn lookup(&self, postal_code: &str) -> Option<Place> {
        let Some(code) = PostalCode::parse(postal_code) else {
            debug!("Skipping postal lookup for malformed code {:?}", postal_code);
            return None;
        };

        match self.fetch(code).await {
            Ok(place) => Some(place),
            Err(e) => {
                warn!("Postal lookup for {} failed: {}", code, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ViaCepClient {
        ViaCepClient::with_base_url(&server.uri(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_maps_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ws/14790000/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cep": "14790-000",
                "logradouro": "",
                "complemento": "",
                "bairro": "",
                "localidade": "Guaíra",
                "uf": "SP",
                "ibge": "3517406",
                "ddd": "17"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let place = client(&server).lookup("14790-000").await.unwrap();
        assert_eq!(place.city, "Guaíra");
        assert_eq!(place.state, "SP");
        assert_eq!(place.postal_code, "14790-000");
        assert!(place.neighborhood.is_none());
    }

    #[tokio::test]
    async fn test_lookup_with_district() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ws/14015000/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cep": "14015-000",
                "bairro": "Centro",
                "localidade": "Ribeirão Preto",
                "uf": "SP"
            })))
            .mount(&server)
            .await;

        let place = client(&server).lookup("14015000").await.unwrap();
        assert_eq!(place.neighborhood.as_deref(), Some("Centro"));
        assert_eq!(place.postal_code, "14015-000");
    }

    #[tokio::test]
    async fn test_malformed_codes_skip_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let viacep = client(&server);
        for code in ["", "1479", "14790-00", "147900001", "abcdefgh", "14790-0000"] {
            assert!(viacep.lookup(code).await.is_none(), "{code} should be rejected");
        }
    }

    #[tokio::test]
    async fn test_unregistered_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "erro": "true"
            })))
            .mount(&server)
            .await;

        assert!(client(&server).lookup("99999999").await.is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(client(&server).lookup("14790000").await.is_none());
    }

    #[tokio::test]
    async fn test_garbage_body_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        assert!(client(&server).lookup("14790000").await.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(serde_json::json!({ "localidade": "Guaíra", "uf": "SP" })),
            )
            .mount(&server)
            .await;

        let viacep = ViaCepClient::with_base_url(&server.uri(), Duration::from_millis(50)).unwrap();
        assert!(viacep.lookup("14790000").await.is_none());
    }

    #[test]
    fn test_error_flag_forms() {
        let parse = |v: serde_json::Value| serde_json::from_value::<ViaCepResponse>(v).unwrap();
        assert!(parse(serde_json::json!({ "erro": true })).is_error());
        assert!(parse(serde_json::json!({ "erro": "true" })).is_error());
        assert!(!parse(serde_json::json!({ "erro": false })).is_error());
        assert!(!parse(serde_json::json!({ "localidade": "Guaíra" })).is_error());
    }

    #[tokio::test]
    async fn test_lookup_without_municipality() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ws/14790000/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cep": "14790-000",
                "localidade": "",
                "uf": "SP"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ws/14780000/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cep": "14780-000",
                "localidade": "Barretos"
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(client.lookup("14790-000").await.is_none());
        assert!(client.lookup("14780-000").await.is_none());
    }
}
