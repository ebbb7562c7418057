use std::time::Duration;

use async_trait::async_trait;
use pricebook_core::config::ServiceConfig;
use pricebook_core::domain::geography::GeographyRow;
use pricebook_core::domain::quote::{CalcResponse, QuoteRequest};
use pricebook_core::service::{PricingService, ServiceError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

pub const PRICEBOOK_PATH: &str = "/api/pricebook";
pub const TIER1_PATH: &str = "/api/tier1";
pub const CALC_PATH: &str = "/api/calc";

/// `PricingService` over the pricing service's HTTP API.
#[derive(Clone, Debug)]
pub struct HttpPricingService {
    client: Client,
    config: ServiceConfig,
}

#[derive(Debug, Deserialize)]
struct Tier1Body {
    #[serde(rename = "Tier1CitiesUSA")]
    cities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpPricingService {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| ServiceError::Transport(error.to_string()))?;

        Ok(Self { client, config: config.clone() })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ServiceError>
    where
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        debug!(
            event_name = "service.request.sent",
            url = %url,
            params = query.len(),
            "pricing service request"
        );

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|error| ServiceError::Transport(error.to_string()))?;

        let status = response.status();
        let body =
            response.text().await.map_err(|error| ServiceError::Transport(error.to_string()))?;

        if let Some(message) = rejection_message(&body) {
            return Err(ServiceError::Rejected(message));
        }
        if !status.is_success() {
            return Err(ServiceError::Status { status: status.as_u16() });
        }

        serde_json::from_str(&body).map_err(|error| ServiceError::Decode(error.to_string()))
    }
}

/// The service reports rejections as `{"error": "..."}`, with or without a
/// failing status code.
fn rejection_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|body| body.error)
        .filter(|message| !message.trim().is_empty())
}

#[async_trait]
impl PricingService for HttpPricingService {
    async fn fetch_pricebook(&self) -> Result<Vec<GeographyRow>, ServiceError> {
        self.get_json(PRICEBOOK_PATH, &[]).await
    }

    async fn fetch_tier1_cities(&self) -> Result<Vec<String>, ServiceError> {
        let body: Tier1Body = self.get_json(TIER1_PATH, &[]).await?;
        Ok(body.cities)
    }

    async fn calculate(&self, request: &QuoteRequest) -> Result<CalcResponse, ServiceError> {
        self.get_json(CALC_PATH, &request.query_pairs()).await
    }
}
