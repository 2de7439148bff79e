//! Price prediction client.
//!
//! Submits aggregated engagement and the historical series to the model
//! endpoint and hands back whatever JSON the model produced.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};
use url::Url;

use data_model::{PredictionRequest, PredictionResult, Provider, ProviderError};

use crate::{Predictor, transport_error};

const PROVIDER: Provider = Provider::Prediction;

/// Settings for the prediction model endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    #[serde(default = "PredictionConfig::default_url")]
    pub url: Url,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Model inference is slower than the other providers
    #[serde(default = "PredictionConfig::default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl PredictionConfig {
    fn default_url() -> Url {
        Url::parse("http://localhost:8000/predict").expect("static URL is valid")
    }

    fn default_timeout() -> Duration {
        Duration::from_secs(30)
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            api_key: None,
            timeout: Self::default_timeout(),
        }
    }
}

/// Predictor backed by an HTTP model endpoint.
pub struct PredictionClient {
    client: Client,
    url: Url,
    api_key: Option<String>,
}

impl PredictionClient {
    pub fn new(config: &PredictionConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Endpoint this client submits to.
    pub fn endpoint(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Predictor for PredictionClient {
    #[instrument(
        skip(self, request),
        fields(engagements = request.engagements.len(), historical = request.historical_data.len())
    )]
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, ProviderError> {
        debug!("Submitting prediction request to {}", self.url);

        let mut call = self.client.post(self.url.clone()).json(request);
        if let Some(api_key) = &self.api_key {
            call = call.bearer_auth(api_key);
        }

        let response = call.send().await.map_err(|e| transport_error(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Prediction endpoint returned {}: {}", status, body);
            return Err(ProviderError::from_status(PROVIDER, status.as_u16()));
        }

        let body = response.text().await.map_err(|e| transport_error(PROVIDER, e))?;
        let result: PredictionResult = serde_json::from_str(&body).map_err(|e| {
            error!("Prediction endpoint returned a non-JSON body: {}", e);
            ProviderError::malformed(PROVIDER, e.to_string())
        })?;

        Ok(result)
    }
}
