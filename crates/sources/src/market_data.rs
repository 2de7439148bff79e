//! Market Data Source - historical price series
//!
//! Fetches a fixed window of daily-ish price points for a coin from a
//! CoinGecko-compatible `market_chart` endpoint.
//!
//! A non-success status from the provider means "no signal", not failure:
//! the prediction flow carries on with an empty series.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};
use url::Url;

use data_model::{HistoricalPoint, Provider, ProviderError};

use crate::{HistoricalSource, transport_error};

const PROVIDER: Provider = Provider::HistoricalData;

/// Default length of the history window, in days
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Settings for the historical market-data provider.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketDataConfig {
    #[serde(default = "MarketDataConfig::default_base_url")]
    pub base_url: Url,

    /// Quote currency for prices
    #[serde(default = "MarketDataConfig::default_vs_currency")]
    pub vs_currency: String,

    #[serde(default = "MarketDataConfig::default_window_days")]
    pub window_days: u32,

    #[serde(default = "MarketDataConfig::default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl MarketDataConfig {
    fn default_base_url() -> Url {
        Url::parse("https://api.coingecko.com/api/v3/").expect("static URL is valid")
    }

    fn default_vs_currency() -> String {
        "usd".to_string()
    }

    fn default_window_days() -> u32 {
        DEFAULT_WINDOW_DAYS
    }

    fn default_timeout() -> Duration {
        Duration::from_secs(10)
    }
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            vs_currency: Self::default_vs_currency(),
            window_days: Self::default_window_days(),
            timeout: Self::default_timeout(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<HistoricalPoint>,
}

/// Historical data source backed by CoinGecko.
pub struct CoinGeckoClient {
    client: Client,
    base_url: Url,
    vs_currency: String,
}

impl CoinGeckoClient {
    pub fn new(config: &MarketDataConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            vs_currency: config.vs_currency.clone(),
        })
    }

    /// `{base}/coins/{symbol}/market_chart`, with the symbol percent-encoded
    /// as a single path segment.
    fn chart_url(&self, symbol: &str) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ProviderError::transport(PROVIDER, false, format!("base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["coins", symbol, "market_chart"]);
        Ok(url)
    }
}

#[async_trait]
impl HistoricalSource for CoinGeckoClient {
    #[instrument(skip(self))]
    async fn fetch(&self, symbol: &str, window_days: u32) -> Result<Vec<HistoricalPoint>, ProviderError> {
        let url = self.chart_url(symbol)?;
        let days = window_days.to_string();

        debug!("Fetching {} days of prices from {}", window_days, url);
        let response = self
            .client
            .get(url)
            .query(&[("vs_currency", self.vs_currency.as_str()), ("days", days.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Market data provider returned {} for {}, continuing without history", status, symbol);
            return Ok(Vec::new());
        }

        let body = response.text().await.map_err(|e| transport_error(PROVIDER, e))?;
        let chart: MarketChart = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse market chart for {}: {}", symbol, e);
            ProviderError::malformed(PROVIDER, e.to_string())
        })?;

        let mut points = chart.prices;
        points.sort_by_key(|point| point.timestamp);
        debug!("Fetched {} historical points for {}", points.len(), symbol);
        Ok(points)
    }
}
