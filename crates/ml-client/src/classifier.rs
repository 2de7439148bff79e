//! Bot classification client.
//!
//! One POST per distinct handle set. The response is an object keyed by
//! handle; handles the service leaves out are simply absent from the
//! returned answers and resolved later by the caller's fallback policy.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use url::Url;

use data_model::{Handle, Provider, ProviderError};

use crate::{BotClassifier, transport_error};

const PROVIDER: Provider = Provider::BotClassifier;

/// Settings for the bot classification service.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "ClassifierConfig::default_url")]
    pub url: Url,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Treat unclassified accounts as humans, and keep serving search
    /// results when the classifier is down
    #[serde(default = "ClassifierConfig::default_fail_open")]
    pub fail_open: bool,

    #[serde(default = "ClassifierConfig::default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl ClassifierConfig {
    fn default_url() -> Url {
        Url::parse("https://botsentinel.com/api/v1/accounts/check").expect("static URL is valid")
    }

    fn default_fail_open() -> bool {
        true
    }

    fn default_timeout() -> Duration {
        Duration::from_secs(10)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            api_key: None,
            fail_open: Self::default_fail_open(),
            timeout: Self::default_timeout(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    accounts: Vec<&'a str>,
}

/// Per-account entry; anything beyond `is_bot` is ignored.
#[derive(Debug, Deserialize)]
struct AccountCheck {
    #[serde(default)]
    is_bot: Option<bool>,
}

/// Bot classifier backed by a Bot Sentinel style HTTP API.
pub struct BotSentinelClient {
    client: Client,
    url: Url,
    api_key: Option<String>,
}

impl BotSentinelClient {
    pub fn new(config: &ClassifierConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl BotClassifier for BotSentinelClient {
    #[instrument(skip(self, handles), fields(handles = handles.len()))]
    async fn classify(&self, handles: &BTreeSet<Handle>) -> Result<HashMap<Handle, bool>, ProviderError> {
        if handles.is_empty() {
            return Ok(HashMap::new());
        }

        let body = CheckRequest {
            accounts: handles.iter().map(String::as_str).collect(),
        };

        let mut request = self.client.post(self.url.clone()).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| transport_error(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Bot classification failed with {}: {}", status, body);
            return Err(ProviderError::from_status(PROVIDER, status.as_u16()));
        }

        let text = response.text().await.map_err(|e| transport_error(PROVIDER, e))?;
        let checks: HashMap<Handle, AccountCheck> = serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse bot classification response: {}", e);
            ProviderError::malformed(PROVIDER, e.to_string())
        })?;

        let answers: HashMap<Handle, bool> = checks
            .into_iter()
            .filter_map(|(handle, check)| check.is_bot.map(|is_bot| (handle, is_bot)))
            .collect();

        debug!("Classifier answered for {} of {} handles", answers.len(), handles.len());
        Ok(answers)
    }
}
