//! Twitter Source - recent-search client
//!
//! Issues one search against the Twitter/X v2 recent-search endpoint and
//! maps the response into `TweetRecord`s.
//!
//! ## Algorithm
//! 1. Request up to `max_results` most-recent English tweets, with the
//!    author expansion so follower counts arrive in the same response
//! 2. Index `includes.users` by id
//! 3. Join each tweet to its author, preserving the provider's ordering

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};
use url::Url;

use data_model::{Provider, ProviderError, Query, TweetRecord};

use crate::{TweetSource, ensure_slash, transport_error};

const PROVIDER: Provider = Provider::TweetSource;

/// Settings for the tweet search provider.
#[derive(Debug, Clone, Deserialize)]
pub struct TwitterConfig {
    #[serde(default = "TwitterConfig::default_base_url")]
    pub base_url: Url,

    /// App-only bearer token; required at startup
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Page size for the search call (the API accepts 10..=100)
    #[serde(default = "TwitterConfig::default_max_results")]
    pub max_results: u8,

    #[serde(default = "TwitterConfig::default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl TwitterConfig {
    fn default_base_url() -> Url {
        Url::parse("https://api.twitter.com/").expect("static URL is valid")
    }

    fn default_max_results() -> u8 {
        100
    }

    fn default_timeout() -> Duration {
        Duration::from_secs(10)
    }
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            bearer_token: None,
            max_results: Self::default_max_results(),
            timeout: Self::default_timeout(),
        }
    }
}

// Wire format of GET /2/tweets/search/recent

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<ApiTweet>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Deserialize)]
struct ApiTweet {
    text: String,
    author_id: String,
    public_metrics: TweetMetrics,
}

#[derive(Debug, Deserialize)]
struct TweetMetrics {
    like_count: u64,
    retweet_count: u64,
    reply_count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: String,
    username: String,
    public_metrics: UserMetrics,
}

#[derive(Debug, Deserialize)]
struct UserMetrics {
    followers_count: u64,
}

/// Tweet source backed by the Twitter/X API.
pub struct TwitterClient {
    client: Client,
    base_url: Url,
    bearer_token: String,
    max_results: u8,
}

impl TwitterClient {
    pub fn new(config: &TwitterConfig, bearer_token: impl Into<String>) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            bearer_token: bearer_token.into(),
            max_results: config.max_results,
        })
    }

    fn search_url(&self) -> Result<Url, ProviderError> {
        ensure_slash(&self.base_url)
            .join("2/tweets/search/recent")
            .map_err(|e| ProviderError::transport(PROVIDER, false, format!("invalid search URL: {e}")))
    }
}

/// Join tweets to their authors. Tweets whose author was not expanded keep
/// the raw author id as handle and a follower count of zero.
fn into_records(response: &SearchResponse) -> Vec<TweetRecord> {
    let authors: HashMap<&str, &ApiUser> = response
        .includes
        .users
        .iter()
        .map(|user| (user.id.as_str(), user))
        .collect();

    response
        .data
        .iter()
        .map(|tweet| {
            let (author_handle, author_follower_count) = match authors.get(tweet.author_id.as_str()) {
                Some(user) => (user.username.clone(), user.public_metrics.followers_count),
                None => (tweet.author_id.clone(), 0),
            };
            TweetRecord {
                text: tweet.text.clone(),
                author_handle,
                favorite_count: tweet.public_metrics.like_count,
                retweet_count: tweet.public_metrics.retweet_count,
                reply_count: tweet.public_metrics.reply_count,
                author_follower_count,
            }
        })
        .collect()
}

#[async_trait]
impl TweetSource for TwitterClient {
    #[instrument(skip(self, query), fields(query = %query))]
    async fn fetch(&self, query: &Query) -> Result<Vec<TweetRecord>, ProviderError> {
        let url = self.search_url()?;
        // Grouped so the language filter binds to the whole query, OR included
        let search = format!("({}) lang:en", query.as_str());
        let max_results = self.max_results.to_string();

        debug!("Searching recent tweets at {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", search.as_str()),
                ("max_results", max_results.as_str()),
                ("sort_order", "recency"),
                ("tweet.fields", "public_metrics,author_id"),
                ("expansions", "author_id"),
                ("user.fields", "public_metrics"),
            ])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Tweet search failed with {}: {}", status, body);
            return Err(ProviderError::from_status(PROVIDER, status.as_u16()));
        }

        let body = response.text().await.map_err(|e| transport_error(PROVIDER, e))?;
        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse tweet search response: {}", e);
            ProviderError::malformed(PROVIDER, e.to_string())
        })?;

        let records = into_records(&parsed);
        debug!("Tweet search returned {} tweets", records.len());
        Ok(records)
    }
}
