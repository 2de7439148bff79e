//! # Sources Crate
//!
//! External data providers the request pipeline reads from.
//!
//! ## Components
//!
//! ### Tweet Source
//! Recent-search against the Twitter/X API:
//! - Up to 100 most-recent English tweets per query
//! - Author follower counts joined in from the same response
//!
//! ### Historical Source
//! Price history from a CoinGecko-compatible API:
//! - Fixed window (30 days by default), ascending by timestamp
//! - Non-success status means "no signal" and yields an empty series
//!
//! Both are exposed as traits so the orchestrator can be handed any
//! implementation; `TwitterClient` and `CoinGeckoClient` are the HTTP ones.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{TweetSource, TwitterClient, TwitterConfig};
//!
//! let twitter = TwitterClient::new(&TwitterConfig::default(), token)?;
//! let tweets = twitter.fetch(&query).await?;
//! ```

use async_trait::async_trait;
use url::Url;

use data_model::{HistoricalPoint, Provider, ProviderError, Query, TweetRecord};

pub mod market_data;
pub mod twitter;

pub use market_data::{CoinGeckoClient, DEFAULT_WINDOW_DAYS, MarketDataConfig};
pub use twitter::{TwitterClient, TwitterConfig};

/// Searches a tweet provider.
#[async_trait]
pub trait TweetSource: Send + Sync {
    /// Most-recent matches for `query`, in provider order.
    async fn fetch(&self, query: &Query) -> Result<Vec<TweetRecord>, ProviderError>;
}

/// Reads historical prices for a symbol.
#[async_trait]
pub trait HistoricalSource: Send + Sync {
    /// Price points covering the last `window_days`, ascending by timestamp.
    /// An unsuccessful provider response is an empty series, not an error.
    async fn fetch(&self, symbol: &str, window_days: u32) -> Result<Vec<HistoricalPoint>, ProviderError>;
}

pub(crate) fn transport_error(provider: Provider, err: reqwest::Error) -> ProviderError {
    ProviderError::transport(provider, err.is_timeout(), err.to_string())
}

/// Makes sure a url has a trailing slash, so `join` appends instead of
/// replacing the last path segment.
pub(crate) fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let mut path = new_url.path().to_string();
        path.push('/');
        new_url.set_path(&path);
        new_url
    }
}
