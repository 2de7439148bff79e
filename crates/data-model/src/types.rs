//! Core domain types for a single search or prediction request.
//!
//! Every value here is request-scoped: it is built from provider responses,
//! shaped by the pipeline and dropped once the HTTP response is written.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// =============================================================================
// Type Aliases
// =============================================================================

/// Author screen name (without the leading `@`)
pub type Handle = String;

// =============================================================================
// Query
// =============================================================================

/// A validated, non-empty search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Validate raw form input. Missing, empty and whitespace-only input are rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw.map(str::trim) {
            Some(text) if !text.is_empty() => Ok(Query(text.to_string())),
            _ => Err(ValidationError::EmptyQuery),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The market-data symbol for this query, e.g. `"Bitcoin "` -> `"bitcoin"`.
    pub fn symbol(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Tweets
// =============================================================================

/// One tweet as returned by the tweet source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub text: String,
    pub author_handle: Handle,
    pub favorite_count: u64,
    pub retweet_count: u64,
    pub reply_count: u64,
    pub author_follower_count: u64,
}

impl TweetRecord {
    /// Favorites + retweets + replies
    pub fn interactions(&self) -> u64 {
        self.favorite_count + self.retweet_count + self.reply_count
    }
}

/// A tweet with its derived scores, the unit handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTweet {
    #[serde(flatten)]
    pub tweet: TweetRecord,
    pub engagement: f64,
    pub sentiment: f64,
    pub is_bot: bool,
}

// =============================================================================
// Bot classification
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotVerdict {
    pub handle: Handle,
    pub is_bot: bool,
}

/// Verdicts for one batch of handles, keyed by handle.
///
/// Handles the classifier did not answer for resolve to `fallback_is_bot`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotVerdicts {
    verdicts: HashMap<Handle, bool>,
    fallback_is_bot: bool,
}

impl BotVerdicts {
    pub fn new(verdicts: HashMap<Handle, bool>, fallback_is_bot: bool) -> Self {
        Self {
            verdicts,
            fallback_is_bot,
        }
    }

    /// No answers at all; every lookup returns the fallback.
    pub fn unanswered(fallback_is_bot: bool) -> Self {
        Self::new(HashMap::new(), fallback_is_bot)
    }

    pub fn is_bot(&self, handle: &str) -> bool {
        self.verdicts
            .get(handle)
            .copied()
            .unwrap_or(self.fallback_is_bot)
    }

    pub fn verdict(&self, handle: &str) -> BotVerdict {
        BotVerdict {
            handle: handle.to_string(),
            is_bot: self.is_bot(handle),
        }
    }

    /// Number of handles the classifier actually answered for
    pub fn answered(&self) -> usize {
        self.verdicts.len()
    }
}

// =============================================================================
// Market data and prediction
// =============================================================================

/// One price sample. On the wire this is the `[ms_timestamp, price]` pair
/// the market-data provider uses, and it is forwarded to the model in that shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(i64, f64)")]
pub struct HistoricalPoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl TryFrom<(f64, f64)> for HistoricalPoint {
    type Error = String;

    fn try_from((millis, price): (f64, f64)) -> Result<Self, Self::Error> {
        if !millis.is_finite() || millis.fract() != 0.0 {
            return Err(format!("timestamp {millis} is not a whole number of milliseconds"));
        }
        if !price.is_finite() {
            return Err(format!("price {price} is not finite"));
        }
        let timestamp = DateTime::from_timestamp_millis(millis as i64)
            .ok_or_else(|| format!("timestamp {millis} out of range"))?;
        Ok(HistoricalPoint { timestamp, price })
    }
}

impl From<HistoricalPoint> for (i64, f64) {
    fn from(point: HistoricalPoint) -> Self {
        (point.timestamp.timestamp_millis(), point.price)
    }
}

/// Payload submitted to the prediction model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    /// Engagement ratios of tweets from non-bot authors
    pub engagements: Vec<f64>,
    pub historical_data: Vec<HistoricalPoint>,
}

/// Opaque model output, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionResult(pub serde_json::Value);
