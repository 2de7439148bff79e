//! Error types shared by every stage of the request pipeline.
//!
//! Two kinds of failure reach the orchestrator boundary:
//! - `ValidationError` - the request itself is unusable; raised before any network call
//! - `ProviderError` - an external dependency failed; carries the `Provider` stage
//!   so the user-facing message can say which step broke

use std::fmt;

use thiserror::Error;

/// The external services the pipeline depends on.
///
/// The `Display` form is the stage name shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    TweetSource,
    BotClassifier,
    HistoricalData,
    Prediction,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Provider::TweetSource => "tweet search",
            Provider::BotClassifier => "bot classification",
            Provider::HistoricalData => "historical market data",
            Provider::Prediction => "price prediction",
        };
        f.write_str(stage)
    }
}

/// Failures talking to an external provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Credentials missing or rejected (401/403)
    #[error("{provider} rejected our credentials")]
    Unauthorized { provider: Provider },

    /// Provider-side rate limit exhausted (429)
    #[error("{provider} rate limit exhausted")]
    RateLimited { provider: Provider },

    /// The bounded per-call timeout elapsed
    #[error("{provider} timed out")]
    Timeout { provider: Provider },

    /// Connection-level failure before any response was received
    #[error("{provider} unreachable: {reason}")]
    Unreachable { provider: Provider, reason: String },

    /// Any other non-success HTTP status
    #[error("{provider} returned HTTP {status}")]
    Status { provider: Provider, status: u16 },

    /// A response arrived but did not have the expected shape
    #[error("{provider} returned malformed data: {reason}")]
    Malformed { provider: Provider, reason: String },
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching variant.
    pub fn from_status(provider: Provider, status: u16) -> Self {
        match status {
            401 | 403 => ProviderError::Unauthorized { provider },
            429 => ProviderError::RateLimited { provider },
            _ => ProviderError::Status { provider, status },
        }
    }

    /// Map a transport failure (no usable response) to the matching variant.
    pub fn transport(provider: Provider, timed_out: bool, reason: impl Into<String>) -> Self {
        if timed_out {
            ProviderError::Timeout { provider }
        } else {
            ProviderError::Unreachable {
                provider,
                reason: reason.into(),
            }
        }
    }

    pub fn malformed(provider: Provider, reason: impl Into<String>) -> Self {
        ProviderError::Malformed {
            provider,
            reason: reason.into(),
        }
    }

    /// The stage that failed.
    pub fn provider(&self) -> Provider {
        match self {
            ProviderError::Unauthorized { provider }
            | ProviderError::RateLimited { provider }
            | ProviderError::Timeout { provider }
            | ProviderError::Unreachable { provider, .. }
            | ProviderError::Status { provider, .. }
            | ProviderError::Malformed { provider, .. } => *provider,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout { .. })
    }
}

/// The request could not be served as submitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a search query")]
    EmptyQuery,
}

/// Everything the orchestrator can return to its caller.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Convenience type alias for pipeline results
pub type Result<T> = std::result::Result<T, PipelineError>;
