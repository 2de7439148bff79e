//! Clients for the model services the pipeline consults.
//!
//! This crate provides Rust clients for the two HTTP model endpoints:
//! - `BotSentinelClient` classifies a batch of account handles as bot / not bot
//! - `PredictionClient` turns engagement plus price history into a prediction
//!
//! Both sit behind traits so the orchestrator can be wired with fakes in tests.
//! Every client carries a bounded timeout; expiry surfaces as
//! `ProviderError::Timeout`.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use data_model::{Handle, PredictionRequest, PredictionResult, Provider, ProviderError};

pub mod classifier;
pub mod predictor;

pub use classifier::{BotSentinelClient, ClassifierConfig};
pub use predictor::{PredictionClient, PredictionConfig};

/// Classifies accounts as automated or human.
#[async_trait]
pub trait BotClassifier: Send + Sync {
    /// Classify every handle in one call.
    ///
    /// The returned map holds only the handles the service answered for;
    /// callers decide what an absent handle means.
    async fn classify(&self, handles: &BTreeSet<Handle>) -> Result<HashMap<Handle, bool>, ProviderError>;
}

/// Produces a price-movement prediction.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, ProviderError>;
}

pub(crate) fn transport_error(provider: Provider, err: reqwest::Error) -> ProviderError {
    ProviderError::transport(provider, err.is_timeout(), err.to_string())
}
