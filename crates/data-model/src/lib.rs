//! # Data Model Crate
//!
//! Request-scoped domain types and the error taxonomy shared by the
//! provider clients, the scoring pipeline and the orchestrator.
//!
//! ## Main Components
//!
//! - **types**: `TweetRecord`, `EnrichedTweet`, `BotVerdicts`, `HistoricalPoint`,
//!   `PredictionRequest`, `PredictionResult`, validated `Query`
//! - **error**: `ProviderError`, `ValidationError` and the umbrella `PipelineError`

pub mod error;
pub mod types;

pub use error::{PipelineError, Provider, ProviderError, Result, ValidationError};
pub use types::{
    BotVerdict, BotVerdicts, EnrichedTweet, Handle, HistoricalPoint, PredictionRequest,
    PredictionResult, Query, TweetRecord,
};
