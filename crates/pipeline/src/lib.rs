//! Scoring and filtering for a request's tweets.
//!
//! This crate provides:
//! - `SentimentScorer` - lexicon polarity in [-1, 1]
//! - `engagement` - interactions per follower, zero-follower safe
//! - `TweetEnricher` - parallel, order-preserving scoring of a tweet batch
//! - Filter trait and `FilterPipeline`, with `BotAuthorFilter`
//!
//! Nothing here performs I/O; every function is deterministic.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, TweetEnricher};
//! use pipeline::filters::BotAuthorFilter;
//!
//! let enricher = TweetEnricher::default();
//! let enriched = enricher.enrich(tweets.clone(), &verdicts);
//!
//! let humans = FilterPipeline::new()
//!     .add_filter(BotAuthorFilter)
//!     .apply(tweets, &verdicts);
//! let ratios = enricher.engagements(&humans);
//! ```

pub mod engagement;
pub mod enrichment;
pub mod filter_pipeline;
pub mod filters;
pub mod sentiment;
pub mod traits;

// Re-export main types
pub use engagement::engagement;
pub use enrichment::TweetEnricher;
pub use filter_pipeline::FilterPipeline;
pub use sentiment::SentimentScorer;
pub use traits::Filter;
