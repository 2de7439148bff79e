//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to a request's tweets.

use data_model::{BotVerdicts, TweetRecord};

/// Core trait for filtering tweets.
///
/// All filters must implement this trait to be used in the FilterPipeline.
/// Filters take ownership of the tweets and return the survivors in their
/// original order.
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of tweets.
    ///
    /// # Arguments
    /// * `tweets` - The tweets to filter (takes ownership)
    /// * `verdicts` - Bot verdicts for the authors in this request
    fn apply(&self, tweets: Vec<TweetRecord>, verdicts: &BotVerdicts) -> Vec<TweetRecord>;
}
