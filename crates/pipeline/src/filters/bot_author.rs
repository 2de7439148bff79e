//! Filter to remove tweets posted by accounts classified as bots.
//!
//! Used before aggregating engagement for a prediction, so automated
//! amplification does not inflate the signal.

use crate::traits::Filter;
use data_model::{BotVerdicts, TweetRecord};

/// Removes tweets whose author's verdict is `is_bot`.
///
/// Authors the classifier did not answer for follow the verdict fallback.
pub struct BotAuthorFilter;

impl Filter for BotAuthorFilter {
    fn name(&self) -> &str {
        "BotAuthorFilter"
    }

    fn apply(&self, tweets: Vec<TweetRecord>, verdicts: &BotVerdicts) -> Vec<TweetRecord> {
        tweets
            .into_iter()
            .filter(|tweet| !verdicts.is_bot(&tweet.author_handle))
            .collect()
    }
}
