//! Per-tweet scoring for a whole request.
//!
//! Each tweet's engagement and sentiment are independent of every other
//! tweet, so they are computed in parallel. Output order always matches
//! input order.

use data_model::{BotVerdicts, EnrichedTweet, TweetRecord};
use rayon::prelude::*;

use crate::engagement::engagement;
use crate::sentiment::SentimentScorer;

/// Scores tweets and attaches their author's bot verdict.
#[derive(Debug, Clone, Default)]
pub struct TweetEnricher {
    sentiment: SentimentScorer,
}

impl TweetEnricher {
    /// Enrich every tweet, in parallel, preserving order.
    pub fn enrich(&self, tweets: Vec<TweetRecord>, verdicts: &BotVerdicts) -> Vec<EnrichedTweet> {
        tweets
            .into_par_iter()
            .map(|tweet| self.enrich_single(tweet, verdicts))
            .collect()
    }

    /// Engagement ratios only, in the same order as `tweets`.
    pub fn engagements(&self, tweets: &[TweetRecord]) -> Vec<f64> {
        tweets.par_iter().map(engagement).collect()
    }

    fn enrich_single(&self, tweet: TweetRecord, verdicts: &BotVerdicts) -> EnrichedTweet {
        EnrichedTweet {
            engagement: engagement(&tweet),
            sentiment: self.sentiment.score(&tweet.text),
            is_bot: verdicts.is_bot(&tweet.author_handle),
            tweet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn tweet(handle: &str, text: &str, followers: u64) -> TweetRecord {
        TweetRecord {
            text: text.to_string(),
            author_handle: handle.to_string(),
            favorite_count: 4,
            retweet_count: 0,
            reply_count: 0,
            author_follower_count: followers,
        }
    }

    #[test]
    fn test_enrich_preserves_order() {
        let enricher = TweetEnricher::default();
        let verdicts = BotVerdicts::unanswered(false);

        let tweets: Vec<TweetRecord> = (0..500)
            .map(|i| tweet(&format!("user{i}"), "good", i + 1))
            .collect();
        let enriched = enricher.enrich(tweets, &verdicts);

        assert_eq!(enriched.len(), 500);
        for (i, item) in enriched.iter().enumerate() {
            assert_eq!(item.tweet.author_handle, format!("user{i}"));
            assert_eq!(item.engagement, 4.0 / (i as f64 + 1.0));
        }
    }

    #[test]
    fn test_duplicate_handles_share_a_verdict() {
        let enricher = TweetEnricher::default();
        let verdicts = BotVerdicts::new(HashMap::from([("bob".to_string(), true)]), false);

        let enriched = enricher.enrich(
            vec![tweet("bob", "scam", 0), tweet("alice", "great", 8), tweet("bob", "buy", 2)],
            &verdicts,
        );

        assert!(enriched[0].is_bot);
        assert!(!enriched[1].is_bot);
        assert!(enriched[2].is_bot);
        assert_eq!(enriched[0].engagement, 0.0);
        assert!(enriched[0].sentiment < 0.0);
        assert_eq!(enriched[1].engagement, 0.5);
    }

    #[test]
    fn test_engagements_only() {
        let enricher = TweetEnricher::default();
        let ratios = enricher.engagements(&[tweet("a", "", 8), tweet("b", "", 0)]);
        assert_eq!(ratios, vec![0.5, 0.0]);
    }
}
