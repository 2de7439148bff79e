//! # Request Orchestrator
//!
//! This module composes the provider clients and the scoring pipeline into
//! the two user-facing operations.
//!
//! `search`:
//! 1. Validate the query (no network call on failure)
//! 2. Fetch tweets
//! 3. Classify the distinct authors in one batch
//! 4. Score every tweet and attach its author's verdict
//! 5. Return the enriched tweets in provider order
//!
//! `predict`:
//! 1. Validate the query
//! 2. Fetch tweets
//! 3. Classify authors (one batch) while fetching price history
//! 4. Drop tweets from bot authors, compute engagement for the rest
//! 5. Submit engagement + history to the model, return its answer verbatim
//!
//! Provider clients are injected once at startup and shared by every
//! request; nothing here holds per-request state.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use data_model::{
    BotVerdict, BotVerdicts, EnrichedTweet, Handle, PredictionRequest, PredictionResult, ProviderError, Query, Result,
    TweetRecord,
};
use ml_client::{BotClassifier, Predictor};
use pipeline::filters::BotAuthorFilter;
use pipeline::{FilterPipeline, TweetEnricher};
use sources::{DEFAULT_WINDOW_DAYS, HistoricalSource, TweetSource};

/// How to treat accounts the classifier could not vouch for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierPolicy {
    /// When true, unanswered handles are humans and a classifier outage
    /// degrades `search` instead of failing it. When false, unanswered
    /// handles are bots and outages are surfaced.
    pub fail_open: bool,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self { fail_open: true }
    }
}

/// Result of a search request.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub tweets: Vec<EnrichedTweet>,
    /// The classifier was unavailable and every author was assumed human
    pub degraded: bool,
}

/// Result of a prediction request.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub query: String,
    pub symbol: String,
    pub result: PredictionResult,
    pub tweets_considered: usize,
    pub bots_excluded: usize,
    pub historical_points: usize,
}

/// Main orchestrator that coordinates the request pipeline
#[derive(Clone)]
pub struct Orchestrator {
    tweets: Arc<dyn TweetSource>,
    classifier: Arc<dyn BotClassifier>,
    history: Arc<dyn HistoricalSource>,
    predictor: Arc<dyn Predictor>,
    enricher: TweetEnricher,
    bot_filter: Arc<FilterPipeline>,
    policy: ClassifierPolicy,
    window_days: u32,
}

impl Orchestrator {
    /// Create an orchestrator over the given provider clients, with the
    /// fail-open policy and a 30-day history window.
    pub fn new(
        tweets: Arc<dyn TweetSource>,
        classifier: Arc<dyn BotClassifier>,
        history: Arc<dyn HistoricalSource>,
        predictor: Arc<dyn Predictor>,
    ) -> Self {
        Self {
            tweets,
            classifier,
            history,
            predictor,
            enricher: TweetEnricher::default(),
            bot_filter: Arc::new(FilterPipeline::new().add_filter(BotAuthorFilter)),
            policy: ClassifierPolicy::default(),
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    /// Configure the classifier policy (default: fail-open)
    pub fn with_policy(mut self, policy: ClassifierPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Configure the price history window in days (default: 30)
    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days;
        self
    }

    pub fn policy(&self) -> ClassifierPolicy {
        self.policy
    }

    /// Search tweets and enrich each with engagement, sentiment and bot verdict.
    #[instrument(skip(self))]
    pub async fn search(&self, raw_query: &str) -> Result<SearchOutcome> {
        let start_time = Instant::now();
        let query = Query::parse(Some(raw_query))?;

        let tweets = self.tweets.fetch(&query).await?;
        info!("Fetched {} tweets for '{}'", tweets.len(), query);

        let (verdicts, degraded) = match self.classify(&tweets).await {
            Ok(verdicts) => (verdicts, false),
            Err(err) if self.policy.fail_open => {
                warn!("Bot classification unavailable, assuming all authors are human: {}", err);
                (BotVerdicts::unanswered(false), true)
            }
            Err(err) => return Err(err.into()),
        };

        let enriched = self.enricher.enrich(tweets, &verdicts);
        let bots = enriched.iter().filter(|tweet| tweet.is_bot).count();
        info!(
            "Enriched {} tweets ({} from bots, degraded: {}) in {:.2?}",
            enriched.len(),
            bots,
            degraded,
            start_time.elapsed()
        );

        Ok(SearchOutcome {
            query: query.to_string(),
            tweets: enriched,
            degraded,
        })
    }

    /// Predict price movement from human engagement and recent price history.
    #[instrument(skip(self))]
    pub async fn predict(&self, raw_query: &str) -> Result<PredictionOutcome> {
        let start_time = Instant::now();
        let query = Query::parse(Some(raw_query))?;
        let symbol = query.symbol();

        let tweets = self.tweets.fetch(&query).await?;
        let tweets_considered = tweets.len();
        info!("Fetched {} tweets for '{}'", tweets_considered, query);

        // Classification and the history fetch do not depend on each other.
        let (verdicts, history) = tokio::join!(
            self.classify(&tweets),
            self.history.fetch(&symbol, self.window_days)
        );
        let verdicts = verdicts?;
        let historical_data = history?;
        if historical_data.is_empty() {
            warn!("No price history for '{}', predicting from engagement alone", symbol);
        }

        let humans = self.bot_filter.apply(tweets, &verdicts);
        let bots_excluded = tweets_considered - humans.len();
        let engagements = self.enricher.engagements(&humans);
        info!(
            "Excluded {} bot tweets, {} engagement samples, {} price points",
            bots_excluded,
            engagements.len(),
            historical_data.len()
        );

        let request = PredictionRequest {
            engagements,
            historical_data,
        };
        let result = self.predictor.predict(&request).await?;
        info!("Prediction for '{}' completed in {:.2?}", query, start_time.elapsed());

        Ok(PredictionOutcome {
            query: query.to_string(),
            symbol,
            result,
            tweets_considered,
            bots_excluded,
            historical_points: request.historical_data.len(),
        })
    }

    /// Classify each distinct author exactly once, in one call.
    async fn classify(&self, tweets: &[TweetRecord]) -> std::result::Result<BotVerdicts, ProviderError> {
        let fallback_is_bot = !self.policy.fail_open;
        let handles: BTreeSet<Handle> = tweets
            .iter()
            .map(|tweet| tweet.author_handle.clone())
            .collect();
        if handles.is_empty() {
            return Ok(BotVerdicts::unanswered(fallback_is_bot));
        }

        let answers = self.classifier.classify(&handles).await?;
        let verdicts = BotVerdicts::new(answers, fallback_is_bot);
        info!(
            "Classified {} distinct authors ({} answered)",
            handles.len(),
            verdicts.answered()
        );
        let flagged: Vec<BotVerdict> = handles
            .iter()
            .map(|handle| verdicts.verdict(handle))
            .filter(|verdict| verdict.is_bot)
            .collect();
        debug!("Flagged as bots: {:?}", flagged);
        Ok(verdicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeClassifier, FakeHistory, FakePredictor, FakeTweets, Fakes, tweet};
    use data_model::{PipelineError, Provider, ValidationError};
    use serde_json::json;

    fn bitcoin_tweets() -> Vec<TweetRecord> {
        vec![
            tweet("alice", "great coin!", 10, 5, 1, 100),
            tweet("bob", "scam", 0, 0, 0, 0),
        ]
    }

    #[tokio::test]
    async fn test_search_scenario() {
        let fakes = Fakes::new(
            FakeTweets::returning(bitcoin_tweets()),
            FakeClassifier::answering(&[("alice", false), ("bob", true)]),
            FakeHistory::empty(),
            FakePredictor::answering(json!({})),
        );

        let outcome = fakes.orchestrator().search("bitcoin").await.unwrap();

        assert!(!outcome.degraded);
        assert_eq!(outcome.tweets.len(), 2);

        let alice = &outcome.tweets[0];
        assert_eq!(alice.tweet.author_handle, "alice");
        assert_eq!(alice.engagement, 0.16);
        assert!(alice.sentiment > 0.0);
        assert!(!alice.is_bot);

        let bob = &outcome.tweets[1];
        assert_eq!(bob.tweet.author_handle, "bob");
        assert_eq!(bob.engagement, 0.0);
        assert!(bob.sentiment < 0.0);
        assert!(bob.is_bot);

        assert_eq!(fakes.classifier.calls(), 1);
        assert_eq!(fakes.history.calls(), 0);
        assert_eq!(fakes.predictor.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_query_makes_no_calls() {
        let fakes = Fakes::default();
        let orchestrator = fakes.orchestrator();

        for raw in ["", "   "] {
            let err = orchestrator.search(raw).await.unwrap_err();
            assert!(matches!(err, PipelineError::Validation(ValidationError::EmptyQuery)));

            let err = orchestrator.predict(raw).await.unwrap_err();
            assert!(matches!(err, PipelineError::Validation(ValidationError::EmptyQuery)));
        }

        assert_eq!(fakes.tweets.calls(), 0);
        assert_eq!(fakes.classifier.calls(), 0);
        assert_eq!(fakes.history.calls(), 0);
        assert_eq!(fakes.predictor.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_classifies_distinct_handles_once() {
        let fakes = Fakes::new(
            FakeTweets::returning(vec![
                tweet("bob", "scam", 0, 0, 0, 0),
                tweet("alice", "good", 1, 0, 0, 10),
                tweet("bob", "scam again", 0, 0, 0, 0),
            ]),
            FakeClassifier::answering(&[("bob", true)]),
            FakeHistory::empty(),
            FakePredictor::answering(json!({})),
        );

        let outcome = fakes.orchestrator().search("bitcoin").await.unwrap();

        assert_eq!(fakes.classifier.calls(), 1);
        assert_eq!(
            fakes.classifier.last_handles(),
            vec!["alice".to_string(), "bob".to_string()]
        );
        // Order preserved, duplicate handles share the verdict
        let flags: Vec<bool> = outcome.tweets.iter().map(|t| t.is_bot).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[tokio::test]
    async fn test_search_missing_handle_is_not_a_bot() {
        let fakes = Fakes::new(
            FakeTweets::returning(bitcoin_tweets()),
            FakeClassifier::answering(&[("bob", true)]),
            FakeHistory::empty(),
            FakePredictor::answering(json!({})),
        );

        let outcome = fakes.orchestrator().search("bitcoin").await.unwrap();
        assert!(!outcome.tweets[0].is_bot);
    }

    #[tokio::test]
    async fn test_search_degrades_when_classifier_fails() {
        let fakes = Fakes::new(
            FakeTweets::returning(bitcoin_tweets()),
            FakeClassifier::failing(),
            FakeHistory::empty(),
            FakePredictor::answering(json!({})),
        );

        let outcome = fakes.orchestrator().search("bitcoin").await.unwrap();

        assert!(outcome.degraded);
        assert_eq!(outcome.tweets.len(), 2);
        assert!(outcome.tweets.iter().all(|t| !t.is_bot));
    }

    #[tokio::test]
    async fn test_fail_closed_policy() {
        let fakes = Fakes::new(
            FakeTweets::returning(bitcoin_tweets()),
            FakeClassifier::answering(&[("alice", false)]),
            FakeHistory::empty(),
            FakePredictor::answering(json!({})),
        );
        let orchestrator = fakes
            .orchestrator()
            .with_policy(ClassifierPolicy { fail_open: false });

        // Unanswered bob is treated as a bot
        let outcome = orchestrator.search("bitcoin").await.unwrap();
        assert!(!outcome.tweets[0].is_bot);
        assert!(outcome.tweets[1].is_bot);

        let failing = Fakes::new(
            FakeTweets::returning(bitcoin_tweets()),
            FakeClassifier::failing(),
            FakeHistory::empty(),
            FakePredictor::answering(json!({})),
        );
        let err = failing
            .orchestrator()
            .with_policy(ClassifierPolicy { fail_open: false })
            .search("bitcoin")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Provider(ref e) if e.provider() == Provider::BotClassifier
        ));
    }

    #[tokio::test]
    async fn test_search_surfaces_tweet_source_failure() {
        let fakes = Fakes::new(
            FakeTweets::failing(),
            FakeClassifier::answering(&[]),
            FakeHistory::empty(),
            FakePredictor::answering(json!({})),
        );

        let err = fakes.orchestrator().search("bitcoin").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Provider(ProviderError::RateLimited { provider: Provider::TweetSource })
        ));
        assert_eq!(fakes.classifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_search_without_tweets_skips_classifier() {
        let fakes = Fakes::new(
            FakeTweets::returning(vec![]),
            FakeClassifier::answering(&[]),
            FakeHistory::empty(),
            FakePredictor::answering(json!({})),
        );

        let outcome = fakes.orchestrator().search("nothing").await.unwrap();
        assert!(outcome.tweets.is_empty());
        assert_eq!(fakes.classifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_predict_excludes_bots_and_batches() {
        let fakes = Fakes::new(
            FakeTweets::returning(vec![
                tweet("alice", "great coin!", 10, 5, 1, 100),
                tweet("bob", "scam", 3, 0, 0, 3),
                tweet("carol", "solid", 1, 1, 0, 4),
                tweet("bob", "scam", 3, 0, 0, 3),
            ]),
            FakeClassifier::answering(&[("alice", false), ("bob", true), ("carol", false)]),
            FakeHistory::with_prices(&[(1_711_756_800_000, 68000.0), (1_711_843_200_000, 69000.5)]),
            FakePredictor::answering(json!({"direction": "up", "confidence": 0.7})),
        );

        let outcome = fakes.orchestrator().predict("Bitcoin").await.unwrap();

        assert_eq!(fakes.classifier.calls(), 1);
        assert_eq!(fakes.history.last_request(), Some(("bitcoin".to_string(), 30)));
        assert_eq!(outcome.symbol, "bitcoin");
        assert_eq!(outcome.tweets_considered, 4);
        assert_eq!(outcome.bots_excluded, 2);
        assert_eq!(outcome.historical_points, 2);
        assert_eq!(
            outcome.result,
            PredictionResult(json!({"direction": "up", "confidence": 0.7}))
        );

        let request = fakes.predictor.last_request().unwrap();
        assert_eq!(request.engagements, vec![0.16, 0.5]);
        assert_eq!(request.historical_data.len(), 2);
    }

    #[tokio::test]
    async fn test_predict_all_bots_still_submits() {
        let fakes = Fakes::new(
            FakeTweets::returning(vec![tweet("bot1", "pump", 1, 1, 1, 10), tweet("bot2", "pump", 2, 2, 2, 10)]),
            FakeClassifier::answering(&[("bot1", true), ("bot2", true)]),
            FakeHistory::with_prices(&[(1_711_929_600_000, 70000.0)]),
            FakePredictor::answering(json!({"direction": "flat"})),
        );

        let outcome = fakes.orchestrator().predict("bitcoin").await.unwrap();

        assert_eq!(fakes.predictor.calls(), 1);
        let request = fakes.predictor.last_request().unwrap();
        assert!(request.engagements.is_empty());
        assert_eq!(request.historical_data.len(), 1);
        assert_eq!(outcome.bots_excluded, 2);
    }

    #[tokio::test]
    async fn test_predict_without_history_still_submits() {
        let fakes = Fakes::new(
            FakeTweets::returning(bitcoin_tweets()),
            FakeClassifier::answering(&[("alice", false), ("bob", true)]),
            FakeHistory::empty(),
            FakePredictor::answering(json!({"direction": "down"})),
        );

        let outcome = fakes.orchestrator().predict("bitcoin").await.unwrap();

        let request = fakes.predictor.last_request().unwrap();
        assert!(request.historical_data.is_empty());
        assert_eq!(request.engagements, vec![0.16]);
        assert_eq!(outcome.historical_points, 0);
    }

    #[tokio::test]
    async fn test_predict_surfaces_classifier_failure() {
        let fakes = Fakes::new(
            FakeTweets::returning(bitcoin_tweets()),
            FakeClassifier::failing(),
            FakeHistory::empty(),
            FakePredictor::answering(json!({})),
        );

        let err = fakes.orchestrator().predict("bitcoin").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Provider(ref e) if e.provider() == Provider::BotClassifier
        ));
        assert_eq!(fakes.predictor.calls(), 0);
    }

    #[tokio::test]
    async fn test_predict_surfaces_predictor_failure() {
        let fakes = Fakes::new(
            FakeTweets::returning(bitcoin_tweets()),
            FakeClassifier::answering(&[]),
            FakeHistory::empty(),
            FakePredictor::failing(),
        );

        let err = fakes.orchestrator().predict("bitcoin").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Provider(ProviderError::Malformed { provider: Provider::Prediction, .. })
        ));
    }

    #[tokio::test]
    async fn test_custom_window() {
        let fakes = Fakes::default();
        fakes
            .orchestrator()
            .with_window_days(7)
            .predict("eth")
            .await
            .unwrap();
        assert_eq!(fakes.history.last_request(), Some(("eth".to_string(), 7)));
    }
}
