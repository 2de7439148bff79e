//! In-process fakes for the provider traits, with call counters.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use data_model::{
    Handle, HistoricalPoint, PredictionRequest, PredictionResult, Provider, ProviderError, Query, TweetRecord,
};
use ml_client::{BotClassifier, Predictor};
use sources::{HistoricalSource, TweetSource};

use crate::orchestrator::Orchestrator;

pub fn tweet(handle: &str, text: &str, favorites: u64, retweets: u64, replies: u64, followers: u64) -> TweetRecord {
    TweetRecord {
        text: text.to_string(),
        author_handle: handle.to_string(),
        favorite_count: favorites,
        retweet_count: retweets,
        reply_count: replies,
        author_follower_count: followers,
    }
}

#[derive(Default)]
pub struct FakeTweets {
    tweets: Vec<TweetRecord>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeTweets {
    pub fn returning(tweets: Vec<TweetRecord>) -> Self {
        Self {
            tweets,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TweetSource for FakeTweets {
    async fn fetch(&self, _query: &Query) -> Result<Vec<TweetRecord>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::RateLimited {
                provider: Provider::TweetSource,
            });
        }
        Ok(self.tweets.clone())
    }
}

#[derive(Default)]
pub struct FakeClassifier {
    answers: HashMap<Handle, bool>,
    fail: bool,
    calls: AtomicUsize,
    last_handles: Mutex<Vec<Handle>>,
}

impl FakeClassifier {
    pub fn answering(answers: &[(&str, bool)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(handle, is_bot)| (handle.to_string(), *is_bot))
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_handles(&self) -> Vec<Handle> {
        self.last_handles.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotClassifier for FakeClassifier {
    async fn classify(&self, handles: &BTreeSet<Handle>) -> Result<HashMap<Handle, bool>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_handles.lock().unwrap() = handles.iter().cloned().collect();
        if self.fail {
            return Err(ProviderError::Status {
                provider: Provider::BotClassifier,
                status: 503,
            });
        }
        Ok(self
            .answers
            .iter()
            .filter(|(handle, _)| handles.contains(*handle))
            .map(|(handle, is_bot)| (handle.clone(), *is_bot))
            .collect())
    }
}

#[derive(Default)]
pub struct FakeHistory {
    points: Vec<HistoricalPoint>,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, u32)>>,
}

impl FakeHistory {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_prices(prices: &[(i64, f64)]) -> Self {
        Self {
            points: prices
                .iter()
                .map(|&(millis, price)| HistoricalPoint::try_from((millis as f64, price)).unwrap())
                .collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, u32)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoricalSource for FakeHistory {
    async fn fetch(&self, symbol: &str, window_days: u32) -> Result<Vec<HistoricalPoint>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((symbol.to_string(), window_days));
        Ok(self.points.clone())
    }
}

pub struct FakePredictor {
    answer: Option<Value>,
    calls: AtomicUsize,
    last_request: Mutex<Option<PredictionRequest>>,
}

impl FakePredictor {
    pub fn answering(answer: Value) -> Self {
        Self {
            answer: Some(answer),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<PredictionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl Predictor for FakePredictor {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.answer {
            Some(answer) => Ok(PredictionResult(answer.clone())),
            None => Err(ProviderError::malformed(Provider::Prediction, "expected JSON")),
        }
    }
}

/// One fake per provider, shared with the orchestrator so tests can
/// inspect calls afterwards.
pub struct Fakes {
    pub tweets: Arc<FakeTweets>,
    pub classifier: Arc<FakeClassifier>,
    pub history: Arc<FakeHistory>,
    pub predictor: Arc<FakePredictor>,
}

impl Fakes {
    pub fn new(
        tweets: FakeTweets,
        classifier: FakeClassifier,
        history: FakeHistory,
        predictor: FakePredictor,
    ) -> Self {
        Self {
            tweets: Arc::new(tweets),
            classifier: Arc::new(classifier),
            history: Arc::new(history),
            predictor: Arc::new(predictor),
        }
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            self.tweets.clone(),
            self.classifier.clone(),
            self.history.clone(),
            self.predictor.clone(),
        )
    }
}

impl Default for Fakes {
    fn default() -> Self {
        Self::new(
            FakeTweets::default(),
            FakeClassifier::default(),
            FakeHistory::default(),
            FakePredictor::answering(json!({})),
        )
    }
}
