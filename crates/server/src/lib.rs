//! Server crate for Tweet Pulse.
//!
//! This crate wires the provider clients into the request orchestrator and
//! exposes it over HTTP, plus the configuration and logging setup shared by
//! both binaries.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{debug, info};

use ml_client::{BotSentinelClient, PredictionClient};
use sources::{CoinGeckoClient, TwitterClient};

pub mod config;
pub mod errors;
pub mod orchestrator;
pub mod render;
pub mod routes;
pub mod telemetry;

#[cfg(test)]
mod test_utils;

pub use config::{Args, Config};
pub use errors::AppError;
pub use orchestrator::{ClassifierPolicy, Orchestrator, PredictionOutcome, SearchOutcome};
pub use routes::{AppState, router};

/// Build the orchestrator over the real HTTP providers.
pub fn build_orchestrator(config: &Config) -> anyhow::Result<Orchestrator> {
    let token = config
        .twitter
        .bearer_token
        .clone()
        .context("twitter.bearer_token is not set")?;

    let tweets = TwitterClient::new(&config.twitter, token).context("Failed to build tweet search client")?;
    let classifier = BotSentinelClient::new(&config.classifier).context("Failed to build bot classifier client")?;
    let history = CoinGeckoClient::new(&config.market_data).context("Failed to build market data client")?;
    let predictor = PredictionClient::new(&config.prediction).context("Failed to build prediction client")?;
    debug!("Prediction endpoint: {}", predictor.endpoint());

    Ok(Orchestrator::new(
        Arc::new(tweets),
        Arc::new(classifier),
        Arc::new(history),
        Arc::new(predictor),
    )
    .with_policy(ClassifierPolicy {
        fail_open: config.classifier.fail_open,
    })
    .with_window_days(config.market_data.window_days))
}

/// Serve the web app until `shutdown` resolves.
pub async fn serve<F>(config: Config, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Starting Tweet Pulse in {} mode", config.mode());
    let orchestrator = build_orchestrator(&config)?;
    if config.debug {
        debug!("Database URL: {:?}", config.database_url);
        debug!(
            "Classifier policy: {:?}, history window: {} days",
            orchestrator.policy(),
            config.market_data.window_days
        );
    }
    let app = router(AppState::new(orchestrator));

    let bind_addr = config.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!(
        "Tweet Pulse listening on http://{}, available at http://localhost:{}",
        bind_addr, config.port
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    info!("Server stopped");
    Ok(())
}
