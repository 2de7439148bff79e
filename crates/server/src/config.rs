//! Application configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment
//! variable overrides. The file path defaults to `config.yaml` and can be
//! set with `-f` or `TWEET_PULSE_CONFIG`.
//!
//! ## Loading Priority
//!
//! Later sources override earlier ones:
//!
//! 1. **YAML config file** - base configuration (a missing file is fine)
//! 2. **Prefixed environment** - `TWEET_PULSE_` variables, `__` for nesting,
//!    e.g. `TWEET_PULSE_CLASSIFIER__FAIL_OPEN=false`
//! 3. **Conventional variables** - `TWITTER_BEARER_TOKEN`, `DEBUG`, `DATABASE_URL`
//!
//! `DEBUG=True` selects debug mode (verbose logging); anything else is
//! production mode.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use ml_client::{ClassifierConfig, PredictionConfig};
use sources::{MarketDataConfig, TwitterConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "tweet-pulse-server", about = "Tweet engagement, bot detection and price prediction")]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short = 'f', long, env = "TWEET_PULSE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate the configuration and exit
    #[arg(long)]
    pub validate: bool,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("twitter.bearer_token is required (set TWITTER_BEARER_TOKEN)")]
    MissingBearerToken,

    #[error("twitter.max_results must be between 10 and 100, got {0}")]
    MaxResultsOutOfRange(u8),

    #[error("market_data.window_days must be at least 1")]
    EmptyWindow,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_host")]
    pub host: String,

    #[serde(default = "Config::default_port")]
    pub port: u16,

    /// Debug mode: verbose logging and startup diagnostics
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub debug: bool,

    /// Connection string for the surrounding app scaffolding; unused by the
    /// request pipeline
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default)]
    pub twitter: TwitterConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub market_data: MarketDataConfig,

    #[serde(default)]
    pub prediction: PredictionConfig,
}

impl Config {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        5000
    }

    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("TWEET_PULSE_").ignore(&["CONFIG"]).split("__"))
            .merge(Env::raw().only(&["DEBUG", "DATABASE_URL"]))
            .merge(
                Env::raw()
                    .only(&["TWITTER_BEARER_TOKEN"])
                    .map(|_| "twitter.bearer_token".into()),
            )
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .twitter
            .bearer_token
            .as_deref()
            .is_none_or(|token| token.trim().is_empty())
        {
            return Err(ConfigError::MissingBearerToken);
        }

        if !(10..=100).contains(&self.twitter.max_results) {
            return Err(ConfigError::MaxResultsOutOfRange(self.twitter.max_results));
        }

        if self.market_data.window_days == 0 {
            return Err(ConfigError::EmptyWindow);
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn mode(&self) -> &'static str {
        if self.debug { "Debug" } else { "Production" }
    }
}

/// Accepts real booleans as well as the `True`/`False` strings the `DEBUG`
/// variable is conventionally set to.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!("invalid flag value '{other}'"))),
        },
    }
}
