use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use data_model::EnrichedTweet;
use server::{Args, Config, Orchestrator, PredictionOutcome, build_orchestrator, telemetry};

/// Tweet Pulse - tweet engagement, bot detection and price prediction
#[derive(Parser)]
#[command(name = "tweet-pulse")]
#[command(about = "Search tweets, flag bots and predict price movement", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short = 'f', long, env = "TWEET_PULSE_CONFIG", default_value = "config.yaml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search recent tweets and score each one
    Search {
        /// Search text, e.g. a coin name
        #[arg(long)]
        query: String,

        /// Number of tweets to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Predict price movement from human engagement and price history
    Predict {
        /// Search text; lower-cased it is also the market-data symbol
        #[arg(long)]
        query: String,
    },

    /// Run the web server
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = Args {
        config: cli.config.clone(),
        validate: false,
    };
    let config = Config::load(&args).context("Failed to load configuration")?;
    telemetry::init_tracing(config.debug)?;

    match cli.command {
        Commands::Search { query, limit } => handle_search(&build_orchestrator(&config)?, &query, limit).await?,
        Commands::Predict { query } => handle_predict(&build_orchestrator(&config)?, &query).await?,
        Commands::Serve => server::serve(config, ctrl_c()).await?,
    }

    Ok(())
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Received Ctrl+C, shutting down gracefully...");
    }
}

/// Handle the 'search' command
async fn handle_search(orchestrator: &Orchestrator, query: &str, limit: usize) -> Result<()> {
    let start = Instant::now();
    let outcome = orchestrator.search(query).await?;

    println!(
        "{}",
        format!("{} tweets for '{}' in {:?}", outcome.tweets.len(), outcome.query, start.elapsed())
            .bold()
            .blue()
    );
    if outcome.degraded {
        println!("{}", "Bot detection unavailable, every account shown as human".yellow());
    }

    for (i, tweet) in outcome.tweets.iter().take(limit).enumerate() {
        print_tweet(i + 1, tweet);
    }
    if outcome.tweets.len() > limit {
        println!("... {} more", outcome.tweets.len() - limit);
    }
    Ok(())
}

/// Handle the 'predict' command
async fn handle_predict(orchestrator: &Orchestrator, query: &str) -> Result<()> {
    let outcome = orchestrator.predict(query).await?;
    print_prediction(&outcome)
}

fn print_tweet(rank: usize, tweet: &EnrichedTweet) {
    let bot = if tweet.is_bot { "BOT".red().bold() } else { "human".green() };
    let sentiment = format!("{:+.2}", tweet.sentiment);
    let sentiment = if tweet.sentiment > 0.0 {
        sentiment.green()
    } else if tweet.sentiment < 0.0 {
        sentiment.red()
    } else {
        sentiment.normal()
    };

    println!(
        "{}. @{} [{}] engagement {:.4} sentiment {}",
        rank.to_string().green(),
        tweet.tweet.author_handle,
        bot,
        tweet.engagement,
        sentiment
    );
    println!("   {}", truncate(&tweet.tweet.text, 100));
}

fn print_prediction(outcome: &PredictionOutcome) -> Result<()> {
    println!("{}", format!("Prediction for '{}':", outcome.query).bold().blue());
    println!(
        "{}{} tweets considered, {} from bots excluded",
        "• ".cyan(),
        outcome.tweets_considered,
        outcome.bots_excluded
    );
    println!(
        "{}{} price points for {}",
        "• ".cyan(),
        outcome.historical_points,
        outcome.symbol
    );
    println!("{}", serde_json::to_string_pretty(&outcome.result)?);
    Ok(())
}

/// Shorten to `max` characters on a char boundary, single line.
fn truncate(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let mut short: String = flat.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}
