//! HTML pages, rendered with templates bundled into the binary.
//!
//! Templates live in `crates/server/templates/`; names ending in `.html`
//! are auto-escaped, so tweet text and provider output are safe to embed.

use std::sync::LazyLock;

use minijinja::{Environment, context};

use crate::orchestrator::{PredictionOutcome, SearchOutcome};

const BASE: &str = include_str!("../templates/base.html");
const INDEX: &str = include_str!("../templates/index.html");
const RESULTS: &str = include_str!("../templates/results.html");
const PREDICTION: &str = include_str!("../templates/prediction.html");
const ERROR: &str = include_str!("../templates/error.html");

static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    env.set_loader(|name| {
        let source = match name {
            "base.html" => BASE,
            "index.html" => INDEX,
            "results.html" => RESULTS,
            "prediction.html" => PREDICTION,
            "error.html" => ERROR,
            _ => return Ok(None),
        };
        Ok(Some(source.to_string()))
    });
    env
});

/// The query form, optionally with an inline validation message.
pub fn index(query: &str, error: Option<&str>) -> Result<String, minijinja::Error> {
    TEMPLATES
        .get_template("index.html")?
        .render(context! { query, error })
}

pub fn results(outcome: &SearchOutcome) -> Result<String, minijinja::Error> {
    TEMPLATES.get_template("results.html")?.render(context! {
        query => &outcome.query,
        tweets => &outcome.tweets,
        degraded => outcome.degraded,
    })
}

/// The model output is shown verbatim, pretty-printed.
pub fn prediction(outcome: &PredictionOutcome) -> Result<String, minijinja::Error> {
    let prediction = serde_json::to_string_pretty(&outcome.result).unwrap_or_else(|_| outcome.result.0.to_string());
    TEMPLATES.get_template("prediction.html")?.render(context! {
        query => &outcome.query,
        symbol => &outcome.symbol,
        prediction,
        tweets_considered => outcome.tweets_considered,
        bots_excluded => outcome.bots_excluded,
        historical_points => outcome.historical_points,
    })
}

pub fn error_page(message: &str) -> Result<String, minijinja::Error> {
    TEMPLATES.get_template("error.html")?.render(context! { message })
}
