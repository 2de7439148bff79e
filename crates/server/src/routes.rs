//! HTTP routes: the query form, search and prediction pages.

use axum::{
    Form, Router,
    extract::{State, rejection::FormRejection},
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use data_model::ValidationError;

use crate::errors::AppError;
use crate::orchestrator::Orchestrator;
use crate::render;

/// Shared handler state; the orchestrator is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }
}

/// Form body for `/search` and `/predict`. A missing field is treated
/// like an empty one.
#[derive(Debug, Deserialize)]
pub struct QueryForm {
    #[serde(default)]
    pub query: Option<String>,
}

impl QueryForm {
    /// The submitted query text. A body that is not a form at all (missing,
    /// wrong content type, undecodable) counts as a missing query.
    fn read(form: Result<Form<QueryForm>, FormRejection>) -> Result<String, AppError> {
        match form {
            Ok(Form(form)) => Ok(form.query.unwrap_or_default()),
            Err(rejection) => {
                tracing::debug!("Unreadable query form: {}", rejection);
                Err(ValidationError::EmptyQuery.into())
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", post(search))
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

async fn index() -> Result<Html<String>, AppError> {
    Ok(Html(render::index("", None)?))
}

async fn search(
    State(state): State<AppState>,
    form: Result<Form<QueryForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let query = QueryForm::read(form)?;
    let outcome = state.orchestrator.search(&query).await?;
    Ok(Html(render::results(&outcome)?))
}

async fn predict(
    State(state): State<AppState>,
    form: Result<Form<QueryForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let query = QueryForm::read(form)?;
    let outcome = state.orchestrator.predict(&query).await?;
    Ok(Html(render::prediction(&outcome)?))
}

async fn healthz() -> &'static str {
    "OK"
}
