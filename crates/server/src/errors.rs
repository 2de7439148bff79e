use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error as ThisError;

use data_model::{PipelineError, ProviderError, ValidationError};

use crate::render;

#[derive(ThisError, Debug)]
pub enum AppError {
    /// Missing or empty query; shown inline on the form
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An external provider failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A bundled template failed to render
    #[error("Failed to render page: {0}")]
    Render(#[from] minijinja::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(e) => AppError::Validation(e),
            PipelineError::Provider(e) => AppError::Provider(e),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Validation problems re-render the form as a normal page
            AppError::Validation(_) => StatusCode::OK,
            AppError::Provider(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::Provider(_) => StatusCode::BAD_GATEWAY,
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, naming the failing stage without
    /// leaking provider responses
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Provider(e) => match e {
                ProviderError::RateLimited { provider } => {
                    format!("The {provider} service is rate limiting us. Please try again in a few minutes.")
                }
                ProviderError::Timeout { provider } => {
                    format!("The {provider} service took too long to respond. Please try again.")
                }
                _ => format!("The {} step failed. Please try again later.", e.provider()),
            },
            AppError::Render(_) => "Internal server error".to_string(),
        }
    }

    fn page(&self) -> Result<String, minijinja::Error> {
        match self {
            AppError::Validation(_) => render::index("", Some(&self.user_message())),
            _ => render::error_page(&self.user_message()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Render(_) => tracing::error!("Internal service error: {:#}", self),
            AppError::Provider(_) => tracing::error!("Provider failure: {}", self),
            AppError::Validation(_) => tracing::debug!("Client error: {}", self),
        }

        let status = self.status_code();
        match self.page() {
            Ok(page) => (status, Html(page)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                (status, self.user_message()).into_response()
            }
        }
    }
}
