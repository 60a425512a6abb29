use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;
use thiserror::Error;

/// Errors that can occur while relaying or scraping
#[derive(Error, Debug)]
pub enum RelayError {
    /// Failed to fetch the recipe page
    #[error("Failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    /// Input could not be read as an HTML document at all
    #[error("Failed to parse HTML: {0}")]
    ParseError(String),

    /// A configured extraction rule is not a valid CSS selector
    #[error("Invalid selector for {field}: {selector}")]
    InvalidSelector { field: &'static str, selector: String },

    /// Request body is missing required data
    #[error("{0}")]
    Validation(String),

    /// The notification provider refused or failed the delivery
    #[error("Delivery failed: {0}")]
    DeliveryError(String),

    /// The identity provider rejected the call
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// The token registry could not be queried
    #[error("Token registry error: {0}")]
    TokenRegistryError(String),

    /// Error building HTTP headers
    #[error("Header parse error: {0}")]
    HeaderError(#[from] reqwest::header::InvalidHeaderValue),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl RelayError {
    /// Short, client-facing category of the failure
    fn category(&self) -> &'static str {
        match self {
            RelayError::FetchError(_) | RelayError::UpstreamStatus { .. } => {
                "Failed to fetch recipe page"
            }
            RelayError::ParseError(_) | RelayError::InvalidSelector { .. } => {
                "Failed to scrape recipe"
            }
            RelayError::DeliveryError(_) => "Failed to send notification",
            RelayError::AuthError(_) => "Authentication failed",
            RelayError::TokenRegistryError(_) => "Failed to look up token",
            RelayError::Validation(_) => "Invalid request",
            RelayError::HeaderError(_) | RelayError::ConfigError(_) => "Internal server error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::AuthError(_) => StatusCode::UNAUTHORIZED,
            RelayError::FetchError(_)
            | RelayError::UpstreamStatus { .. }
            | RelayError::DeliveryError(_)
            | RelayError::TokenRegistryError(_) => StatusCode::BAD_GATEWAY,
            RelayError::ParseError(_)
            | RelayError::InvalidSelector { .. }
            | RelayError::HeaderError(_)
            | RelayError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            RelayError::Validation(message) => json!({ "error": message }),
            other => {
                error!("{}: {}", other.category(), other);
                json!({ "error": other.category(), "details": other.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}
