use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use questions::ValidationError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Content-Type must be application/json")]
    InvalidContentType,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    InvalidSubmission(#[from] ValidationError),

    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after: u64 },

    #[error("Not found")]
    NotFound,

    #[error("Storage unavailable: {0}")]
    StoreUnavailable(StoreError),

    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        if e.is_unavailable() {
            AppError::StoreUnavailable(e)
        } else {
            AppError::Storage(e)
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidContentType
            | AppError::MalformedPayload(_)
            | AppError::InvalidSubmission(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            AppError::InvalidContentType => "Invalid content type",
            AppError::MalformedPayload(_) | AppError::InvalidSubmission(_) => "Bad Request",
            AppError::RateLimited { .. } => "Rate limit exceeded",
            AppError::NotFound => "Not Found",
            AppError::StoreUnavailable(_) => "Service Unavailable",
            AppError::Storage(_) => "Internal server error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::StoreUnavailable(e) | AppError::Storage(e) => {
                error!("{e}");
                "Error processing your request".to_string()
            }
            AppError::NotFound => "The requested resource was not found".to_string(),
            other => other.to_string(),
        };

        let mut body = json!({
            "error": self.title(),
            "message": message,
        });

        if let AppError::RateLimited { retry_after } = self {
            body["retry_after"] = json!(retry_after);

            let mut response = (status, Json(body)).into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));

            return response;
        }

        (status, Json(body)).into_response()
    }
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}
