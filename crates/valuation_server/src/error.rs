//! HTTP error mapping
//!
//! Every failed request answers with the same JSON body:
//!
//! ```json
//! { "error": "model_divergence", "field": "wacc", "message": "..." }
//! ```
//!
//! Engine validation errors and malformed input map to 400, other engine
//! errors to 422 and unknown tickers to 404.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use valuation_core::ValuationError;

/// Request-level failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected by an engine
    #[error(transparent)]
    Valuation(#[from] ValuationError),

    /// The fundamentals source has no data for the ticker
    #[error("No fundamentals available for ticker {ticker}")]
    UpstreamData { ticker: String },

    /// Query string or body could not be decoded
    #[error("{message}")]
    BadRequest { message: String },
}

/// Error body returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Valuation(ValuationError::Validation { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Valuation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UpstreamData { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Valuation(err) => err.kind(),
            ApiError::UpstreamData { .. } => "upstream_data_error",
            ApiError::BadRequest { .. } => "bad_request",
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            ApiError::Valuation(err) => Some(err.field()),
            ApiError::UpstreamData { .. } => Some("ticker"),
            ApiError::BadRequest { .. } => None,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.kind().to_string(),
            field: self.field().map(str::to_string),
            message: self.to_string(),
        };

        tracing::warn!(
            status = status.as_u16(),
            error = %body.error,
            field = body.field.as_deref().unwrap_or("-"),
            message = %body.message,
            "Request rejected"
        );

        (status, Json(body)).into_response()
    }
}
