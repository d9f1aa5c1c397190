//! # error
//!
//! Centralised error types.
//!
//! * [`AppError`] — the only failures that reach the webhook caller.  Axum's
//!   `IntoResponse` impl turns them into `{ "ok": false, "error": ... }` bodies.
//! * [`UpstreamError`] — failures of outbound collaborators (price sources,
//!   CryptoPanic, Telegram, sheet).  These never leave the pipeline: each
//!   consumer absorbs them into a fallback value or a log line.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The body could not even be read as JSON.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A required field is missing or could not be coerced.
    #[error("Malformed signal: invalid field '{field}'")]
    MalformedSignal { field: &'static str },

    /// `|ob_high - ob_low| + 2 * atr` is exactly zero.
    #[error("Risk unit is zero: order-block range and ATR are both 0")]
    ZeroRisk,

    /// Catch-all for unexpected failures.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_)
            | AppError::MalformedSignal { .. }
            | AppError::ZeroRisk => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::MalformedSignal { field } => json!({
                "ok":    false,
                "error": self.to_string(),
                "field": field,
            }),
            AppError::ZeroRisk => json!({
                "ok":    false,
                "error": "R=0",
                "message": self.to_string(),
            }),
            _ => json!({
                "ok":    false,
                "error": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Failure of a single outbound call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport or decode failure, URL stripped (it can carry credentials).
    #[error("request failed: {0}")]
    Http(reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("unexpected payload: {0}")]
    Payload(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        UpstreamError::Http(e.without_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::MalformedSignal { field: "atr" }.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::ZeroRisk.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::BadRequest("not json".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
