//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Every error the gateway itself originates (as opposed to responses relayed
//! from the upstream renderer) uses the same JSON body. Internal error details
//! are never exposed.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upstream::MAX_BODY_BYTES;

/// Seconds a client should wait before retrying after a provider outage.
pub const RETRY_AFTER_SECS: u64 = 5;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_GATEWAY").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    /// A 413 carries `{"limit_bytes": …}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Nothing serves this path (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request body exceeds the forwarding limit (413).
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// The upstream renderer could not be reached (502).
    #[error("bad gateway: {0}")]
    BadGateway(String),

    /// The session provider failed on a session-sensitive path (503).
    /// The message is logged but not returned to the client.
    #[error("session provider unavailable: {0}")]
    SessionUnavailable(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::BadGateway(_) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY"),
            Self::SessionUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SESSION_PROVIDER_UNAVAILABLE")
            }
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Structured details for the client, if this error has any.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::PayloadTooLarge(_) => Some(serde_json::json!({ "limit_bytes": MAX_BODY_BYTES })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let details = self.details();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::SessionUnavailable(_) => {
                "Sign-in service is temporarily unavailable, please retry".to_string()
            }
            Self::BadGateway(_) => "The storefront is temporarily unreachable".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::BadGateway(_) => tracing::error!(error = %self, "upstream forwarding failed"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, Self::SessionUnavailable(_)) {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(RETRY_AFTER_SECS),
            );
        }
        response
    }
}
