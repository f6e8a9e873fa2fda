use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

/// Failure talking to ESI or zKillboard.
///
/// Carries the request path so callers and logs can tell which endpoint failed, and the
/// status code so "not found" style answers can be told apart from outages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("HTTP error {status} - {path}")]
    Status { status: u16, path: String },
    #[error("Request to {path} failed: {reason}")]
    Transport { path: String, reason: String },
    #[error("Unexpected response from {path}: {reason}")]
    UnexpectedResponse { path: String, reason: String },
}

impl UpstreamError {
    /// HTTP status returned by the upstream, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        tracing::warn!("Upstream error: {}", self);

        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorDto {
                error: "Upstream service unavailable".to_string(),
            }),
        )
            .into_response()
    }
}
