//! Error types for the sclh server application.
//!
//! This module provides the error taxonomy shared by the gateways, caches, profile merge
//! engine, and HTTP controllers. Domain-specific errors (configuration, upstream HTTP) live in
//! their own submodules and are aggregated into [`Error`] via `thiserror`'s `#[from]`. All
//! errors implement `IntoResponse` for Axum HTTP responses.
//!
//! [`Error`] is `Clone` because the in-flight request coalescer publishes one result to every
//! caller waiting on the same key.

pub mod config;
pub mod retry;
pub mod upstream;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{
    model::api::ErrorDto,
    server::error::{config::ConfigError, upstream::UpstreamError},
};

/// Main error type for the sclh server application.
///
/// # Error Categories
/// - Lookup errors (character name not found, character has no kills)
/// - Upstream errors (non-200 status or transport failure from ESI / zKillboard)
/// - Decode errors (malformed JSON from an upstream)
/// - Cancellation (the request that owns the work went away)
/// - Configuration errors (invalid environment variables)
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Character name did not resolve to an id.
    #[error("Character '{0}' not found")]
    NotFound(String),
    /// Character has no kills listed on zKillboard.
    ///
    /// Only terminal for kill history lookups, the profile itself still completes.
    #[error("No kills found for character ID {0}")]
    NoKills(i64),
    /// Upstream API returned a non-200 status or the request failed in transit.
    #[error(transparent)]
    UpstreamError(#[from] UpstreamError),
    /// Upstream API returned JSON that doesn't match the expected shape.
    #[error("Failed to decode upstream response: {0}")]
    DecodeError(String),
    /// The operation was cancelled before it could complete.
    #[error("Operation cancelled")]
    Cancelled,
    /// Configuration error (invalid environment variables).
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// Internal error indicating a bug in sclh's code.
    #[error("Internal error, this indicates a bug: {0:?}")]
    InternalError(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }
}

impl Error {
    /// Returns `true` if the error is the result of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A failure to build one character's profile, tagged with the character name.
#[derive(Error, Debug, Clone)]
#[error("Failed to build profile for '{name}': {source}")]
pub struct ProfileError {
    /// Character name as it was requested.
    pub name: String,
    /// Underlying cause.
    #[source]
    pub source: Error,
}

impl ProfileError {
    pub fn new(name: impl Into<String>, source: Error) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// Converts application errors into HTTP responses.
///
/// # Returns
/// - 404 Not Found - Character name did not resolve
/// - 502 Bad Gateway - Upstream API failures
/// - 500 Internal Server Error - For all other errors (with error logging)
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(name) => {
                tracing::debug!("Character not found: {}", name);

                (
                    StatusCode::NOT_FOUND,
                    Json(ErrorDto {
                        error: format!("Character '{}' not found", name),
                    }),
                )
                    .into_response()
            }
            Self::UpstreamError(err) => err.into_response(),
            Self::ConfigError(err) => err.into_response(),
            err => InternalServerError(err).into_response(),
        }
    }
}

/// Wrapper type for converting any displayable error into a 500 Internal Server Error response.
///
/// Logs the error message and returns a generic "Internal server error" message to the
/// client to avoid leaking implementation details.
pub struct InternalServerError<E>(pub E);

impl<E: std::fmt::Display> IntoResponse for InternalServerError<E> {
    fn into_response(self) -> Response {
        tracing::error!("{}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDto {
                error: "Internal server error".to_string(),
            }),
        )
            .into_response()
    }
}
