//! HTTP controller endpoints for the sclh web API.
//!
//! This module contains Axum handlers for the batch profile stream and the health check.
//! Controllers parse request inputs, hand work to the batch pool and shape the HTTP
//! response. They use utoipa for OpenAPI documentation.

pub mod health;
pub mod info;
