//! Payloads exchanged with HTTP clients.

pub mod api;
pub mod profile;
pub mod stream;
