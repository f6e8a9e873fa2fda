//! Server application models and type definitions.
//!
//! This module contains the shared application state handed to HTTP handlers and the
//! response payloads of the two upstream APIs (EVE ESI and zKillboard).

pub mod app;
pub mod esi;
pub mod zkill;
