//! Service layer for business logic and orchestration.
//!
//! This module contains the profile merge engine, which coordinates the ESI and zKillboard
//! gateways and the process caches to build character profiles, and the kill history
//! analyzer it uses for killmail based statistics.

pub mod killmail;
pub mod profile;
