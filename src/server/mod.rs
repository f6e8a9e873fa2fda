//! Server application core modules.
//!
//! This module contains the server side of sclh: configuration, upstream gateways to ESI
//! and zKillboard, the process caches and request coalescer, the profile merge engine, the
//! batch worker pool and the HTTP layer streaming profiles to clients.

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod model;
pub mod router;
pub mod service;
pub mod startup;
pub mod util;
pub mod worker;
