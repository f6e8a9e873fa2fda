//! sclh streams aggregated EVE Online character intel.
//!
//! Character names posted to the server are resolved through EVE's ESI, enriched with
//! zKillboard statistics and streamed back as newline-delimited JSON records as soon as each
//! one is complete.

pub mod model;
pub mod server;
