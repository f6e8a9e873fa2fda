//! Shared test harness for sclh.
//!
//! [`TestSetup`] owns a mockito server standing in for both upstreams: ESI is served under
//! `/esi/` and zKillboard under `/zkill/`. Fixture factories build upstream JSON payloads
//! and the `create_*_endpoint` helpers register them as mocks with an expected call count.
//!
//! This crate doesn't depend on `sclh` so it can be a dev-dependency of it.

pub mod constant;
pub mod fixtures;
pub mod setup;

pub use setup::TestSetup;

pub mod prelude {
    pub use crate::{
        constant::*,
        fixtures::{esi::factory as esi_factory, zkill::factory as zkill_factory},
        TestSetup,
    };
}
