//! Upstream payload factories and mock endpoint creation.
//!
//! - `esi` - characters, corporations, alliances, killmails and name lookups
//! - `zkill` - killboard statistics and kill lists

pub mod esi;
pub mod zkill;
