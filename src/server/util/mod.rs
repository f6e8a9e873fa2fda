//! Utility functions and helpers for server operations.
//!
//! This module provides reusable helpers for EVE Online-specific rules (NPC corporations,
//! explorer hulls, nicknames, name list parsing) and for formatting ages and dates the way
//! they're shown in profile records.

pub mod eve;
pub mod time;
