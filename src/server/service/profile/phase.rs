//! Which fetches run in which phase of a profile build.
//!
//! Phase one always runs the character record, killboard stats and corporation start date.
//! Phase two is driven by [`PHASE_TWO_RULES`]: each rule looks at the record as merged so
//! far and decides whether its fetch is worth making. Phase three only resolves the
//! favorite ship's name.

use crate::model::profile::ProfileRecord;

/// A fetch that may run in phase two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTwoFetch {
    CorporationDanger,
    AllianceName,
    CorporationName,
    LastKill,
    KillHistory,
    WeeklyKills,
}

/// Pairs a phase two fetch with the condition under which it runs.
#[derive(Clone, Copy)]
pub struct FetchRule {
    pub fetch: PhaseTwoFetch,
    pub runs_when: fn(&ProfileRecord) -> bool,
}

/// Phase two rules, evaluated against the record after phase one.
pub const PHASE_TWO_RULES: [FetchRule; 6] = [
    FetchRule {
        fetch: PhaseTwoFetch::CorporationDanger,
        runs_when: zkill_used,
    },
    FetchRule {
        fetch: PhaseTwoFetch::AllianceName,
        runs_when: has_alliance,
    },
    FetchRule {
        fetch: PhaseTwoFetch::CorporationName,
        runs_when: always,
    },
    FetchRule {
        fetch: PhaseTwoFetch::LastKill,
        runs_when: has_killboard,
    },
    FetchRule {
        fetch: PhaseTwoFetch::KillHistory,
        runs_when: analyzes_kills,
    },
    FetchRule {
        fetch: PhaseTwoFetch::WeeklyKills,
        runs_when: analyzes_kills,
    },
];

fn zkill_used(record: &ProfileRecord) -> bool {
    record.zkill_used
}

fn has_alliance(record: &ProfileRecord) -> bool {
    record.alliance_id != 0
}

fn always(_: &ProfileRecord) -> bool {
    true
}

fn has_killboard(record: &ProfileRecord) -> bool {
    record.has_killboard
}

fn analyzes_kills(record: &ProfileRecord) -> bool {
    record.analyze_kills && record.kills != 0
}

/// Phase two fetches that apply to `record`, in rule order.
pub fn phase_two_plan(record: &ProfileRecord) -> Vec<PhaseTwoFetch> {
    PHASE_TWO_RULES
        .iter()
        .filter(|rule| (rule.runs_when)(record))
        .map(|rule| rule.fetch)
        .collect()
}

/// Whether phase three should resolve the favorite ship's name.
pub fn wants_ship_name(record: &ProfileRecord, favorite_ship_names: bool) -> bool {
    favorite_ship_names && record.favorite_ship_id != 0
}
