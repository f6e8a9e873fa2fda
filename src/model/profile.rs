use serde::{Deserialize, Serialize};

/// Aggregated intel on one character, one line of the batch stream.
///
/// A record starts out with only the requested name and is filled in by merging partial
/// records produced by the individual upstream fetches. See [`ProfileRecord::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProfileRecord {
    pub name: String,
    pub character_id: i64,
    pub security: f64,
    /// Character age, e.g. `"5y3m12d"` or `"today"`
    pub age: String,
    pub danger: i64,
    pub gang: i64,
    pub kills: i64,
    pub losses: i64,
    pub has_killboard: bool,
    /// Date and kind of the most recent killboard activity, e.g. `"2024-05-01 (loss)"`
    pub last_kill: String,
    pub corp_name: String,
    pub corp_id: i64,
    /// Time since the character joined its current corporation
    pub corp_age: String,
    pub is_npc_corp: bool,
    pub corp_danger: i64,
    pub alliance_id: i64,
    pub alliance_name: String,
    pub recent_explorer_total: i64,
    pub recent_kill_total: i64,
    pub last_kill_time: String,
    pub kills_last_week: i64,
    pub favorite_ship_id: i64,
    pub favorite_ship_count: i64,
    pub favorite_ship_name: String,
    pub zkill_used: bool,
    pub analyze_kills: bool,
}

fn is_zero<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

macro_rules! fill_empty {
    ($target:ident, $source:ident, $($field:ident),+ $(,)?) => {
        $(
            if is_zero(&$target.$field) {
                $target.$field = $source.$field.clone();
            }
        )+
    };
}

impl ProfileRecord {
    /// Creates an empty record for a requested character name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Copies every field of `partial` into `self` that `self` still holds at its zero value.
    ///
    /// Fields already set are never overwritten, so merging the same partial twice, or
    /// merging partials in any order when they set disjoint fields, gives the same record.
    pub fn merge(&mut self, partial: &ProfileRecord) {
        fill_empty!(
            self,
            partial,
            name,
            character_id,
            security,
            age,
            danger,
            gang,
            kills,
            losses,
            has_killboard,
            last_kill,
            corp_name,
            corp_id,
            corp_age,
            is_npc_corp,
            corp_danger,
            alliance_id,
            alliance_name,
            recent_explorer_total,
            recent_kill_total,
            last_kill_time,
            kills_last_week,
            favorite_ship_id,
            favorite_ship_count,
            favorite_ship_name,
            zkill_used,
            analyze_kills,
        );
    }
}
