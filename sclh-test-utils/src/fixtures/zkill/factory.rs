use serde_json::{json, Value};

use crate::constant::TEST_KILLMAIL_HASH;

/// Create zKillboard statistics for a character or corporation.
///
/// # Arguments
/// - `danger` - `dangerRatio`
/// - `gang` - `gangRatio`
/// - `kills` - `shipsDestroyed`
/// - `losses` - `shipsLost`
pub fn mock_stats(danger: i64, gang: i64, kills: i64, losses: i64) -> Value {
    json!({
        "dangerRatio": danger,
        "gangRatio": gang,
        "shipsDestroyed": kills,
        "shipsLost": losses,
        "soloKills": 0,
        "iskDestroyed": 0
    })
}

/// Create a kill list referencing the given killmail ids, all hashed [`TEST_KILLMAIL_HASH`].
pub fn mock_kill_references(killmail_ids: &[i64]) -> Value {
    let references: Vec<Value> = killmail_ids
        .iter()
        .map(|killmail_id| {
            json!({
                "killmail_id": killmail_id,
                "zkb": {
                    "hash": TEST_KILLMAIL_HASH,
                    "totalValue": 10_000_000.0,
                    "points": 1
                }
            })
        })
        .collect();

    Value::Array(references)
}
