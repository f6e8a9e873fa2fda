use serde_json::{json, Value};

use crate::constant::{TEST_BIRTHDAY, TEST_CORPORATION_ID};

/// Create a mock ESI character.
///
/// # Arguments
/// - `name` - Character name
/// - `corporation_id` - Current corporation
/// - `alliance_id` - Current alliance, left out of the payload when `None`
///
/// # Returns
/// - `Value` - `GET /characters/{id}/` payload born on [`TEST_BIRTHDAY`]
pub fn mock_character(name: &str, corporation_id: i64, alliance_id: Option<i64>) -> Value {
    let mut character = json!({
        "name": name,
        "corporation_id": corporation_id,
        "security_status": 1.5,
        "birthday": TEST_BIRTHDAY,
        "gender": "female",
        "race_id": 1,
        "bloodline_id": 1
    });

    if let Some(alliance_id) = alliance_id {
        character["alliance_id"] = json!(alliance_id);
    }

    character
}

/// Create a corporation history holding a single membership since `start_date`.
pub fn mock_corporation_history(corporation_id: i64, start_date: &str) -> Value {
    json!([
        { "corporation_id": corporation_id, "record_id": 2, "start_date": start_date },
        { "corporation_id": 1_000_167, "record_id": 1, "start_date": TEST_BIRTHDAY }
    ])
}

/// Create a corporation or alliance payload carrying only what sclh reads.
pub fn mock_named(name: &str) -> Value {
    json!({ "name": name, "ticker": "TEST" })
}

/// Create a `POST /universe/ids/` response for the given `(id, name)` characters.
pub fn mock_universe_ids(characters: &[(i64, &str)]) -> Value {
    let characters: Vec<Value> = characters
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();

    json!({ "characters": characters })
}

/// Create a `POST /universe/names/` response naming a single inventory type.
pub fn mock_type_name(type_id: i64, name: &str) -> Value {
    json!([{ "id": type_id, "name": name, "category": "inventory_type" }])
}

/// Create a killmail.
///
/// # Arguments
/// - `killmail_time` - RFC 3339 timestamp of the kill
/// - `victim_ship_type_id` - Ship the victim lost
/// - `attackers` - `(character_id, ship_type_id)` of every attacker
///
/// # Returns
/// - `Value` - `GET /killmails/{id}/{hash}/` payload, victim in [`TEST_CORPORATION_ID`]
pub fn mock_killmail(
    killmail_time: &str,
    victim_ship_type_id: i64,
    attackers: &[(i64, i64)],
) -> Value {
    let attackers: Vec<Value> = attackers
        .iter()
        .map(|(character_id, ship_type_id)| {
            json!({
                "character_id": character_id,
                "corporation_id": TEST_CORPORATION_ID,
                "ship_type_id": ship_type_id,
                "final_blow": false,
                "damage_done": 100
            })
        })
        .collect();

    json!({
        "killmail_id": 1,
        "killmail_time": killmail_time,
        "solar_system_id": 30000142,
        "victim": {
            "character_id": 90_000_001,
            "corporation_id": TEST_CORPORATION_ID,
            "ship_type_id": victim_ship_type_id,
            "damage_taken": 100
        },
        "attackers": attackers
    })
}

/// Create a `GET /status/` payload.
pub fn mock_server_status(players: i64) -> Value {
    json!({
        "players": players,
        "server_version": "2345678",
        "start_time": "2026-10-16T11:00:00Z"
    })
}
