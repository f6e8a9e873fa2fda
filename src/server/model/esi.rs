//! Response payloads from EVE Online's ESI.
//!
//! Only the fields the profile merge engine reads are modelled; everything else ESI sends
//! is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of `POST /universe/ids/`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UniverseIds {
    #[serde(default)]
    pub characters: Vec<IdEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdEntry {
    pub id: i64,
    pub name: String,
}

/// Response of `GET /characters/{character_id}/`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EsiCharacter {
    pub corporation_id: i64,
    #[serde(default)]
    pub alliance_id: Option<i64>,
    #[serde(default)]
    pub security_status: f64,
    pub birthday: DateTime<Utc>,
}

/// Entry of `GET /characters/{character_id}/corporationhistory/`, most recent first
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorporationHistoryEntry {
    pub start_date: DateTime<Utc>,
}

/// Any ESI record only read for its name (corporations, alliances)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamedRecord {
    pub name: String,
}

/// Entry of `POST /universe/names/`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UniverseName {
    pub id: i64,
    pub name: String,
}

/// Response of `GET /killmails/{killmail_id}/{killmail_hash}/`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Killmail {
    pub killmail_time: DateTime<Utc>,
    pub victim: KillParticipant,
    #[serde(default)]
    pub attackers: Vec<KillParticipant>,
}

/// Victim or attacker on a killmail.
///
/// NPCs and structures have no character id, ESI omits the field and it deserializes to 0.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct KillParticipant {
    #[serde(default)]
    pub character_id: i64,
    #[serde(default)]
    pub ship_type_id: i64,
}

/// Response of `GET /status/`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerStatus {
    pub players: i64,
    #[serde(default)]
    pub server_version: Option<String>,
}
