//! Response payloads from the zKillboard API.

use serde::{Deserialize, Serialize};

/// Response of `GET /stats/characterID/{id}/` and `GET /stats/corporationID/{id}/`
///
/// zKillboard leaves out counters an entity has never accumulated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ZkillStats {
    #[serde(rename = "dangerRatio", default)]
    pub danger: i64,
    #[serde(rename = "gangRatio", default)]
    pub gang: i64,
    #[serde(rename = "shipsDestroyed", default)]
    pub kills: i64,
    #[serde(rename = "shipsLost", default)]
    pub losses: i64,
}

/// Entry of zKillboard's kill list endpoints, a pointer to a killmail on ESI
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KillReference {
    pub killmail_id: i64,
    pub zkb: KillReferenceInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KillReferenceInfo {
    pub hash: String,
}

impl KillReference {
    /// Key used to cache and coalesce the referenced killmail
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.killmail_id, self.zkb.hash)
    }
}
