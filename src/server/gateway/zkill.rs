use bytes::Bytes;
use serde::de::IgnoredAny;
use tokio_util::sync::CancellationToken;

use crate::server::{
    error::Error,
    gateway::HttpGateway,
    model::zkill::{KillReference, ZkillStats},
};

/// Seconds in a week, the window counted by [`ZkillGateway::weekly_kill_count`]
pub const WEEK_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Gateway to the zKillboard API.
///
/// zKillboard is read-only, only GET requests are exposed.
#[derive(Debug, Clone)]
pub struct ZkillGateway {
    http: HttpGateway,
}

impl ZkillGateway {
    pub fn new(http: HttpGateway) -> Self {
        Self { http }
    }

    pub async fn get(&self, path: &str, token: &CancellationToken) -> Result<Bytes, Error> {
        self.http.get(path, &[], token).await
    }

    /// Raw character statistics, cached verbatim by the caller.
    pub async fn character_stats(
        &self,
        character_id: i64,
        token: &CancellationToken,
    ) -> Result<Bytes, Error> {
        self.get(&format!("stats/characterID/{}/", character_id), token)
            .await
    }

    pub async fn corporation_stats(
        &self,
        corporation_id: i64,
        token: &CancellationToken,
    ) -> Result<ZkillStats, Error> {
        self.http
            .get_json(&format!("stats/corporationID/{}/", corporation_id), &[], token)
            .await
    }

    /// Most recent killboard activity (kills and losses), newest first.
    pub async fn latest_activity(
        &self,
        character_id: i64,
        token: &CancellationToken,
    ) -> Result<Vec<KillReference>, Error> {
        self.http
            .get_json(&format!("characterID/{}/", character_id), &[], token)
            .await
    }

    /// Recent kills only, no losses.
    pub async fn kills(
        &self,
        character_id: i64,
        token: &CancellationToken,
    ) -> Result<Vec<KillReference>, Error> {
        self.http
            .get_json(&format!("kills/characterID/{}/", character_id), &[], token)
            .await
    }

    /// Number of kills within the last week.
    ///
    /// Only the array length matters, entries are skipped without being decoded.
    pub async fn weekly_kill_count(
        &self,
        character_id: i64,
        token: &CancellationToken,
    ) -> Result<usize, Error> {
        let entries: Vec<IgnoredAny> = self
            .http
            .get_json(
                &format!(
                    "kills/characterID/{}/pastSeconds/{}/",
                    character_id, WEEK_SECONDS
                ),
                &[],
                token,
            )
            .await?;

        Ok(entries.len())
    }
}
