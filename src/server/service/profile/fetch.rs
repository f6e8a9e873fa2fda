//! The individual upstream fetches of a profile build.
//!
//! Every fetch returns a partial [`ProfileRecord`] holding only the fields it is
//! responsible for, which the caller merges into the accumulated record.

use std::future::Future;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::{
    model::profile::ProfileRecord,
    server::{
        cache::ExpiringCache,
        error::Error,
        model::{esi::EsiCharacter, zkill::ZkillStats},
        service::{
            killmail::{describe_last_kill, KillAnalyzer},
            profile::{phase::PhaseTwoFetch, ProfileService},
        },
        util::{eve::is_npc_corporation, time::age_since},
    },
};

/// Decodes a raw upstream response, fetching and caching it on a miss.
///
/// The response is only cached once it decodes, a malformed body is never served again.
async fn cached_json<T, Fut>(
    cache: &ExpiringCache<String, Bytes>,
    key: String,
    fetch: Fut,
) -> Result<T, Error>
where
    T: DeserializeOwned,
    Fut: Future<Output = Result<Bytes, Error>>,
{
    if let Some(body) = cache.get(&key) {
        return Ok(serde_json::from_slice(&body)?);
    }

    let body = fetch.await?;
    let value = serde_json::from_slice(&body)?;
    cache.set(key, body);

    Ok(value)
}

impl ProfileService {
    /// Character record: age, security status, corporation and alliance.
    pub(super) async fn fetch_character(
        &self,
        character_id: i64,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, Error> {
        let character: EsiCharacter = cached_json(
            &self.inner.caches.esi_responses,
            character_id.to_string(),
            self.inner.esi.character(character_id, token),
        )
        .await?;

        Ok(ProfileRecord {
            age: age_since(character.birthday),
            security: character.security_status,
            corp_id: character.corporation_id,
            is_npc_corp: is_npc_corporation(character.corporation_id),
            alliance_id: character.alliance_id.unwrap_or_default(),
            ..Default::default()
        })
    }

    /// zKillboard statistics: danger and gang ratios, kills and losses.
    pub(super) async fn fetch_killboard_stats(
        &self,
        character_id: i64,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, Error> {
        // zKillboard answers `null` for characters it has never seen
        let stats: Option<ZkillStats> = cached_json(
            &self.inner.caches.zkill_responses,
            character_id.to_string(),
            self.inner.zkill.character_stats(character_id, token),
        )
        .await?;
        let stats = stats.unwrap_or_default();

        Ok(ProfileRecord {
            danger: stats.danger,
            gang: stats.gang,
            kills: stats.kills,
            losses: stats.losses,
            has_killboard: stats.kills != 0 || stats.losses != 0,
            zkill_used: true,
            ..Default::default()
        })
    }

    /// Time since the character joined its current corporation.
    pub(super) async fn fetch_corporation_start(
        &self,
        character_id: i64,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, Error> {
        let history = self
            .inner
            .esi
            .corporation_history(character_id, token)
            .await?;

        let corp_age = history
            .first()
            .map(|entry| age_since(entry.start_date))
            .unwrap_or_default();

        Ok(ProfileRecord {
            corp_age,
            ..Default::default()
        })
    }

    /// Runs one phase two fetch.
    ///
    /// A character without kills is not a failure here; it leaves the fields empty.
    pub(super) async fn fetch_phase_two(
        &self,
        fetch: PhaseTwoFetch,
        record: &ProfileRecord,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, Error> {
        let result = match fetch {
            PhaseTwoFetch::CorporationDanger => {
                self.fetch_corporation_danger(record.corp_id, token).await
            }
            PhaseTwoFetch::AllianceName => {
                self.fetch_alliance_name(record.alliance_id, token).await
            }
            PhaseTwoFetch::CorporationName => {
                self.fetch_corporation_name(record.corp_id, token).await
            }
            PhaseTwoFetch::LastKill => self.fetch_last_kill(record.character_id, token).await,
            PhaseTwoFetch::KillHistory => {
                self.fetch_kill_history(record.character_id, token).await
            }
            PhaseTwoFetch::WeeklyKills => {
                self.fetch_weekly_kills(record.character_id, token).await
            }
        };

        match result {
            Err(Error::NoKills(character_id)) => {
                tracing::debug!(
                    "No kills for character {} during {:?}",
                    character_id,
                    fetch
                );
                Ok(ProfileRecord::default())
            }
            result => result,
        }
    }

    async fn fetch_corporation_danger(
        &self,
        corporation_id: i64,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, Error> {
        let key = corporation_id.to_string();
        let cache = &self.inner.caches.corporation_danger;

        let corp_danger = match cache.get(&key) {
            Some(danger) => danger,
            None => {
                let danger = self
                    .inner
                    .zkill
                    .corporation_stats(corporation_id, token)
                    .await?
                    .danger;
                cache.set(key, danger);
                danger
            }
        };

        Ok(ProfileRecord {
            corp_danger,
            ..Default::default()
        })
    }

    async fn fetch_alliance_name(
        &self,
        alliance_id: i64,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, Error> {
        if alliance_id == 0 {
            return Ok(ProfileRecord::default());
        }

        let alliance_name = self
            .cached_name(alliance_id.to_string(), async {
                let alliance = self.inner.esi.alliance(alliance_id, token).await;
                alliance.map(|alliance| alliance.name)
            })
            .await?;

        Ok(ProfileRecord {
            alliance_name,
            ..Default::default()
        })
    }

    async fn fetch_corporation_name(
        &self,
        corporation_id: i64,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, Error> {
        let corp_name = self
            .cached_name(corporation_id.to_string(), async {
                let corporation = self.inner.esi.corporation(corporation_id, token).await;
                corporation.map(|corporation| corporation.name)
            })
            .await?;

        Ok(ProfileRecord {
            corp_name,
            ..Default::default()
        })
    }

    /// Date and kind of the character's most recent killboard activity.
    async fn fetch_last_kill(
        &self,
        character_id: i64,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, Error> {
        let activity = self.inner.zkill.latest_activity(character_id, token).await?;
        let latest = activity.first().ok_or(Error::NoKills(character_id))?;

        let killmail = self.kill_analyzer().fetch_killmail(latest, token).await?;

        Ok(ProfileRecord {
            last_kill: describe_last_kill(&killmail, character_id),
            ..Default::default()
        })
    }

    async fn fetch_kill_history(
        &self,
        character_id: i64,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, Error> {
        let references = self.inner.zkill.kills(character_id, token).await?;

        let tally = self
            .kill_analyzer()
            .analyze(character_id, &references, token)
            .await?;

        Ok(tally.to_partial())
    }

    async fn fetch_weekly_kills(
        &self,
        character_id: i64,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, Error> {
        let kills_last_week = self
            .inner
            .zkill
            .weekly_kill_count(character_id, token)
            .await?;

        Ok(ProfileRecord {
            kills_last_week: kills_last_week as i64,
            ..Default::default()
        })
    }

    /// Display name of the favorite ship, resolved in phase three.
    pub(super) async fn fetch_ship_name(
        &self,
        ship_type_id: i64,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, Error> {
        let favorite_ship_name = self
            .cached_name(
                format!("ship:{}", ship_type_id),
                self.inner.esi.name(ship_type_id, token),
            )
            .await?;

        Ok(ProfileRecord {
            favorite_ship_name,
            ..Default::default()
        })
    }

    /// Looks up a never-expiring entity name, fetching it on a miss.
    async fn cached_name<Fut>(&self, key: String, fetch: Fut) -> Result<String, Error>
    where
        Fut: Future<Output = Result<String, Error>>,
    {
        let names = &self.inner.caches.names;
        if let Some(name) = names.get(&key) {
            return Ok(name);
        }

        let name = fetch.await?;
        names.set(key, name.clone());

        Ok(name)
    }

    fn kill_analyzer(&self) -> KillAnalyzer<'_> {
        KillAnalyzer::new(
            &self.inner.esi,
            &self.inner.caches.killmails,
            self.inner.settings.killmail_concurrency,
        )
    }
}
