//! Profile merge engine.
//!
//! Builds a [`ProfileRecord`] for one character name in phases. Every phase runs its
//! fetches concurrently and waits for all of them before the next phase starts, because the
//! later fetches are keyed on ids (corporation, alliance, favorite ship) or gated on values
//! (kills, losses) the earlier ones produce. Each fetch yields a partial record that is
//! merged into the accumulated record with fill-empty semantics.

mod fetch;
pub mod phase;

use std::sync::Arc;

use futures::future::try_join_all;
use tokio_util::sync::CancellationToken;

use crate::{
    model::profile::ProfileRecord,
    server::{
        cache::ProfileCaches,
        config::Config,
        error::{Error, ProfileError},
        gateway::{EsiGateway, ZkillGateway},
        util::eve::{nickname, ESI_IDS_REQUEST_LIMIT},
    },
};

/// Feature switches and limits for profile builds.
#[derive(Debug, Clone, Copy)]
pub struct ProfileSettings {
    /// Analyze each character's recent kills and count last week's kills
    pub analyze_kills: bool,
    /// Resolve the display name of each character's most flown ship
    pub favorite_ship_names: bool,
    /// Max killmails fetched at once by a single kill history analysis
    pub killmail_concurrency: usize,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ProfileSettings {
    fn from(config: &Config) -> Self {
        Self {
            analyze_kills: config.analyze_kills,
            favorite_ship_names: config.favorite_ship_names,
            killmail_concurrency: config.killmail_concurrency,
        }
    }
}

/// Builds character profiles from ESI and zKillboard.
///
/// Cheap to clone, every clone shares the same gateways and caches.
#[derive(Clone)]
pub struct ProfileService {
    inner: Arc<ProfileServiceRef>,
}

struct ProfileServiceRef {
    esi: EsiGateway,
    zkill: ZkillGateway,
    caches: ProfileCaches,
    settings: ProfileSettings,
}

impl ProfileService {
    /// Creates a new instance of [`ProfileService`]
    pub fn new(
        esi: EsiGateway,
        zkill: ZkillGateway,
        caches: ProfileCaches,
        settings: ProfileSettings,
    ) -> Self {
        Self {
            inner: Arc::new(ProfileServiceRef {
                esi,
                zkill,
                caches,
                settings,
            }),
        }
    }

    pub fn caches(&self) -> &ProfileCaches {
        &self.inner.caches
    }

    /// Resolves a character name to its id, from cache when possible.
    ///
    /// ESI matches names case-insensitively and may answer with several characters; only
    /// an entry whose name equals `name` ignoring ASCII case is accepted. Resolved ids are
    /// cached forever under the name as requested.
    ///
    /// # Returns
    /// - `Ok(i64)` - Character id
    /// - `Err(Error::NotFound)` - ESI knows no character by that name
    /// - `Err(Error::UpstreamError)` - ESI request failed
    pub async fn resolve_character_id(
        &self,
        name: &str,
        token: &CancellationToken,
    ) -> Result<i64, Error> {
        let character_ids = &self.inner.caches.character_ids;
        if let Some(id) = character_ids.get(name) {
            return Ok(id);
        }

        let ids = self
            .inner
            .esi
            .character_ids(&[name.to_string()], token)
            .await?;

        let id = ids
            .characters
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .map(|entry| entry.id)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        character_ids.set(name.to_string(), id);

        Ok(id)
    }

    /// Resolves every not yet cached name in bulk, ahead of the individual profile builds.
    ///
    /// Names ESI doesn't know are left unresolved; their profile builds will look them up
    /// again and fail with [`Error::NotFound`].
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of names newly resolved
    /// - `Err(Error)` - A bulk request failed, names resolved by earlier chunks stay cached
    pub async fn preload_character_ids(
        &self,
        names: &[String],
        token: &CancellationToken,
    ) -> Result<usize, Error> {
        let character_ids = &self.inner.caches.character_ids;
        let missing: Vec<String> = names
            .iter()
            .filter(|name| character_ids.get(name.as_str()).is_none())
            .cloned()
            .collect();

        let mut resolved = 0;
        for chunk in missing.chunks(ESI_IDS_REQUEST_LIMIT) {
            let ids = self.inner.esi.character_ids(chunk, token).await?;

            for name in chunk {
                if let Some(entry) = ids
                    .characters
                    .iter()
                    .find(|entry| entry.name.eq_ignore_ascii_case(name))
                {
                    character_ids.set(name.clone(), entry.id);
                    resolved += 1;
                }
            }
        }

        Ok(resolved)
    }

    /// Builds the complete profile for one character.
    ///
    /// # Arguments
    /// - `name` - Character name as requested
    /// - `token` - Cancels every outstanding upstream request of this build
    ///
    /// # Returns
    /// - `Ok(ProfileRecord)` - Merged profile, with a nickname applied where one exists
    /// - `Err(ProfileError)` - Any hard failure, tagged with `name`
    pub async fn build_profile(
        &self,
        name: &str,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, ProfileError> {
        self.assemble(name, token)
            .await
            .map_err(|e| ProfileError::new(name, e))
    }

    async fn assemble(
        &self,
        name: &str,
        token: &CancellationToken,
    ) -> Result<ProfileRecord, Error> {
        let settings = self.inner.settings;

        let mut record = ProfileRecord::named(name);
        record.character_id = self.resolve_character_id(name, token).await?;
        record.analyze_kills = settings.analyze_kills;

        let character_id = record.character_id;
        let (character, killboard, corporation_start) = tokio::try_join!(
            self.fetch_character(character_id, token),
            self.fetch_killboard_stats(character_id, token),
            self.fetch_corporation_start(character_id, token),
        )?;
        for partial in [&character, &killboard, &corporation_start] {
            record.merge(partial);
        }

        let plan = phase::phase_two_plan(&record);
        let partials = try_join_all(
            plan.iter()
                .map(|&fetch| self.fetch_phase_two(fetch, &record, token)),
        )
        .await?;
        for partial in &partials {
            record.merge(partial);
        }

        if phase::wants_ship_name(&record, settings.favorite_ship_names) {
            let partial = self.fetch_ship_name(record.favorite_ship_id, token).await?;
            record.merge(&partial);
        }

        if let Some(nickname) = nickname(name) {
            record.name = nickname.to_string();
        }

        tracing::debug!("Built profile for {} ({})", name, character_id);

        Ok(record)
    }
}
