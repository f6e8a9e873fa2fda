use std::{sync::Arc, time::Duration};

use bytes::Bytes;

use crate::server::{
    cache::{Expiry, ExpiringCache, RequestCoalescer},
    model::esi::Killmail,
};

/// The caches backing one profile service.
///
/// Name to id mappings and entity names never change in EVE, so those caches never expire.
/// Raw upstream responses and per-killmail records expire after `ttl`.
#[derive(Debug)]
pub struct ProfileCaches {
    /// Character name -> character id
    pub character_ids: ExpiringCache<String, i64>,
    /// Character id -> raw ESI character JSON
    pub esi_responses: ExpiringCache<String, Bytes>,
    /// Character id -> raw zKillboard stats JSON
    pub zkill_responses: ExpiringCache<String, Bytes>,
    /// Corporation id -> corporation danger ratio
    pub corporation_danger: ExpiringCache<String, i64>,
    /// Corporation / alliance id, or `ship:{type_id}` -> display name
    pub names: ExpiringCache<String, String>,
    /// `{killmail_id}:{hash}` -> killmail, shared with the killmail coalescer
    pub killmails: RequestCoalescer<Killmail>,
}

impl ProfileCaches {
    /// Creates empty caches whose expiring entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            character_ids: ExpiringCache::new(Expiry::Never),
            esi_responses: ExpiringCache::with_ttl(ttl),
            zkill_responses: ExpiringCache::with_ttl(ttl),
            corporation_danger: ExpiringCache::with_ttl(ttl),
            names: ExpiringCache::new(Expiry::Never),
            killmails: RequestCoalescer::new(Arc::new(ExpiringCache::with_ttl(ttl))),
        }
    }

    /// Drops expired entries from every cache, returning the total removed.
    pub fn purge_expired(&self) -> usize {
        self.character_ids.purge_expired()
            + self.esi_responses.purge_expired()
            + self.zkill_responses.purge_expired()
            + self.corporation_danger.purge_expired()
            + self.names.purge_expired()
            + self.killmails.cache().purge_expired()
    }
}
