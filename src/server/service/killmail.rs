//! Killmail loading and recent kill history analysis.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::{
    model::profile::ProfileRecord,
    server::{
        cache::RequestCoalescer,
        error::Error,
        gateway::EsiGateway,
        model::{esi::Killmail, zkill::KillReference},
        util::{eve::is_explorer_ship, time::date_part},
    },
};

/// Loads killmails through the shared coalescer and tallies a character's recent kills.
pub struct KillAnalyzer<'a> {
    esi: &'a EsiGateway,
    killmails: &'a RequestCoalescer<Killmail>,
    concurrency: usize,
}

impl<'a> KillAnalyzer<'a> {
    /// Creates a new instance of [`KillAnalyzer`]
    ///
    /// # Arguments
    /// - `esi` - Gateway killmails are fetched from
    /// - `killmails` - Coalescer and cache shared by every analysis on the server
    /// - `concurrency` - Max killmails fetched at once by a single [`analyze`](Self::analyze)
    pub fn new(
        esi: &'a EsiGateway,
        killmails: &'a RequestCoalescer<Killmail>,
        concurrency: usize,
    ) -> Self {
        Self {
            esi,
            killmails,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetches a killmail at most once across concurrent callers, then from cache.
    ///
    /// Waiting on another caller's fetch is raced against `token` as well, so a cancelled
    /// request never hangs on work owned by someone else.
    pub async fn fetch_killmail(
        &self,
        reference: &KillReference,
        token: &CancellationToken,
    ) -> Result<Killmail, Error> {
        let key = reference.cache_key();
        let fetch = self.killmails.fetch_once(&key, || {
            self.esi
                .killmail(reference.killmail_id, &reference.zkb.hash, token)
        });

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Cancelled),
            result = fetch => result,
        }
    }

    /// Tallies the killmails behind `references` for `character_id`.
    ///
    /// Killmails are fetched concurrently, bounded by this analyzer's concurrency limit.
    /// A killmail that fails to load is logged and left out of the tally; cancellation is
    /// not, it aborts the analysis.
    ///
    /// # Returns
    /// - `Ok(KillTally)` - Tally over every killmail that loaded
    /// - `Err(Error::NoKills)` - `references` is empty
    /// - `Err(Error::Cancelled)` - `token` was cancelled
    pub async fn analyze(
        &self,
        character_id: i64,
        references: &[KillReference],
        token: &CancellationToken,
    ) -> Result<KillTally, Error> {
        if references.is_empty() {
            return Err(Error::NoKills(character_id));
        }

        let semaphore = Semaphore::new(self.concurrency);
        let semaphore = &semaphore;

        let results = join_all(references.iter().map(|reference| async move {
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|e| Error::InternalError(format!("Killmail semaphore closed: {}", e)))?;

            self.fetch_killmail(reference, token).await
        }))
        .await;

        let mut tally = KillTally::new(character_id, references.len());
        for (reference, result) in references.iter().zip(results) {
            match result {
                Ok(killmail) => tally.record(&killmail),
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    tracing::warn!(
                        "Skipping killmail {} for character {}: {}",
                        reference.killmail_id,
                        character_id,
                        e
                    );
                }
            }
        }

        Ok(tally)
    }
}

/// Running totals over a character's recent kills.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KillTally {
    character_id: i64,
    /// Number of kill references, loaded or not
    pub recent_kill_total: usize,
    /// Killmails the character was on where the victim flew an explorer hull
    pub explorer_total: i64,
    /// Ship type id -> attacker entries of the character in that ship
    pub ship_counts: HashMap<i64, i64>,
    pub last_kill_time: Option<DateTime<Utc>>,
}

impl KillTally {
    pub fn new(character_id: i64, recent_kill_total: usize) -> Self {
        Self {
            character_id,
            recent_kill_total,
            ..Default::default()
        }
    }

    /// Adds one killmail to the tally.
    pub fn record(&mut self, killmail: &Killmail) {
        let mut on_killmail = false;

        for attacker in killmail
            .attackers
            .iter()
            .filter(|attacker| attacker.character_id == self.character_id)
        {
            on_killmail = true;
            if attacker.ship_type_id != 0 {
                *self.ship_counts.entry(attacker.ship_type_id).or_default() += 1;
            }
        }

        if on_killmail && is_explorer_ship(killmail.victim.ship_type_id) {
            self.explorer_total += 1;
        }

        if self
            .last_kill_time
            .map_or(true, |last| killmail.killmail_time > last)
        {
            self.last_kill_time = Some(killmail.killmail_time);
        }
    }

    /// Most flown ship as `(ship_type_id, count)`, ties going to the lowest ship type id.
    pub fn favorite_ship(&self) -> Option<(i64, i64)> {
        self.ship_counts
            .iter()
            .map(|(&ship, &count)| (ship, count))
            .max_by(|(ship_a, count_a), (ship_b, count_b)| {
                count_a.cmp(count_b).then_with(|| ship_b.cmp(ship_a))
            })
    }

    /// Profile fields described by this tally.
    pub fn to_partial(&self) -> ProfileRecord {
        let (favorite_ship_id, favorite_ship_count) = self.favorite_ship().unwrap_or_default();

        ProfileRecord {
            recent_kill_total: self.recent_kill_total as i64,
            recent_explorer_total: self.explorer_total,
            last_kill_time: self.last_kill_time.map(date_part).unwrap_or_default(),
            favorite_ship_id,
            favorite_ship_count,
            ..Default::default()
        }
    }
}

/// Summarizes a character's most recent killboard activity, e.g. `"2024-05-01 (loss)"`.
///
/// The kind is `loss` if the character was the victim, `struct` if the victim has no
/// character (a structure or NPC) and `kill` otherwise.
pub fn describe_last_kill(killmail: &Killmail, character_id: i64) -> String {
    let kind = match killmail.victim.character_id {
        id if id == character_id => "loss",
        0 => "struct",
        _ => "kill",
    };

    format!("{} ({})", date_part(killmail.killmail_time), kind)
}
