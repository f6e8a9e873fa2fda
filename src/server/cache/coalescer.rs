use std::{future::Future, sync::Arc};

use dashmap::{mapref::entry::Entry, DashMap};
use tokio::sync::watch;

use crate::server::{cache::ExpiringCache, error::Error};

type Published<T> = Option<Result<T, Error>>;

/// Deduplicates concurrent cache-miss fetches for the same key.
///
/// The first caller to miss the cache for a key becomes the leader and runs the producer.
/// Callers arriving while the leader is still running become followers: they wait for the
/// leader's result and receive an identical clone of it without calling their own producer.
///
/// Successful results are written into the backing cache before they are published, so later
/// callers are answered from the cache without touching the coalescer at all. Errors are
/// handed to every waiting follower and never cached, the next call retries.
///
/// If the leader's future is dropped before it publishes, or its producer reports
/// [`Error::Cancelled`], its bookkeeping entry is removed and waiting followers start over,
/// with one of them taking over as the new leader.
#[derive(Debug)]
pub struct RequestCoalescer<T> {
    cache: Arc<ExpiringCache<String, T>>,
    in_flight: DashMap<String, watch::Receiver<Published<T>>>,
}

enum Role<T> {
    Leader(watch::Sender<Published<T>>),
    Follower(watch::Receiver<Published<T>>),
}

/// Removes the leader's in-flight entry however the leader's future ends.
struct InFlightGuard<'a, T> {
    in_flight: &'a DashMap<String, watch::Receiver<Published<T>>>,
    key: &'a str,
}

impl<T> Drop for InFlightGuard<'_, T> {
    fn drop(&mut self) {
        self.in_flight.remove(self.key);
    }
}

impl<T> RequestCoalescer<T>
where
    T: Clone,
{
    /// Creates a coalescer writing successful results into `cache`.
    pub fn new(cache: Arc<ExpiringCache<String, T>>) -> Self {
        Self {
            cache,
            in_flight: DashMap::new(),
        }
    }

    /// The cache successful results are written to.
    pub fn cache(&self) -> &Arc<ExpiringCache<String, T>> {
        &self.cache
    }

    /// Number of keys currently being fetched.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns the cached value for `key`, or fetches it exactly once across concurrent callers.
    ///
    /// # Arguments
    /// - `key` - Cache and coalescing key, e.g. `"{killmail_id}:{hash}"`
    /// - `producer` - Performs the real fetch, only invoked if this caller becomes the leader
    ///
    /// # Returns
    /// - `Ok(T)` - Value from the cache, from this caller's producer, or from the leader's
    /// - `Err(Error)` - Error returned by whichever producer ran, identical for all waiters
    pub async fn fetch_once<F, Fut>(&self, key: &str, producer: F) -> Result<T, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut producer = Some(producer);

        loop {
            if let Some(value) = self.cache.get(key) {
                return Ok(value);
            }

            let role = match self.in_flight.entry(key.to_string()) {
                Entry::Occupied(entry) => Role::Follower(entry.get().clone()),
                Entry::Vacant(entry) => {
                    let (tx, rx) = watch::channel(None);
                    entry.insert(rx);
                    Role::Leader(tx)
                }
            };

            match role {
                Role::Leader(tx) => {
                    let _guard = InFlightGuard {
                        in_flight: &self.in_flight,
                        key,
                    };

                    // A previous leader may have finished between our cache check and taking
                    // over the entry
                    if let Some(value) = self.cache.get(key) {
                        tx.send_replace(Some(Ok(value.clone())));
                        return Ok(value);
                    }

                    let produce = producer.take().ok_or_else(|| {
                        Error::InternalError(format!("Producer for {} invoked twice", key))
                    })?;

                    let result = produce().await;
                    match &result {
                        Ok(value) => self.cache.set(key.to_string(), value.clone()),
                        // The cancellation belongs to the leader's request, followers start over
                        Err(e) if e.is_cancelled() => return result,
                        Err(_) => {}
                    }

                    tx.send_replace(Some(result.clone()));

                    return result;
                }
                Role::Follower(mut rx) => {
                    let published = rx
                        .wait_for(Option::is_some)
                        .await
                        .map(|published| (*published).clone());

                    match published {
                        Ok(Some(result)) => return result,
                        _ => {
                            tracing::debug!(
                                "Leader for {} abandoned its fetch, retrying as a new caller",
                                key
                            );
                        }
                    }
                }
            }
        }
    }
}
