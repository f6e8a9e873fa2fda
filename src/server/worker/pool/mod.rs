//! Worker pool building the profiles of one batch request.
//!
//! This module provides the `BatchPool` that spawns a fixed number of worker tasks per
//! batch. Workers pull names from a shared channel, build each profile and hand completed
//! records to a collector, which forwards them to the response stream in completion order
//! and frames them with start and done markers.

mod config;

pub use config::BatchPoolConfig;

use std::{sync::Arc, time::Instant};

use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::{
    model::{
        profile::ProfileRecord,
        stream::{BatchMessage, StreamMarker},
    },
    server::service::profile::ProfileService,
};

/// Outcome of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Profiles delivered to the stream
    pub sent: usize,
    /// Names in the batch
    pub total: usize,
}

/// Worker pool for batch profile requests.
///
/// Cheap to clone; every batch gets its own workers, so concurrent batches don't share
/// worker slots, only the caches behind the profile service.
#[derive(Clone)]
pub struct BatchPool {
    inner: Arc<BatchPoolRef>,
}

struct BatchPoolRef {
    config: BatchPoolConfig,
    profiles: ProfileService,
}

type NameQueue = Arc<Mutex<mpsc::Receiver<String>>>;

impl BatchPool {
    /// Creates a new batch pool.
    ///
    /// # Arguments
    /// - `config` - Worker and batch size limits
    /// - `profiles` - Service building the individual profiles
    pub fn new(config: BatchPoolConfig, profiles: ProfileService) -> Self {
        Self {
            inner: Arc::new(BatchPoolRef { config, profiles }),
        }
    }

    pub fn config(&self) -> &BatchPoolConfig {
        &self.inner.config
    }

    pub fn profiles(&self) -> &ProfileService {
        &self.inner.profiles
    }

    /// Starts a batch in the background and returns its message stream.
    ///
    /// Dropping the stream cancels `token`, which aborts every outstanding upstream request
    /// of the batch.
    pub fn stream(
        &self,
        names: Vec<String>,
        token: CancellationToken,
    ) -> ReceiverStream<BatchMessage> {
        let (tx, rx) = mpsc::channel(self.inner.config.stream_buffer);

        let pool = self.clone();
        tokio::spawn(async move {
            pool.run(names, tx, token).await;
        });

        ReceiverStream::new(rx)
    }

    /// Runs one batch to completion.
    ///
    /// Sends the start marker, pre-resolves uncached names in bulk, builds every profile on
    /// the batch's workers and sends each completed record as it arrives, then the done
    /// marker. Failed profiles are logged and skipped, which shows up as `sent < total`.
    ///
    /// If `tx` is closed the client has gone away: `token` is cancelled and the batch ends
    /// without a done marker.
    ///
    /// # Returns
    /// - `BatchSummary` - Profiles sent out of the names requested
    pub async fn run(
        &self,
        names: Vec<String>,
        tx: mpsc::Sender<BatchMessage>,
        token: CancellationToken,
    ) -> BatchSummary {
        let start = Instant::now();
        let total = names.len();
        let mut summary = BatchSummary { sent: 0, total };

        tracing::info!("Batch request received ({} names)", total);

        if tx
            .send(BatchMessage::Marker(StreamMarker::Start { total }))
            .await
            .is_err()
        {
            tracing::warn!("Client disconnected before the batch started");
            token.cancel();
            return summary;
        }

        if let Err(e) = self
            .inner
            .profiles
            .preload_character_ids(&names, &token)
            .await
        {
            tracing::warn!("Failed to preload character IDs: {}", e);
        }

        let worker_count = self.inner.config.worker_count(total);
        let (results_tx, mut results_rx) = mpsc::channel(worker_count);
        let queue = Self::fill_queue(names);

        let handles: Vec<JoinHandle<()>> = (0..worker_count)
            .map(|id| self.spawn_worker(id, &queue, results_tx.clone(), &token))
            .collect();
        drop(results_tx);

        loop {
            let record = tokio::select! {
                biased;

                _ = tx.closed() => {
                    tracing::warn!("Client disconnected, cancelling batch");
                    token.cancel();
                    break;
                }

                record = results_rx.recv() => record,
            };

            let Some(record) = record else {
                break;
            };

            if tx.send(BatchMessage::Profile(Box::new(record))).await.is_err() {
                tracing::warn!("Client disconnected, cancelling batch");
                token.cancel();
                break;
            }
            summary.sent += 1;
        }

        // Workers blocked on a full results channel must see it closed to stop
        drop(results_rx);

        for (id, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Batch worker {} panicked: {:?}", id, e);
            }
        }

        if !token.is_cancelled() {
            let done = StreamMarker::Done {
                sent: summary.sent,
                total,
            };
            if tx.send(BatchMessage::Marker(done)).await.is_err() {
                tracing::warn!("Failed to send done marker, client disconnected");
            }
        }

        tracing::info!(
            "Batch request completed ({}/{} sent in {:.3}s)",
            summary.sent,
            total,
            start.elapsed().as_secs_f64()
        );

        summary
    }

    /// Puts every name on a closed channel the workers drain.
    fn fill_queue(names: Vec<String>) -> NameQueue {
        let (tx, rx) = mpsc::channel(names.len().max(1));
        for name in names {
            // Capacity covers every name, the channel can't be full
            let _ = tx.try_send(name);
        }

        Arc::new(Mutex::new(rx))
    }

    /// Spawns a single worker task.
    ///
    /// The worker takes names off the queue until it's empty or the batch is cancelled,
    /// building one profile at a time.
    ///
    /// # Arguments
    /// - `id` - Worker identifier for logging
    /// - `queue` - Names left to build
    /// - `results` - Completed profiles
    /// - `token` - Batch cancellation
    fn spawn_worker(
        &self,
        id: usize,
        queue: &NameQueue,
        results: mpsc::Sender<ProfileRecord>,
        token: &CancellationToken,
    ) -> JoinHandle<()> {
        let profiles = self.inner.profiles.clone();
        let queue = Arc::clone(queue);
        let token = token.clone();

        tokio::spawn(async move {
            tracing::trace!("Batch worker {} started", id);

            loop {
                if token.is_cancelled() {
                    break;
                }

                let Some(name) = queue.lock().await.recv().await else {
                    break;
                };

                match profiles.build_profile(&name, &token).await {
                    Ok(record) => {
                        if results.send(record).await.is_err() {
                            break;
                        }
                    }
                    Err(e) if e.source.is_cancelled() => break,
                    Err(e) => tracing::error!("{}", e),
                }
            }

            tracing::trace!("Batch worker {} stopped", id);
        })
    }
}
