use crate::server::config::Config;

/// Configuration for the batch pool
#[derive(Debug, Clone, Copy)]
pub struct BatchPoolConfig {
    /// Maximum workers resolving characters concurrently within one batch.
    ///
    /// Every worker holds one profile build at a time, and a profile build issues up to
    /// six upstream requests at once, so this bounds the upstream fan-out of a batch.
    pub max_workers: usize,

    /// Maximum names accepted in one batch, extra names are ignored.
    pub max_names: usize,

    /// Capacity of the channel between the pool and the response stream.
    pub stream_buffer: usize,
}

impl BatchPoolConfig {
    /// Create a new configuration
    ///
    /// # Arguments
    /// * `max_workers` - Maximum concurrent profile builds per batch
    /// * `max_names` - Maximum names per batch
    pub fn new(max_workers: usize, max_names: usize) -> Self {
        let max_workers = max_workers.max(1);

        Self {
            max_workers,
            max_names: max_names.max(1),
            stream_buffer: max_workers,
        }
    }

    /// Number of workers to spawn for a batch of `names` names.
    ///
    /// Never more workers than names, and always at least one so an empty batch still
    /// completes through the same path.
    pub fn worker_count(&self, names: usize) -> usize {
        self.max_workers.min(names).max(1)
    }
}

impl From<&Config> for BatchPoolConfig {
    fn from(config: &Config) -> Self {
        Self::new(config.max_workers, config.max_names)
    }
}

impl Default for BatchPoolConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}
