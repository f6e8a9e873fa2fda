use crate::server::worker::BatchPool;

/// State shared by every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: BatchPool,
}
