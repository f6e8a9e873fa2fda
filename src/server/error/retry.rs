use super::{upstream::UpstreamError, Error};

/// Strategy for handling errors in a retry context
#[derive(Debug, PartialEq, Eq)]
pub enum ErrorRetryStrategy {
    /// Retry with exponential backoff (server errors)
    Retry,
    /// Failed permanently (bad request)
    Fail,
}

impl Error {
    /// Determine error retry strategy based upon application Error type
    pub fn to_retry_strategy(&self) -> ErrorRetryStrategy {
        match self {
            Self::UpstreamError(UpstreamError::Status { status, .. }) => match *status {
                // 500 - Internal Server Error
                //
                // Upstream is temporarily unavailable, backoff and retry.
                s if (500..600).contains(&s) => ErrorRetryStrategy::Retry,

                // 420 - ESI error limited, 429 - zKillboard rate limited
                420 | 429 => ErrorRetryStrategy::Retry,

                // 400 - Client Error
                // 404 for an unknown id won't resolve itself on retry.
                _ => ErrorRetryStrategy::Fail,
            },

            // Network error or connection issue - should retry
            Self::UpstreamError(UpstreamError::Transport { .. }) => ErrorRetryStrategy::Retry,

            Self::UpstreamError(UpstreamError::UnexpectedResponse { .. }) => {
                ErrorRetryStrategy::Fail
            }

            // Cancelled - the caller is gone, nobody is waiting for a retry
            Self::Cancelled => ErrorRetryStrategy::Fail,

            // Lookup errors - permanent for this request
            Self::NotFound(_) => ErrorRetryStrategy::Fail,
            Self::NoKills(_) => ErrorRetryStrategy::Fail,

            // Decode errors - permanent failures (bad data format)
            Self::DecodeError(_) => ErrorRetryStrategy::Fail,

            // Configuration errors - permanent failures, won't resolve with retry
            Self::ConfigError(_) => ErrorRetryStrategy::Fail,

            // InternalError - permanent failures (internal error within sclh's code)
            Self::InternalError(_) => ErrorRetryStrategy::Fail,
        }
    }
}
