//! HTTP gateways to the upstream APIs.
//!
//! [`HttpGateway`] is the shared transport: a `reqwest` client with fixed headers and a
//! request timeout, status classification into [`UpstreamError`], retries for idempotent
//! requests and cancellation through a [`CancellationToken`]. [`EsiGateway`] and
//! [`ZkillGateway`] wrap it with the endpoints each upstream exposes.

pub mod esi;
pub mod retry;
pub mod zkill;

pub use esi::EsiGateway;
pub use retry::RetryPolicy;
pub use zkill::ZkillGateway;

use std::time::Duration;

use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::server::{
    config::normalize_base_url,
    error::{config::ConfigError, upstream::UpstreamError, Error},
};

/// Raw JSON transport to one upstream base URL.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpGateway {
    /// Creates a gateway sending requests relative to `base_url`.
    ///
    /// # Arguments
    /// - `base_url` - Upstream base URL, a trailing slash is added if missing
    /// - `user_agent` - Sent as `User-Agent` with every request
    /// - `timeout` - Upper bound for a single attempt, connect through body
    /// - `retry` - Retry policy applied to GET requests
    ///
    /// # Returns
    /// - `Ok(HttpGateway)` - Gateway ready to use
    /// - `Err(Error::ConfigError)` - The user agent isn't a valid header value
    /// - `Err(Error::InternalError)` - The HTTP client couldn't be built
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, Error> {
        let user_agent = HeaderValue::from_str(user_agent).map_err(|e| {
            Error::ConfigError(ConfigError::InvalidEnvValue {
                var: "USER_AGENT".to_string(),
                reason: e.to_string(),
            })
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url.into()),
            retry,
        })
    }

    /// Sends a GET request, retrying transient failures.
    ///
    /// # Arguments
    /// - `path` - Path relative to the base URL, e.g. `"characters/123/"`
    /// - `query` - Query parameters
    /// - `token` - Cancels the request, including any backoff in between attempts
    ///
    /// # Returns
    /// - `Ok(Bytes)` - Body of a 200 response
    /// - `Err(Error::UpstreamError)` - Non-200 status or transport failure after all attempts
    /// - `Err(Error::Cancelled)` - `token` was cancelled first
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: &CancellationToken,
    ) -> Result<Bytes, Error> {
        let description = format!("GET {}", path);
        let request = self.retry.execute_with_retry(&description, move || {
            self.execute(Method::GET, path, query, None)
        });

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Cancelled),
            result = request => result,
        }
    }

    /// Sends a POST request with a JSON body. POSTs are never retried.
    ///
    /// # Returns
    /// - `Ok(Bytes)` - Body of a 200 response
    /// - `Err(Error::UpstreamError)` - Non-200 status or transport failure
    /// - `Err(Error::DecodeError)` - `body` couldn't be serialized
    /// - `Err(Error::Cancelled)` - `token` was cancelled first
    pub async fn post<B>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
        token: &CancellationToken,
    ) -> Result<Bytes, Error>
    where
        B: serde::Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)?;
        let request = self.execute(Method::POST, path, query, Some(body));

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Cancelled),
            result = request => result,
        }
    }

    /// Sends a GET request and decodes the JSON body.
    pub async fn get_json<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: &CancellationToken,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let body = self.get(path, query, token).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Sends a POST request and decodes the JSON body.
    pub async fn post_json<T, B>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
        token: &CancellationToken,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let body = self.post(path, query, body, token).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Performs a single attempt.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, Error> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(|e| transport(path, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            }
            .into());
        }

        response.bytes().await.map_err(|e| transport(path, e))
    }
}

fn transport(path: &str, err: reqwest::Error) -> Error {
    UpstreamError::Transport {
        path: path.to_string(),
        reason: err.to_string(),
    }
    .into()
}
