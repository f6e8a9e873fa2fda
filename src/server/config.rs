//! Application configuration loaded from environment variables.
//!
//! Every setting has a default so the server starts with an empty environment; variables
//! only need to be set to override them. `main` loads a `.env` file via `dotenvy` before
//! calling [`Config::from_env`].

use std::{str::FromStr, time::Duration};

use crate::server::error::config::ConfigError;

pub const DEFAULT_ESI_URL: &str = "https://esi.evetech.net/latest/";
pub const DEFAULT_ZKILL_URL: &str = "https://zkillboard.com/api/";
pub const DEFAULT_USER_AGENT: &str = "sclh/0.1 (+https://github.com/kat1248/sclh)";

/// Runtime configuration for the server, gateways, caches and batch pool.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Enables debug level logging.
    pub debug: bool,
    /// Base URL of EVE Online's ESI, with trailing slash.
    pub esi_url: String,
    /// Base URL of the zKillboard API, with trailing slash.
    pub zkill_url: String,
    /// User agent sent with every upstream request.
    pub user_agent: String,
    /// Fetch and analyze each character's recent killmails.
    pub analyze_kills: bool,
    /// Resolve the display name of each character's most flown ship.
    pub favorite_ship_names: bool,
    /// Maximum names accepted in one batch request.
    pub max_names: usize,
    /// Number of workers resolving characters concurrently per batch.
    pub max_workers: usize,
    /// Maximum simultaneous killmail fetches per kill history analysis.
    pub killmail_concurrency: usize,
    pub cache_ttl_secs: u64,
    pub cache_cleanup_secs: u64,
    pub upstream_timeout_secs: u64,
    pub upstream_max_attempts: u32,
    pub upstream_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            debug: false,
            esi_url: DEFAULT_ESI_URL.to_string(),
            zkill_url: DEFAULT_ZKILL_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            analyze_kills: false,
            favorite_ship_names: false,
            max_names: 100,
            max_workers: 10,
            killmail_concurrency: 10,
            cache_ttl_secs: 60 * 60,
            cache_cleanup_secs: 10 * 60,
            upstream_timeout_secs: 10,
            upstream_max_attempts: 3,
            upstream_backoff_ms: 500,
        }
    }
}

impl Config {
    /// Builds the configuration from environment variables, falling back to defaults.
    ///
    /// # Returns
    /// - `Ok(Config)` - All present variables parsed successfully
    /// - `Err(ConfigError::InvalidEnvValue)` - A variable was present but couldn't be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            port: env_parse("PORT", defaults.port)?,
            debug: env_bool("DEBUG", defaults.debug)?,
            esi_url: env_url("ESI_URL", defaults.esi_url),
            zkill_url: env_url("ZKILL_URL", defaults.zkill_url),
            user_agent: std::env::var("USER_AGENT").unwrap_or(defaults.user_agent),
            analyze_kills: env_bool("ANALYZE_KILLS", defaults.analyze_kills)?,
            favorite_ship_names: env_bool("FAVORITE_SHIP", defaults.favorite_ship_names)?,
            max_names: env_positive("MAX_NAMES", defaults.max_names)?,
            max_workers: env_positive("MAX_WORKERS", defaults.max_workers)?,
            killmail_concurrency: env_positive(
                "KILLMAIL_CONCURRENCY",
                defaults.killmail_concurrency,
            )?,
            cache_ttl_secs: env_parse("CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            cache_cleanup_secs: env_parse("CACHE_CLEANUP_SECS", defaults.cache_cleanup_secs)?,
            upstream_timeout_secs: env_parse(
                "UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout_secs,
            )?,
            upstream_max_attempts: env_parse(
                "UPSTREAM_MAX_ATTEMPTS",
                defaults.upstream_max_attempts,
            )?
            .max(1),
            upstream_backoff_ms: env_parse("UPSTREAM_BACKOFF_MS", defaults.upstream_backoff_ms)?,
        })
    }

    /// Get cache TTL as Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Get cache cleanup interval as Duration
    pub fn cache_cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cache_cleanup_secs)
    }

    /// Get upstream request timeout as Duration
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Get initial upstream retry backoff as Duration
    pub fn upstream_backoff(&self) -> Duration {
        Duration::from_millis(self.upstream_backoff_ms)
    }
}

fn invalid(var: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnvValue {
        var: var.to_string(),
        reason: reason.into(),
    }
}

fn env_parse<T>(var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(var, e.to_string())),
        Err(_) => Ok(default),
    }
}

fn env_positive(var: &str, default: usize) -> Result<usize, ConfigError> {
    let value = env_parse(var, default)?;
    if value == 0 {
        return Err(invalid(var, "must be greater than zero"));
    }

    Ok(value)
}

fn env_bool(var: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(var) {
        Ok(value) => parse_bool(&value).ok_or_else(|| invalid(var, "expected true or false")),
        Err(_) => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Upstream paths are joined onto the base URL, so it must end with a slash.
fn env_url(var: &str, default: String) -> String {
    let url = std::env::var(var).unwrap_or(default);
    normalize_base_url(url)
}

pub(crate) fn normalize_base_url(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
