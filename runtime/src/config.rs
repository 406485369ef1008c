//! Runtime configuration: defaults, environment overlay, derived values.

use crate::error::{ScoutError, ScoutResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser-like user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/131.0.0.0 Safari/537.36";

/// Accept header sent with every request.
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Per-state directory page. `{state}` is the state's display name with
/// spaces replaced by underscores.
pub const DEFAULT_DIRECTORY_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_college_athletic_programs_in_{state}";

/// Configuration shared by the discovery pipeline and the roster extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Version tag mixed into every discovery cache key.
    pub app_version: String,
    /// Default discovery cache TTL in hours.
    pub discovery_cache_hours: f64,
    /// Roster extraction cache TTL in days.
    pub roster_cache_days: u64,
    pub discovery_timeout_secs: u64,
    pub roster_timeout_secs: u64,
    /// Upper bound on simultaneous outbound requests per client.
    pub max_connections: usize,
    /// Retries on 5xx, 429 and transport errors.
    pub max_retries: u32,
    pub user_agent: String,
    /// Directory page template containing a `{state}` placeholder.
    pub directory_url_template: String,
    /// Host suffixes that belong to the directory source. Links to these
    /// hosts are never chosen as athletics sites.
    pub directory_hosts: Vec<String>,
    /// Bounded concurrency for per-state enumeration and per-candidate
    /// resolution. Output order does not depend on it.
    pub fan_out: usize,
    pub accept_invalid_certs: bool,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            discovery_cache_hours: 24.0,
            roster_cache_days: 30,
            discovery_timeout_secs: 30,
            roster_timeout_secs: 20,
            max_connections: 10,
            max_retries: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            directory_url_template: DEFAULT_DIRECTORY_URL.to_string(),
            directory_hosts: vec!["wikipedia.org".to_string()],
            fan_out: 4,
            accept_invalid_certs: false,
        }
    }
}

impl ScoutConfig {
    /// Defaults overlaid with environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(version) = std::env::var("APP_VERSION") {
            if !version.trim().is_empty() {
                config.app_version = version.trim().to_string();
            }
        }
        if let Some(hours) = env_parse::<f64>("DISCOVERY_CACHE_HOURS") {
            config.discovery_cache_hours = hours;
        }
        if let Some(days) = env_parse::<u64>("SCOUT_ROSTER_CACHE_DAYS") {
            config.roster_cache_days = days;
        }
        if let Some(secs) = env_parse::<u64>("SCOUT_DISCOVERY_TIMEOUT") {
            config.discovery_timeout_secs = secs;
        }
        if let Some(secs) = env_parse::<u64>("SCOUT_ROSTER_TIMEOUT") {
            config.roster_timeout_secs = secs;
        }
        if let Some(n) = env_parse::<usize>("SCOUT_MAX_CONNECTIONS") {
            config.max_connections = n;
        }
        if let Some(n) = env_parse::<u32>("SCOUT_MAX_RETRIES") {
            config.max_retries = n;
        }
        if let Ok(template) = std::env::var("SCOUT_DIRECTORY_URL") {
            if template.contains("{state}") {
                config.directory_url_template = template;
            } else {
                tracing::warn!("ignoring SCOUT_DIRECTORY_URL without a {{state}} placeholder");
            }
        }

        config
    }

    /// [`from_env`](Self::from_env), validated.
    pub fn load() -> ScoutResult<Self> {
        let config = Self::from_env();
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> ScoutResult<()> {
        if !self.directory_url_template.contains("{state}") {
            return Err(ScoutError::Config(format!(
                "directory template {:?} has no {{state}} placeholder",
                self.directory_url_template
            )));
        }
        if self.max_connections == 0 {
            return Err(ScoutError::Config("max_connections must be positive".into()));
        }
        if self.app_version.trim().is_empty() {
            return Err(ScoutError::Config("app_version is empty".into()));
        }
        Ok(())
    }

    /// Discovery TTL used when a call does not override it.
    pub fn discovery_ttl(&self) -> Duration {
        hours_to_duration(self.discovery_cache_hours)
    }

    pub fn roster_ttl(&self) -> Duration {
        Duration::from_secs(self.roster_cache_days.saturating_mul(24 * 3600))
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn roster_timeout(&self) -> Duration {
        Duration::from_secs(self.roster_timeout_secs)
    }
}

/// Convert a caller-supplied hour count into a TTL. Negative, NaN and
/// infinite values collapse to zero, which forces a refresh. Finite values
/// too large for a `Duration` saturate at `Duration::MAX`.
pub fn hours_to_duration(hours: f64) -> Duration {
    if hours.is_finite() && hours > 0.0 {
        Duration::try_from_secs_f64(hours * 3600.0).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring unparsable {key}={raw:?}");
            None
        }
    }
}
