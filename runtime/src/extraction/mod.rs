//! Roster extraction from arbitrary roster-page markup.
//!
//! The table pass runs first; cards are only consulted when it yields no
//! players. The combined list is de-duplicated on lowercased
//! `(name, position)`, first occurrence wins.

pub mod cards;
pub mod table;

use crate::acquisition::{FetchOutcome, HttpClient, PageSource};
use crate::cache::{CacheStats, TtlCache};
use crate::config::ScoutConfig;
use crate::error::{ScoutError, ScoutResult};
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// One player read off a roster page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    /// Free-text position, empty when unknown.
    pub position: String,
    pub seasons: Vec<String>,
}

impl PlayerRecord {
    /// Build a record, rejecting names shorter than two characters and
    /// pronunciation-guide artifacts.
    pub fn new(name: &str, position: &str) -> Option<Self> {
        let name = name.trim();
        if name.chars().count() < 2 || name.to_lowercase().contains("pronunciation") {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            position: position.trim().to_string(),
            seasons: Vec::new(),
        })
    }
}

/// An extracted roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Institution display name, derived from the URL host.
    pub name: String,
    pub players: Vec<PlayerRecord>,
    pub source_url: Url,
}

/// Players on a roster page, table pass first, cards as fallback.
pub fn extract_players(html: &str) -> Vec<PlayerRecord> {
    let document = Html::parse_document(html);
    let mut players = table::extract_from_tables(&document);
    if players.is_empty() {
        players = cards::extract_from_cards(&document);
        tracing::debug!(players = players.len(), "card fallback used");
    }
    dedupe(players)
}

/// Drop repeated `(name, position)` pairs, case-insensitively.
pub fn dedupe(players: Vec<PlayerRecord>) -> Vec<PlayerRecord> {
    let mut seen = HashSet::new();
    players
        .into_iter()
        .filter(|p| seen.insert((p.name.to_lowercase(), p.position.to_lowercase())))
        .collect()
}

/// Institution name guessed from a URL: the label before the public
/// suffix, separators turned into spaces, title-cased.
///
/// `https://www.gobatesbobcats.com/roster` → `"Gobatesbobcats"`.
pub fn display_name(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let labels: Vec<&str> = host.split('.').collect();
    let core = if labels.len() >= 2 {
        labels[labels.len() - 2]
    } else {
        host
    };
    core.replace(['-', '_'], " ")
        .split(' ')
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Fetches roster pages and caches non-empty extractions by URL.
pub struct RosterExtractor<S: PageSource + ?Sized = HttpClient> {
    source: Arc<S>,
    cache: TtlCache<Extraction>,
}

impl RosterExtractor<HttpClient> {
    /// An extractor backed by a fresh HTTP client using the roster timeout.
    pub fn from_config(config: &ScoutConfig) -> Self {
        let client = HttpClient::new(config, config.roster_timeout());
        Self::new(Arc::new(client), config.roster_ttl())
    }
}

impl<S: PageSource + ?Sized> RosterExtractor<S> {
    pub fn new(source: Arc<S>, ttl: Duration) -> Self {
        Self {
            source,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn cache(&self) -> &TtlCache<Extraction> {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("roster cache cleared");
    }

    /// Fetch and parse one roster page.
    ///
    /// The URL must be absolute http(s). A page that cannot be fetched
    /// yields an empty, uncached extraction.
    pub async fn extract_roster(&self, url: &str) -> ScoutResult<Extraction> {
        let url = parse_roster_url(url)?;

        if let Some(hit) = self.cache.get(url.as_str()) {
            tracing::debug!(url = %url, "roster cache hit");
            return Ok(hit);
        }

        let players = match self.source.fetch(&url).await {
            FetchOutcome::Page(page) => extract_players(&page.body),
            FetchOutcome::Failed(reason) => {
                tracing::warn!(url = %url, %reason, "roster page unavailable");
                Vec::new()
            }
        };
        tracing::info!(url = %url, players = players.len(), "roster extracted");

        let extraction = Extraction {
            name: display_name(&url),
            players,
            source_url: url,
        };
        if !extraction.players.is_empty() {
            self.cache
                .put(extraction.source_url.as_str(), extraction.clone());
        }
        Ok(extraction)
    }
}

fn parse_roster_url(raw: &str) -> ScoutResult<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ScoutError::InvalidInput("Missing roster URL".into()));
    }
    let lower = raw.to_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(ScoutError::InvalidInput(format!(
            "Expected absolute roster URL, got {raw:?}"
        )));
    }
    Url::parse(raw)
        .map_err(|e| ScoutError::InvalidInput(format!("Malformed roster URL {raw:?}: {e}")))
}
