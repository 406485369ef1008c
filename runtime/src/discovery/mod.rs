//! Discovery pipeline: normalize → enumerate → filter → resolve → probe,
//! fronted by a TTL cache.
//!
//! Output order is deterministic: states in request order, directory rows
//! in page order. Enumeration and resolution fan out with bounded
//! concurrency, but results are collected in input order so the fan-out
//! width never changes the payload.

pub mod enumerate;
pub mod filter;
pub mod probe;
pub mod resolve;
pub mod scoring;
pub mod types;

pub use enumerate::DirectorySource;
pub use filter::AssociationFilter;
pub use scoring::LinkScorer;
pub use types::{
    Association, Discovery, DiscoveryPayload, DiscoveryRequest, Division, FetchTrace,
    ProgramCandidate, ResolvedProgram, Source,
};

use crate::acquisition::{HttpClient, PageSource};
use crate::cache::{CacheStats, TtlCache};
use crate::config::{hours_to_duration, ScoutConfig};
use crate::error::{ScoutError, ScoutResult};
use crate::normalize::{resolve_states, sport_slugs};
use dashmap::DashMap;
use enumerate::enumerate_state;
use futures::stream::{self, StreamExt};
use probe::RosterProber;
use resolve::LinkResolver;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Cache key for one discovery request.
///
/// States keep request order; sources are sorted so that the same set in
/// a different order shares an entry.
pub fn cache_key(
    app_version: &str,
    states: &[String],
    slugs: &[String],
    filter: &AssociationFilter,
    sources: &[Source],
) -> String {
    let mut source_names: Vec<&str> = sources.iter().map(Source::as_str).collect();
    source_names.sort_unstable();
    format!(
        "{app_version}::disc::{}::{}::diii={}::njcaa={}::src={}",
        states.join(","),
        slugs.join(","),
        filter.include_diii,
        filter.include_njcaa,
        source_names.join(",")
    )
}

/// Runs discovery requests against a [`PageSource`] and caches the results.
pub struct Discoverer<S: PageSource + ?Sized = HttpClient> {
    source: Arc<S>,
    scorer: LinkScorer,
    cache: TtlCache<DiscoveryPayload>,
    /// One lock per cache key with a build in progress.
    inflight: DashMap<String, Arc<Mutex<()>>>,
    app_version: String,
    fan_out: usize,
}

impl Discoverer<HttpClient> {
    /// A discoverer backed by a fresh HTTP client using the discovery timeout.
    pub fn from_config(config: &ScoutConfig) -> Self {
        let client = HttpClient::new(config, config.discovery_timeout());
        Self::new(Arc::new(client), config)
    }
}

impl<S: PageSource + ?Sized> Discoverer<S> {
    pub fn new(source: Arc<S>, config: &ScoutConfig) -> Self {
        Self {
            source,
            scorer: LinkScorer::new(DirectorySource::from_config(config)),
            cache: TtlCache::new(config.discovery_ttl()),
            inflight: DashMap::new(),
            app_version: config.app_version.clone(),
            fan_out: config.fan_out.max(1),
        }
    }

    pub fn cache(&self) -> &TtlCache<DiscoveryPayload> {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("discovery cache cleared");
    }

    /// Discover resolved programs, serving from cache when fresh.
    pub async fn discover(&self, req: &DiscoveryRequest) -> ScoutResult<Discovery> {
        self.discover_with_cancel(req, &CancellationToken::new()).await
    }

    /// Same as [`discover`](Self::discover) with a zero TTL.
    pub async fn rebuild(&self, req: &DiscoveryRequest) -> ScoutResult<Discovery> {
        let mut req = req.clone();
        req.cache_hours = Some(0.0);
        self.discover(&req).await
    }

    /// Discover, aborting every in-flight fetch when `cancel` fires.
    pub async fn discover_with_cancel(
        &self,
        req: &DiscoveryRequest,
        cancel: &CancellationToken,
    ) -> ScoutResult<Discovery> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ScoutError::Cancelled),
            result = self.discover_inner(req) => result,
        }
    }

    async fn discover_inner(&self, req: &DiscoveryRequest) -> ScoutResult<Discovery> {
        let slugs = sport_slugs(req.sport.as_deref());
        let states = resolve_states(req.region.as_deref(), req.states.as_deref())?;
        let sources = req.source_list();
        let key = cache_key(&self.app_version, &states, &slugs, &req.filter, &sources);
        let ttl = req
            .cache_hours
            .map(hours_to_duration)
            .unwrap_or_else(|| self.cache.default_ttl());

        if let Some(payload) = self.cache.get_with_ttl(&key, ttl) {
            tracing::info!(key = %key, "discovery cache hit");
            return Ok(Discovery::new(present(payload, req.diagnostics), true));
        }

        let mut slot = InflightSlot::new(&self.inflight, &key);
        slot.wait().await;

        // A concurrent caller may have filled the entry while we waited.
        if let Some(payload) = self.cache.get_with_ttl(&key, ttl) {
            tracing::info!(key = %key, "discovery cache hit after wait");
            return Ok(Discovery::new(present(payload, req.diagnostics), true));
        }

        tracing::info!(key = %key, states = states.len(), "discovery cache miss, building");
        let payload = self.build(&states, &slugs, &sources, &req.filter).await;

        if payload.programs.is_empty() {
            tracing::warn!(key = %key, "discovery found no programs, not caching");
        } else {
            self.cache.put(key.clone(), payload.clone());
        }

        drop(slot);
        Ok(Discovery::new(present(payload, req.diagnostics), false))
    }

    async fn build(
        &self,
        states: &[String],
        slugs: &[String],
        sources: &[Source],
        filter: &AssociationFilter,
    ) -> DiscoveryPayload {
        let listings = if Source::enumerates(sources) {
            stream::iter(states.iter().cloned())
                .map(|state| async move {
                    enumerate_state(&*self.source, &self.scorer, &state).await
                })
                .buffered(self.fan_out)
                .collect::<Vec<_>>()
                .await
        } else {
            tracing::info!("no enumerating source requested");
            Vec::new()
        };

        let mut trace = Vec::with_capacity(listings.len());
        let mut candidates = Vec::new();
        for listing in listings {
            trace.push(listing.trace);
            candidates.extend(listing.candidates);
        }

        let enumerated = candidates.len();
        let admitted: Vec<ProgramCandidate> =
            candidates.into_iter().filter(|c| filter.admits(c)).collect();
        tracing::info!(enumerated, admitted = admitted.len(), "candidates filtered");

        let programs: Vec<ResolvedProgram> = stream::iter(admitted)
            .map(|candidate| self.resolve_candidate(candidate, slugs))
            .buffered(self.fan_out)
            .filter_map(futures::future::ready)
            .collect()
            .await;
        tracing::info!(resolved = programs.len(), "discovery built");

        DiscoveryPayload {
            programs,
            states: states.to_vec(),
            sport_slugs: slugs.to_vec(),
            sources_used: sources.to_vec(),
            diag: Some(trace),
        }
    }

    async fn resolve_candidate(
        &self,
        candidate: ProgramCandidate,
        slugs: &[String],
    ) -> Option<ResolvedProgram> {
        let athletics: Url = LinkResolver::new(&*self.source, &self.scorer)
            .resolve(&candidate)
            .await?;
        let Some(roster) = RosterProber::new(&*self.source).probe(&athletics, slugs).await else {
            tracing::debug!(school = %candidate.school, athletics = %athletics, "dropped: no roster page");
            return None;
        };
        Some(ResolvedProgram::new(candidate, athletics, roster))
    }
}

/// A caller's claim on the per-key build lock.
///
/// Dropping the slot releases the lock and removes the map entry once no
/// other caller holds or waits on it. This also runs when the discovery
/// future is dropped mid-build.
struct InflightSlot<'a> {
    inflight: &'a DashMap<String, Arc<Mutex<()>>>,
    key: String,
    lock: Option<Arc<Mutex<()>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<'a> InflightSlot<'a> {
    fn new(inflight: &'a DashMap<String, Arc<Mutex<()>>>, key: &str) -> Self {
        let lock = inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Self {
            inflight,
            key: key.to_string(),
            lock: Some(lock),
            guard: None,
        }
    }

    /// Wait until no other caller is building this key.
    async fn wait(&mut self) {
        if let Some(lock) = self.lock.clone() {
            self.guard = Some(lock.lock_owned().await);
        }
    }
}

impl Drop for InflightSlot<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.lock.take();
        self.inflight
            .remove_if(&self.key, |_, held| Arc::strong_count(held) == 1);
    }
}

/// Strip the fetch trace unless the caller asked for it.
fn present(mut payload: DiscoveryPayload, diagnostics: bool) -> DiscoveryPayload {
    if !diagnostics {
        payload.diag = None;
    }
    payload
}
