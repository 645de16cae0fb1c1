// src/services/data.rs

//! Conference data service.
//!
//! Owns the feed client and both storage tiers. Constructed once at
//! application start and passed by reference; there are no module-level
//! singletons, and the scheduler guard is an explicit state field.

use std::path::Path;

use chrono::Duration;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::error::{AppError, Result};
use crate::models::{
    AcceptanceRecord, CacheConfig, ConferenceData, ConferenceSeries, Config, RefreshConfig,
    RefreshOutcome,
};
use crate::pipeline::refresh::run_refresh;
use crate::services::FeedClient;
use crate::storage::{DataKind, FeedStore, SnapshotStore};

/// Service over the conference data pipeline.
pub struct DataService {
    feeds: FeedClient,
    snapshots: SnapshotStore,
    feed_store: FeedStore,
    cache: CacheConfig,
    refresh: RefreshConfig,

    /// Explicit scheduler guard; rejects a second start.
    scheduler_started: bool,
}

impl DataService {
    /// Create the service over a data directory.
    pub fn new(config: &Config, data_dir: &Path) -> Result<Self> {
        Ok(Self {
            feeds: FeedClient::new(&config.feeds)?,
            snapshots: SnapshotStore::new(data_dir.join("cache")),
            feed_store: FeedStore::new(data_dir.join("feeds")),
            cache: config.cache.clone(),
            refresh: config.refresh.clone(),
            scheduler_started: false,
        })
    }

    /// TTL for a data kind, from the unified cache policy.
    fn ttl_for(&self, kind: DataKind) -> Duration {
        let hours = match kind {
            DataKind::Conferences => self.cache.conference_ttl_hours,
            DataKind::Acceptances => self.cache.acceptance_ttl_hours,
        };
        Duration::hours(hours as i64)
    }

    /// Read a fresh snapshot, downgrading storage errors to a miss.
    async fn read_fresh<T: DeserializeOwned>(&self, kind: DataKind) -> Option<T> {
        match self.snapshots.get_fresh(kind, self.ttl_for(kind)).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Snapshot read failed for {}: {e}", kind.as_str());
                None
            }
        }
    }

    /// Read any snapshot regardless of age, downgrading errors to a miss.
    async fn read_any<T: DeserializeOwned>(&self, kind: DataKind) -> Option<T> {
        match self.snapshots.get_any(kind).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Snapshot fallback read failed for {}: {e}", kind.as_str());
                None
            }
        }
    }

    /// Get conference and acceptance data, best-effort.
    ///
    /// Fresh snapshots are served directly. Otherwise both feeds are
    /// re-fetched; on failure each kind independently falls back to any
    /// stale snapshot, and `error` is set only when a kind has no cached
    /// copy at all. Never fails.
    pub async fn get_conference_data(&self) -> ConferenceData {
        let fresh_conferences: Option<Vec<ConferenceSeries>> =
            self.read_fresh(DataKind::Conferences).await;
        let fresh_acceptances: Option<Vec<AcceptanceRecord>> =
            self.read_fresh(DataKind::Acceptances).await;

        if let (Some(conferences), Some(acceptances)) = (&fresh_conferences, &fresh_acceptances) {
            return ConferenceData {
                conferences: conferences.clone(),
                acceptances: acceptances.clone(),
                error: None,
            };
        }

        match self.feeds.fetch_both().await {
            Ok((conferences, acceptances)) => {
                if let Err(e) = self
                    .snapshots
                    .put(DataKind::Conferences, &conferences.records)
                    .await
                {
                    log::warn!("Failed to cache conference data: {e}");
                }
                if let Err(e) = self
                    .snapshots
                    .put(DataKind::Acceptances, &acceptances.records)
                    .await
                {
                    log::warn!("Failed to cache acceptance data: {e}");
                }

                ConferenceData {
                    conferences: conferences.records,
                    acceptances: acceptances.records,
                    error: None,
                }
            }
            Err(e) => {
                log::warn!("Feed fetch failed, falling back to cached data: {e}");

                // Stale-but-present data is served silently; the caches may
                // legitimately hold one kind but not the other.
                let conferences: Option<Vec<ConferenceSeries>> =
                    match fresh_conferences {
                        Some(v) => Some(v),
                        None => self.read_any(DataKind::Conferences).await,
                    };
                let acceptances: Option<Vec<AcceptanceRecord>> = match fresh_acceptances {
                    Some(v) => Some(v),
                    None => self.read_any(DataKind::Acceptances).await,
                };

                let error = if conferences.is_none() || acceptances.is_none() {
                    Some(format!("feed fetch failed and no cached copy exists: {e}"))
                } else {
                    None
                };

                ConferenceData {
                    conferences: conferences.unwrap_or_default(),
                    acceptances: acceptances.unwrap_or_default(),
                    error,
                }
            }
        }
    }

    /// Run one server-side refresh, converting failures into an outcome.
    pub async fn trigger_refresh(&self, force: bool) -> RefreshOutcome {
        match run_refresh(&self.feeds, &self.feed_store, &self.snapshots, force).await {
            Ok(outcome) => outcome,
            Err(e) => RefreshOutcome {
                success: false,
                message: format!("refresh failed: {e}"),
                metadata: None,
            },
        }
    }

    /// Feed store metadata from the last successful refresh.
    pub async fn refresh_metadata(&self) -> Option<crate::models::CacheMetadata> {
        self.feed_store.load_metadata().await.ok().flatten()
    }

    /// Snapshot info for display.
    pub async fn snapshot_info(
        &self,
        kind: DataKind,
    ) -> Option<(chrono::DateTime<chrono::Utc>, usize)> {
        self.snapshots.info(kind).await.ok().flatten()
    }

    /// Run the refresh scheduler until shutdown.
    ///
    /// One refresh at startup (when configured) plus one per interval.
    /// The shutdown receiver both ends the loop and guards each tick, so a
    /// tick racing shutdown does not run a refresh nobody wants anymore.
    pub async fn run_scheduler(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        if self.scheduler_started {
            return Err(AppError::Scheduler("scheduler already started".into()));
        }
        self.scheduler_started = true;

        if self.refresh.run_on_start {
            let outcome = self.trigger_refresh(false).await;
            log::info!("Startup refresh: {}", outcome.message);
        }

        let period = std::time::Duration::from_secs(self.refresh.interval_hours * 3600);
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await; // the first tick completes immediately

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if *shutdown.borrow() {
                        break;
                    }
                    let outcome = self.trigger_refresh(false).await;
                    log::info!("Scheduled refresh: {}", outcome.message);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        log::info!("Refresh scheduler stopping");
                        break;
                    }
                }
            }
        }

        self.scheduler_started = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> DataService {
        let mut config = Config::default();
        // Unroutable feed origin so fetches fail fast in tests.
        config.feeds.conference_url = "http://127.0.0.1:9/allconf.yml".to_string();
        config.feeds.acceptance_url = "http://127.0.0.1:9/allacc.yml".to_string();
        config.feeds.timeout_secs = 1;
        DataService::new(&config, dir.path()).unwrap()
    }

    fn sample_series() -> Vec<ConferenceSeries> {
        vec![ConferenceSeries {
            title: "ABC".to_string(),
            description: "ABC Conference".to_string(),
            sub_area: "AI".to_string(),
            rank: None,
            dblp: "abc".to_string(),
            instances: Vec::new(),
        }]
    }

    #[tokio::test]
    async fn serves_fresh_snapshots_without_fetching() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);

        svc.snapshots
            .put(DataKind::Conferences, &sample_series())
            .await
            .unwrap();
        svc.snapshots
            .put(DataKind::Acceptances, &Vec::<AcceptanceRecord>::new())
            .await
            .unwrap();

        let data = svc.get_conference_data().await;
        assert_eq!(data.conferences.len(), 1);
        assert!(data.error.is_none());
    }

    #[tokio::test]
    async fn partial_cache_is_tolerated_when_fetch_fails() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);

        // Only the conference kind is cached; the joint fetch fails.
        svc.snapshots
            .put(DataKind::Conferences, &sample_series())
            .await
            .unwrap();

        let data = svc.get_conference_data().await;
        assert_eq!(data.conferences.len(), 1);
        assert!(data.acceptances.is_empty());
        // The acceptance kind has no cached copy at all.
        assert!(data.error.is_some());
    }

    #[tokio::test]
    async fn empty_caches_and_failed_fetch_yield_empty_data() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);

        let data = svc.get_conference_data().await;
        assert!(data.conferences.is_empty());
        assert!(data.acceptances.is_empty());
        assert!(data.error.is_some());
    }

    #[tokio::test]
    async fn failed_refresh_reports_outcome_not_panic() {
        let tmp = TempDir::new().unwrap();
        let svc = service(&tmp);

        let outcome = svc.trigger_refresh(false).await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("refresh failed"));
        assert!(outcome.metadata.is_none());
    }

    #[tokio::test]
    async fn scheduler_rejects_double_start() {
        let tmp = TempDir::new().unwrap();
        let mut svc = service(&tmp);
        svc.scheduler_started = true;

        let (_tx, rx) = watch::channel(false);
        let result = svc.run_scheduler(rx).await;
        assert!(matches!(result, Err(AppError::Scheduler(_))));
    }

    #[tokio::test]
    async fn scheduler_stops_on_shutdown_signal() {
        let tmp = TempDir::new().unwrap();
        let mut svc = service(&tmp);
        svc.refresh.run_on_start = false;

        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        // With shutdown already signalled, the scheduler exits promptly.
        tokio::time::timeout(std::time::Duration::from_secs(5), svc.run_scheduler(rx))
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }
}
