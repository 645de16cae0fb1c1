// src/pipeline/refresh.rs

//! Server-side refresh pipeline.
//!
//! One refresh cycle: fetch both feeds, hand the raw texts to the
//! content-hashed feed store, and rewrite the decoded snapshots. The hash
//! gate makes consecutive runs over identical remote content a no-op.

use crate::error::Result;
use crate::models::{AcceptanceRecord, ConferenceSeries, RefreshOutcome};
use crate::services::{FeedClient, FeedDocument};
use crate::storage::{DataKind, FeedStore, SnapshotStore};

/// Run one refresh cycle. `force` bypasses the unchanged-hash skip.
pub async fn run_refresh(
    feeds: &FeedClient,
    feed_store: &FeedStore,
    snapshots: &SnapshotStore,
    force: bool,
) -> Result<RefreshOutcome> {
    let (conferences, acceptances) = feeds.fetch_both().await?;
    store_refresh(&conferences, &acceptances, feed_store, snapshots, force).await
}

/// Persist fetched feeds: hash-gated raw store plus decoded snapshots.
pub async fn store_refresh(
    conferences: &FeedDocument<ConferenceSeries>,
    acceptances: &FeedDocument<AcceptanceRecord>,
    feed_store: &FeedStore,
    snapshots: &SnapshotStore,
    force: bool,
) -> Result<RefreshOutcome> {
    let outcome = if force {
        feed_store.store(&conferences.raw, &acceptances.raw).await?
    } else {
        feed_store
            .store_if_changed(&conferences.raw, &acceptances.raw)
            .await?
    };

    if !outcome.changed {
        return Ok(RefreshOutcome {
            success: true,
            message: "skipped, unchanged".to_string(),
            metadata: Some(outcome.metadata),
        });
    }

    // Snapshot writes are independent per kind; one failing must not lose
    // the other.
    if let Err(e) = snapshots
        .put(DataKind::Conferences, &conferences.records)
        .await
    {
        log::error!("Failed to write conference snapshot: {e}");
    }
    if let Err(e) = snapshots
        .put(DataKind::Acceptances, &acceptances.records)
        .await
    {
        log::error!("Failed to write acceptance snapshot: {e}");
    }

    Ok(RefreshOutcome {
        success: true,
        message: format!(
            "updated: {} conferences, {} acceptance records",
            conferences.records.len(),
            acceptances.records.len()
        ),
        metadata: Some(outcome.metadata),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::decode_records;
    use tempfile::TempDir;

    const CONF_YAML: &str = "- title: ABC\n  confs:\n    - year: 2025\n      id: abc25\n";
    const ACC_YAML: &str = "- title: ABC\n  accept_rates: []\n";

    fn document<T: serde::de::DeserializeOwned>(raw: &str) -> FeedDocument<T> {
        let (records, skipped) = decode_records(raw, "test").unwrap();
        FeedDocument {
            raw: raw.to_string(),
            records,
            skipped,
        }
    }

    #[tokio::test]
    async fn first_refresh_updates_and_writes_snapshots() {
        let tmp = TempDir::new().unwrap();
        let feed_store = FeedStore::new(tmp.path().join("feeds"));
        let snapshots = SnapshotStore::new(tmp.path().join("cache"));

        let outcome = store_refresh(
            &document(CONF_YAML),
            &document(ACC_YAML),
            &feed_store,
            &snapshots,
            false,
        )
        .await
        .unwrap();

        assert!(outcome.success);
        assert!(outcome.message.starts_with("updated"));

        let cached: Vec<ConferenceSeries> = snapshots
            .get_any(DataKind::Conferences)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached[0].title, "ABC");
    }

    #[tokio::test]
    async fn identical_content_reports_skipped() {
        let tmp = TempDir::new().unwrap();
        let feed_store = FeedStore::new(tmp.path().join("feeds"));
        let snapshots = SnapshotStore::new(tmp.path().join("cache"));

        let conferences = document::<ConferenceSeries>(CONF_YAML);
        let acceptances = document::<AcceptanceRecord>(ACC_YAML);

        let first = store_refresh(&conferences, &acceptances, &feed_store, &snapshots, false)
            .await
            .unwrap();
        let second = store_refresh(&conferences, &acceptances, &feed_store, &snapshots, false)
            .await
            .unwrap();

        assert!(second.success);
        assert_eq!(second.message, "skipped, unchanged");
        assert_eq!(
            second.metadata.unwrap().last_update,
            first.metadata.unwrap().last_update
        );
    }

    #[tokio::test]
    async fn force_bypasses_the_hash_gate() {
        let tmp = TempDir::new().unwrap();
        let feed_store = FeedStore::new(tmp.path().join("feeds"));
        let snapshots = SnapshotStore::new(tmp.path().join("cache"));

        let conferences = document::<ConferenceSeries>(CONF_YAML);
        let acceptances = document::<AcceptanceRecord>(ACC_YAML);

        store_refresh(&conferences, &acceptances, &feed_store, &snapshots, false)
            .await
            .unwrap();
        let forced = store_refresh(&conferences, &acceptances, &feed_store, &snapshots, true)
            .await
            .unwrap();

        assert!(forced.message.starts_with("updated"));
    }
}
