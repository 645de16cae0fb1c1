//! Content-hashed raw feed store.
//!
//! Persists the raw YAML text of both feeds plus a metadata file carrying a
//! SHA-256 digest per kind and the last update timestamp. A refresh only
//! rewrites files and metadata when at least one digest differs from the
//! previous run, so consumers can distinguish "data actually changed" from
//! "refresh ran but no-op".

use std::path::PathBuf;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::CacheMetadata;

const CONFERENCE_FILE: &str = "conferences.yml";
const ACCEPTANCE_FILE: &str = "acceptances.yml";
const METADATA_FILE: &str = "metadata.json";

/// Result of a store attempt.
#[derive(Debug, Clone)]
pub struct StoreOutcome {
    /// Whether any file was rewritten
    pub changed: bool,

    /// Metadata after the attempt (previous metadata when unchanged)
    pub metadata: CacheMetadata,
}

/// Raw feed file store rooted at a feeds directory.
#[derive(Debug, Clone)]
pub struct FeedStore {
    root_dir: PathBuf,
}

impl FeedStore {
    /// Create a feed store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root_dir.join(name)
    }

    async fn write_text(&self, name: &str, text: &str) -> Result<()> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn read_text(&self, name: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path(name)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Load the stored metadata, treating a corrupted file as absent.
    pub async fn load_metadata(&self) -> Result<Option<CacheMetadata>> {
        let Some(text) = self.read_text(METADATA_FILE).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&text) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(e) => {
                log::warn!("Corrupted feed metadata ({e}), treating as absent");
                Ok(None)
            }
        }
    }

    /// Load the raw feed texts together with their metadata.
    pub async fn load_raw(&self) -> Result<Option<(String, String, CacheMetadata)>> {
        let Some(metadata) = self.load_metadata().await? else {
            return Ok(None);
        };
        let Some(conferences) = self.read_text(CONFERENCE_FILE).await? else {
            return Ok(None);
        };
        let Some(acceptances) = self.read_text(ACCEPTANCE_FILE).await? else {
            return Ok(None);
        };
        Ok(Some((conferences, acceptances, metadata)))
    }

    /// Store both feed texts only if at least one content hash changed.
    pub async fn store_if_changed(
        &self,
        conference_text: &str,
        acceptance_text: &str,
    ) -> Result<StoreOutcome> {
        let conference_hash = sha256_hex(conference_text);
        let acceptance_hash = sha256_hex(acceptance_text);

        if let Some(previous) = self.load_metadata().await? {
            if previous.conference_hash == conference_hash
                && previous.acceptance_hash == acceptance_hash
            {
                log::info!("Feed content unchanged, skipping rewrite");
                return Ok(StoreOutcome {
                    changed: false,
                    metadata: previous,
                });
            }
        }

        self.store(conference_text, acceptance_text).await
    }

    /// Store both feed texts unconditionally.
    pub async fn store(
        &self,
        conference_text: &str,
        acceptance_text: &str,
    ) -> Result<StoreOutcome> {
        let metadata = CacheMetadata {
            conference_hash: sha256_hex(conference_text),
            acceptance_hash: sha256_hex(acceptance_text),
            last_update: Utc::now(),
        };

        self.write_text(CONFERENCE_FILE, conference_text).await?;
        self.write_text(ACCEPTANCE_FILE, acceptance_text).await?;
        self.write_text(METADATA_FILE, &serde_json::to_string_pretty(&metadata)?)
            .await?;

        log::info!(
            "Feed store updated ({} + {} bytes)",
            conference_text.len(),
            acceptance_text.len()
        );
        Ok(StoreOutcome {
            changed: true,
            metadata,
        })
    }
}

/// SHA-256 hex digest of a text.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONF: &str = "- title: ABC\n";
    const ACC: &str = "- title: ABC\n  accept_rates: []\n";

    #[tokio::test]
    async fn first_store_writes_everything() {
        let tmp = TempDir::new().unwrap();
        let store = FeedStore::new(tmp.path());

        let outcome = store.store_if_changed(CONF, ACC).await.unwrap();
        assert!(outcome.changed);

        let (conf, acc, metadata) = store.load_raw().await.unwrap().unwrap();
        assert_eq!(conf, CONF);
        assert_eq!(acc, ACC);
        assert_eq!(metadata.conference_hash, sha256_hex(CONF));
        assert_eq!(metadata.acceptance_hash, sha256_hex(ACC));
    }

    #[tokio::test]
    async fn identical_content_skips_rewrite() {
        let tmp = TempDir::new().unwrap();
        let store = FeedStore::new(tmp.path());

        let first = store.store_if_changed(CONF, ACC).await.unwrap();
        let second = store.store_if_changed(CONF, ACC).await.unwrap();

        assert!(first.changed);
        assert!(!second.changed);
        // Metadata untouched: the timestamp is the first run's.
        assert_eq!(second.metadata.last_update, first.metadata.last_update);
    }

    #[tokio::test]
    async fn changed_content_updates_hashes_and_timestamp() {
        let tmp = TempDir::new().unwrap();
        let store = FeedStore::new(tmp.path());

        let first = store.store_if_changed(CONF, ACC).await.unwrap();
        let outcome = store
            .store_if_changed("- title: DEF\n", ACC)
            .await
            .unwrap();

        assert!(outcome.changed);
        assert_ne!(outcome.metadata.conference_hash, first.metadata.conference_hash);
        assert_eq!(outcome.metadata.acceptance_hash, first.metadata.acceptance_hash);
        assert!(outcome.metadata.last_update >= first.metadata.last_update);

        let (conf, _, _) = store.load_raw().await.unwrap().unwrap();
        assert_eq!(conf, "- title: DEF\n");
    }

    #[tokio::test]
    async fn unconditional_store_ignores_hashes() {
        let tmp = TempDir::new().unwrap();
        let store = FeedStore::new(tmp.path());

        store.store_if_changed(CONF, ACC).await.unwrap();
        let outcome = store.store(CONF, ACC).await.unwrap();
        assert!(outcome.changed);
    }

    #[tokio::test]
    async fn corrupted_metadata_is_treated_as_absent() {
        let tmp = TempDir::new().unwrap();
        let store = FeedStore::new(tmp.path());

        tokio::fs::write(tmp.path().join(METADATA_FILE), b"}{")
            .await
            .unwrap();

        assert!(store.load_metadata().await.unwrap().is_none());
        let outcome = store.store_if_changed(CONF, ACC).await.unwrap();
        assert!(outcome.changed);
    }

    #[test]
    fn sha256_is_stable() {
        assert_eq!(sha256_hex("abc").len(), 64);
        assert_eq!(sha256_hex("abc"), sha256_hex("abc"));
        assert_ne!(sha256_hex("abc"), sha256_hex("abd"));
    }
}
