//! TTL-checked snapshot store.
//!
//! One timestamped JSON blob per data kind. A snapshot older than its TTL is
//! not returned as fresh, but remains available as a last-resort fallback
//! when a remote re-fetch fails. Concurrent writers are not locked against
//! each other; the atomic rename makes the last writer win.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{CacheRecord, DataKind};

/// File-backed snapshot store rooted at a cache directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root_dir: PathBuf,
}

impl SnapshotStore {
    /// Create a snapshot store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn path(&self, kind: DataKind) -> PathBuf {
        self.root_dir.join(format!("{}.json", kind.as_str()))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &PathBuf, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self, path: &PathBuf) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read a record, treating a corrupted file as absent.
    async fn read_record<T: DeserializeOwned>(
        &self,
        kind: DataKind,
    ) -> Result<Option<CacheRecord<T>>> {
        let path = self.path(kind);
        let Some(bytes) = self.read_bytes(&path).await? else {
            return Ok(None);
        };

        match serde_json::from_slice(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                log::warn!(
                    "Corrupted snapshot {} ({}), treating as absent",
                    path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// Write a snapshot for the given kind, overwriting any previous one.
    pub async fn put<T: Serialize>(&self, kind: DataKind, payload: &T) -> Result<()> {
        let payload_bytes = serde_json::to_vec(payload)?;
        let record = CacheRecord {
            id: kind.as_str().to_string(),
            payload,
            timestamp: Utc::now(),
            byte_size: payload_bytes.len(),
        };

        let bytes = serde_json::to_vec_pretty(&record)?;
        self.write_bytes(&self.path(kind), &bytes).await
    }

    /// Read the snapshot for a kind only if it is younger than `ttl`.
    pub async fn get_fresh<T: DeserializeOwned>(
        &self,
        kind: DataKind,
        ttl: Duration,
    ) -> Result<Option<T>> {
        let Some(record) = self.read_record::<T>(kind).await? else {
            return Ok(None);
        };

        let age = Utc::now().signed_duration_since(record.timestamp);
        if age > ttl {
            log::debug!(
                "Snapshot {} expired ({} h old)",
                kind.as_str(),
                age.num_hours()
            );
            return Ok(None);
        }
        Ok(Some(record.payload))
    }

    /// Read the snapshot for a kind regardless of age (stale fallback).
    pub async fn get_any<T: DeserializeOwned>(&self, kind: DataKind) -> Result<Option<T>> {
        Ok(self.read_record::<T>(kind).await?.map(|r| r.payload))
    }

    /// Timestamp and size of the stored snapshot, if present.
    pub async fn info(&self, kind: DataKind) -> Result<Option<(chrono::DateTime<Utc>, usize)>> {
        Ok(self
            .read_record::<serde_json::Value>(kind)
            .await?
            .map(|r| (r.timestamp, r.byte_size)))
    }

    /// Remove all snapshots.
    pub async fn clear(&self) -> Result<()> {
        for kind in [DataKind::Conferences, DataKind::Acceptances] {
            match tokio::fs::remove_file(self.path(kind)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(AppError::Io(e)),
            }
        }
        Ok(())
    }
}
