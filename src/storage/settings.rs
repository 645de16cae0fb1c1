//! Client-persisted state: view settings and history lists.
//!
//! View settings are versioned: unknown fields are dropped, missing fields
//! take defaults, a version mismatch keeps recognized fields and bumps the
//! version, and a parse failure resets the store to defaults instead of
//! leaving it inconsistent.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

const VIEW_SETTINGS_FILE: &str = "view_settings.json";
const SEARCH_HISTORY_FILE: &str = "search_history.json";
const RECOGNITION_HISTORY_FILE: &str = "recognition_history.json";

/// Current view-settings schema version.
pub const VIEW_SETTINGS_VERSION: u32 = 2;

/// Maximum retained search terms.
const MAX_SEARCH_HISTORY: usize = 10;

/// Maximum retained recognition results.
const MAX_RECOGNITION_HISTORY: usize = 20;

/// Calendar view settings blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    #[serde(default)]
    pub version: u32,

    /// Sub-areas pinned to the top of the calendar
    #[serde(default)]
    pub pinned_categories: Vec<String>,

    /// Show deadlines that already passed
    #[serde(default = "default_show_expired")]
    pub show_expired: bool,

    /// How many months ahead the calendar renders
    #[serde(default = "default_months_ahead")]
    pub months_ahead: u32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            version: VIEW_SETTINGS_VERSION,
            pinned_categories: Vec::new(),
            show_expired: default_show_expired(),
            months_ahead: default_months_ahead(),
        }
    }
}

fn default_show_expired() -> bool {
    false
}

fn default_months_ahead() -> u32 {
    6
}

/// One formula-recognition history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionEntry {
    pub latex: String,

    /// Confidence fraction in 0..=1
    pub confidence: f64,

    pub timestamp: DateTime<Utc>,
}

/// File-backed store for client state.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    root_dir: PathBuf,
}

impl SettingsStore {
    /// Create a settings store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root_dir.join(name)
    }

    async fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&serde_json::to_vec_pretty(value)?).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let bytes = match tokio::fs::read(self.path(name)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::Io(e)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("Corrupted {} ({}), resetting to defaults", name, e);
                Ok(None)
            }
        }
    }

    /// Load view settings, merging defaults on version mismatch and
    /// resetting the store on parse failure.
    pub async fn load_view_settings(&self) -> Result<ViewSettings> {
        let Some(mut settings) = self.read_json::<ViewSettings>(VIEW_SETTINGS_FILE).await? else {
            let defaults = ViewSettings::default();
            self.write_json(VIEW_SETTINGS_FILE, &defaults).await?;
            return Ok(defaults);
        };

        if settings.version != VIEW_SETTINGS_VERSION {
            log::info!(
                "View settings version {} != {}, merging defaults",
                settings.version,
                VIEW_SETTINGS_VERSION
            );
            settings.version = VIEW_SETTINGS_VERSION;
            self.write_json(VIEW_SETTINGS_FILE, &settings).await?;
        }
        Ok(settings)
    }

    /// Persist view settings.
    pub async fn save_view_settings(&self, settings: &ViewSettings) -> Result<()> {
        self.write_json(VIEW_SETTINGS_FILE, settings).await
    }

    /// Load the search history, most recent first.
    pub async fn search_history(&self) -> Result<Vec<String>> {
        Ok(self
            .read_json::<Vec<String>>(SEARCH_HISTORY_FILE)
            .await?
            .unwrap_or_default())
    }

    /// Record a search term: deduped, pushed to the front, capped.
    pub async fn push_search(&self, term: &str) -> Result<Vec<String>> {
        let term = term.trim();
        if term.is_empty() {
            return self.search_history().await;
        }

        let mut history = self.search_history().await?;
        history.retain(|t| t != term);
        history.insert(0, term.to_string());
        history.truncate(MAX_SEARCH_HISTORY);

        self.write_json(SEARCH_HISTORY_FILE, &history).await?;
        Ok(history)
    }

    /// Load the recognition history, most recent first.
    pub async fn recognition_history(&self) -> Result<Vec<RecognitionEntry>> {
        Ok(self
            .read_json::<Vec<RecognitionEntry>>(RECOGNITION_HISTORY_FILE)
            .await?
            .unwrap_or_default())
    }

    /// Record a recognition result, capped.
    pub async fn push_recognition(&self, entry: RecognitionEntry) -> Result<()> {
        let mut history = self.recognition_history().await?;
        history.insert(0, entry);
        history.truncate(MAX_RECOGNITION_HISTORY);
        self.write_json(RECOGNITION_HISTORY_FILE, &history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_settings_yield_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::new(tmp.path());

        let settings = store.load_view_settings().await.unwrap();
        assert_eq!(settings, ViewSettings::default());
    }

    #[tokio::test]
    async fn corrupt_settings_reset_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::new(tmp.path());

        tokio::fs::write(tmp.path().join(VIEW_SETTINGS_FILE), b"%%%")
            .await
            .unwrap();

        let settings = store.load_view_settings().await.unwrap();
        assert_eq!(settings, ViewSettings::default());

        // The store itself was rewritten, not left corrupted.
        let reloaded = store.load_view_settings().await.unwrap();
        assert_eq!(reloaded, ViewSettings::default());
    }

    #[tokio::test]
    async fn version_mismatch_merges_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::new(tmp.path());

        tokio::fs::write(
            tmp.path().join(VIEW_SETTINGS_FILE),
            br#"{"version": 1, "pinned_categories": ["AI"], "legacy_field": true}"#,
        )
        .await
        .unwrap();

        let settings = store.load_view_settings().await.unwrap();
        assert_eq!(settings.version, VIEW_SETTINGS_VERSION);
        assert_eq!(settings.pinned_categories, vec!["AI".to_string()]);
        assert_eq!(settings.months_ahead, 6);
    }

    #[tokio::test]
    async fn search_history_dedupes_and_caps() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::new(tmp.path());

        store.push_search("AAAI").await.unwrap();
        store.push_search("SOSP").await.unwrap();
        let history = store.push_search("AAAI").await.unwrap();
        assert_eq!(history, vec!["AAAI".to_string(), "SOSP".to_string()]);

        for i in 0..20 {
            store.push_search(&format!("conf{i}")).await.unwrap();
        }
        assert_eq!(store.search_history().await.unwrap().len(), MAX_SEARCH_HISTORY);
    }

    #[tokio::test]
    async fn blank_search_terms_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::new(tmp.path());

        let history = store.push_search("   ").await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn recognition_history_is_most_recent_first() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::new(tmp.path());

        for latex in ["a^2", "b^2"] {
            store
                .push_recognition(RecognitionEntry {
                    latex: latex.to_string(),
                    confidence: 0.9,
                    timestamp: Utc::now(),
                })
                .await
                .unwrap();
        }

        let history = store.recognition_history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].latex, "b^2");
    }
}
