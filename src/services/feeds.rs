// src/services/feeds.rs

//! Remote feed client.
//!
//! Fetches the two YAML documents (conference metadata, acceptance rates)
//! from their fixed origins. Both are fetched concurrently; either failing
//! fails the whole refresh cycle. The top level of each document must be a
//! sequence; individual malformed records are skipped, never aborting the
//! batch.

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::{AcceptanceRecord, ConferenceSeries, FeedConfig};
use crate::utils::http;

/// A fetched feed: raw text plus decoded records.
#[derive(Debug, Clone)]
pub struct FeedDocument<T> {
    /// Raw response text, kept for the content-hashed store
    pub raw: String,

    /// Successfully decoded records
    pub records: Vec<T>,

    /// Number of malformed records skipped during decode
    pub skipped: usize,
}

/// Client for the remote conference-data feeds.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    config: FeedConfig,
}

impl FeedClient {
    /// Create a feed client from configuration.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
            config: config.clone(),
        })
    }

    /// Fetch and decode the conference feed.
    pub async fn fetch_conferences(&self) -> Result<FeedDocument<ConferenceSeries>> {
        self.fetch_document(&self.config.conference_url, "conference feed")
            .await
    }

    /// Fetch and decode the acceptance-rate feed.
    pub async fn fetch_acceptances(&self) -> Result<FeedDocument<AcceptanceRecord>> {
        self.fetch_document(&self.config.acceptance_url, "acceptance feed")
            .await
    }

    /// Fetch both feeds concurrently; either failure fails the refresh.
    pub async fn fetch_both(
        &self,
    ) -> Result<(FeedDocument<ConferenceSeries>, FeedDocument<AcceptanceRecord>)> {
        futures::try_join!(self.fetch_conferences(), self.fetch_acceptances())
    }

    async fn fetch_document<T: DeserializeOwned>(
        &self,
        url: &str,
        context: &str,
    ) -> Result<FeedDocument<T>> {
        let raw = http::fetch_text(&self.client, url)
            .await
            .map_err(|e| AppError::fetch(context, e))?;

        let (records, skipped) = decode_records(&raw, context)?;
        if skipped > 0 {
            log::warn!("{context}: skipped {skipped} malformed records");
        }
        log::info!("{context}: decoded {} records", records.len());

        Ok(FeedDocument {
            raw,
            records,
            skipped,
        })
    }
}

/// Decode a YAML feed into records, skipping malformed elements.
///
/// A document whose top level is not a sequence is a hard failure.
pub fn decode_records<T: DeserializeOwned>(text: &str, context: &str) -> Result<(Vec<T>, usize)> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;

    let serde_yaml::Value::Sequence(items) = value else {
        return Err(AppError::fetch(context, "feed is not a sequence"));
    };

    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for (index, item) in items.into_iter().enumerate() {
        match serde_yaml::from_value(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                log::warn!("{context}: skipping malformed record #{index}: {e}");
            }
        }
    }

    Ok((records, skipped))
}
