// src/services/ranking.rs

//! Publication ranking vendor boundary.
//!
//! One GET endpoint taking a secret key and a free-text publication name,
//! returning nested ranks keyed by ranking-system abbreviation. Shape is
//! validated at the boundary; failures surface as "query failed" messages.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};

const VENDOR: &str = "ranking";

/// Raw wire shape of the vendor response.
#[derive(Debug, Deserialize)]
struct RankingResponse {
    code: i32,
    #[serde(default)]
    msg: String,
    data: Option<RankingData>,
}

#[derive(Debug, Deserialize)]
struct RankingData {
    #[serde(rename = "officialRank", default)]
    official: OfficialRank,
}

#[derive(Debug, Default, Deserialize)]
struct OfficialRank {
    #[serde(default)]
    all: HashMap<String, String>,
}

/// Validated rank lookup result.
#[derive(Debug, Clone)]
pub struct RankLookup {
    /// The queried publication name
    pub name: String,

    /// Rank per ranking-system abbreviation (e.g. "ccf" -> "A")
    pub ranks: HashMap<String, String>,
}

/// Client for the ranking lookup endpoint.
#[derive(Debug, Clone)]
pub struct RankingClient {
    client: Client,
    endpoint: String,
    secret_key: String,
}

impl RankingClient {
    pub fn new(client: Client, endpoint: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Look up ranks for a publication name.
    pub async fn lookup(&self, name: &str) -> Result<RankLookup> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("secretKey", self.secret_key.as_str()), ("publicationName", name)])
            .send()
            .await?
            .error_for_status()?;

        let body: RankingResponse = response
            .json()
            .await
            .map_err(|e| AppError::vendor(VENDOR, format!("query failed: {e}")))?;

        validate(name, body)
    }
}

/// Validate the wire response into a `RankLookup`.
fn validate(name: &str, body: RankingResponse) -> Result<RankLookup> {
    if body.code != 200 {
        return Err(AppError::vendor(
            VENDOR,
            format!("query failed: {} ({})", body.msg, body.code),
        ));
    }

    let data = body
        .data
        .ok_or_else(|| AppError::vendor(VENDOR, "query failed: empty payload"))?;

    Ok(RankLookup {
        name: name.to_string(),
        ranks: data.official.all,
    })
}
