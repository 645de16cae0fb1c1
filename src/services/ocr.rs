// src/services/ocr.rs

//! LaTeX OCR vendor boundary.
//!
//! One POST endpoint accepting multipart form data with a single image file
//! and a token header. The wire shape is validated immediately after
//! deserialization; nothing loosely-typed flows past this module.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};

const VENDOR: &str = "OCR";

/// Raw wire shape of the vendor response.
#[derive(Debug, Deserialize)]
struct OcrResponse {
    status: bool,
    res: Option<OcrPayload>,
}

#[derive(Debug, Deserialize)]
struct OcrPayload {
    latex: String,
    conf: f64,
}

/// A validated recognition result.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub latex: String,

    /// Confidence fraction in 0..=1
    pub confidence: f64,
}

impl Recognition {
    /// Confidence as a display percentage.
    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

/// Client for the LaTeX OCR endpoint.
#[derive(Debug, Clone)]
pub struct OcrClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl OcrClient {
    pub fn new(client: Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    /// Submit an image for recognition.
    pub async fn recognize(&self, image: Vec<u8>, filename: &str) -> Result<Recognition> {
        let part = reqwest::multipart::Part::bytes(image).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .header("token", &self.token)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let body: OcrResponse = response
            .json()
            .await
            .map_err(|e| AppError::vendor(VENDOR, format!("unexpected response shape: {e}")))?;

        validate(body)
    }
}

/// Validate the wire response into a `Recognition`.
fn validate(body: OcrResponse) -> Result<Recognition> {
    let payload = match body {
        OcrResponse {
            status: true,
            res: Some(payload),
        } => payload,
        _ => return Err(AppError::vendor(VENDOR, "recognition failed")),
    };

    if !(0.0..=1.0).contains(&payload.conf) {
        return Err(AppError::vendor(
            VENDOR,
            format!("confidence out of range: {}", payload.conf),
        ));
    }

    Ok(Recognition {
        latex: payload.latex,
        confidence: payload.conf,
    })
}
