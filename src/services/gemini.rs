//! Gemini-compatible vision inference (`:generateContent` with inline image data).

use std::path::Path;

use anyhow::Context as _;
use base64::Engine as _;
use reqwest::blocking::Client;
use serde_json::json;

use crate::error::{SpritemillError, SpritemillResult};

use super::VisionModel;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-pro-vision";

/// Blocking client for a Gemini-compatible `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl VisionModel for GeminiClient {
    fn describe(&self, prompt: &str, image_path: &Path) -> SpritemillResult<String> {
        let bytes = std::fs::read(image_path)
            .with_context(|| format!("read image '{}'", image_path.display()))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": prompt },
                    { "inline_data": { "mime_type": "image/png", "data": encoded } },
                ],
            }],
        });

        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/v1beta/models/{}:generateContent", self.model);
        let res = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| {
                SpritemillError::external(format!("vision inference request failed: {e}"))
            })?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().unwrap_or_default();
            return Err(SpritemillError::external(format!(
                "vision inference failed: {status}: {text}"
            )));
        }

        let raw: serde_json::Value = res.json().map_err(|e| {
            SpritemillError::external(format!("vision inference response was not valid JSON: {e}"))
        })?;
        let text = raw
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .and_then(|p| p.first())
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                SpritemillError::external(
                    "unexpected vision response shape (missing candidates[0].content.parts[0].text)",
                )
            })?;
        Ok(text.to_string())
    }
}
