//! OpenAI-compatible image generation (`/v1/images/generations`).

use reqwest::blocking::Client;
use serde_json::json;

use crate::error::{SpritemillError, SpritemillResult};

use super::ImageGenerator;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const IMAGE_MODEL: &str = "dall-e-3";

/// Blocking client for an OpenAI-compatible image-generation endpoint.
pub struct DallEClient {
    client: Client,
    base_url: String,
    api_key: String,
    organization: Option<String>,
}

impl DallEClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            organization: None,
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }
}

impl ImageGenerator for DallEClient {
    fn generate(&self, prompt: &str, size: &str, quality: &str) -> SpritemillResult<String> {
        #[derive(serde::Deserialize)]
        struct ImageData {
            url: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ImagesResponse {
            data: Vec<ImageData>,
        }

        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/v1/images/generations");
        let body = json!({
            "model": IMAGE_MODEL,
            "prompt": prompt,
            "size": size,
            "quality": quality,
            "n": 1,
        });

        let mut req = self.client.post(url).bearer_auth(&self.api_key).json(&body);
        if let Some(org) = &self.organization {
            req = req.header("OpenAI-Organization", org);
        }

        let res = req.send().map_err(|e| {
            SpritemillError::external(format!("image generation request failed: {e}"))
        })?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().unwrap_or_default();
            return Err(SpritemillError::external(format!(
                "image generation failed: {status}: {text}"
            )));
        }

        let parsed: ImagesResponse = res.json().map_err(|e| {
            SpritemillError::external(format!("image generation response was not valid JSON: {e}"))
        })?;
        parsed
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or_else(|| {
                SpritemillError::external("image generation response contained no image URL")
            })
    }
}
