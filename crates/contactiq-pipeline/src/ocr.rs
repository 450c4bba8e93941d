//! OCR engine seam and the three fixed recognition profiles.
//!
//! Actual character recognition is an external collaborator behind the
//! [`OcrEngine`] trait. The profiles encode a cheap-to-thorough ladder the
//! runner walks through under per-strategy deadlines.

use async_trait::async_trait;
use contactiq_core::{Error, Result};
use tracing::warn;

/// One recognition attempt configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrProfile {
    pub name: &'static str,
    /// Longest side after downscaling; `None` keeps the original size.
    pub max_dimension: Option<u32>,
    pub grayscale: bool,
    pub contrast_boost: bool,
    /// Engine-specific mode string handed through untouched.
    pub recognition_mode: &'static str,
}

impl OcrProfile {
    /// Cheapest pass: aggressive downscale, block segmentation.
    pub fn fast() -> Self {
        Self {
            name: "fast",
            max_dimension: Some(800),
            grayscale: true,
            contrast_boost: false,
            recognition_mode: "--psm 6 --oem 1",
        }
    }

    /// Higher resolution with contrast enhancement.
    pub fn enhanced() -> Self {
        Self {
            name: "enhanced",
            max_dimension: Some(1200),
            grayscale: true,
            contrast_boost: true,
            recognition_mode: "--psm 6 --oem 3",
        }
    }

    /// Full-size last resort with column segmentation.
    pub fn fallback() -> Self {
        Self {
            name: "fallback",
            max_dimension: None,
            grayscale: true,
            contrast_boost: false,
            recognition_mode: "--psm 4 --oem 1",
        }
    }

    /// The fixed strategy ladder, cheapest first.
    pub fn ladder() -> Vec<OcrProfile> {
        vec![Self::fast(), Self::enhanced(), Self::fallback()]
    }
}

/// External OCR collaborator. Implementations must be cancel-safe; the
/// runner drops the future on deadline.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8], profile: &OcrProfile) -> Result<String>;

    /// Whether this engine can produce output at all.
    fn is_available(&self) -> bool {
        true
    }
}

/// OCR over HTTP against a standalone recognition service.
///
/// The service takes raw image bytes and the profile parameters as query
/// arguments and answers `{ "text": "..." }`.
pub struct RemoteOcr {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteOcr {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl OcrEngine for RemoteOcr {
    async fn recognize(&self, image: &[u8], profile: &OcrProfile) -> Result<String> {
        let mut url = format!(
            "{}/recognize?profile={}&mode={}",
            self.base_url,
            profile.name,
            urlencode(profile.recognition_mode),
        );
        if let Some(dim) = profile.max_dimension {
            url.push_str(&format!("&max_dimension={}", dim));
        }

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| Error::Ocr(format!("OCR service unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Ocr(format!(
                "OCR service returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Ocr(format!("OCR service bad response: {}", e)))?;
        Ok(body["text"].as_str().unwrap_or_default().to_string())
    }
}

fn urlencode(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            ' ' => "%20".chars().collect::<Vec<_>>(),
            c => vec![c],
        })
        .collect()
}

/// Stand-in engine for deployments without OCR. Always returns empty text.
pub struct DisabledOcr;

#[async_trait]
impl OcrEngine for DisabledOcr {
    async fn recognize(&self, _image: &[u8], profile: &OcrProfile) -> Result<String> {
        warn!("OCR disabled, skipping profile {}", profile.name);
        Ok(String::new())
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_order() {
        let ladder = OcrProfile::ladder();
        let names: Vec<&str> = ladder.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["fast", "enhanced", "fallback"]);
    }

    #[test]
    fn test_fallback_keeps_original_size() {
        assert_eq!(OcrProfile::fallback().max_dimension, None);
        assert_eq!(OcrProfile::fast().max_dimension, Some(800));
        assert_eq!(OcrProfile::enhanced().max_dimension, Some(1200));
    }

    #[test]
    fn test_mode_string_urlencoded() {
        assert_eq!(urlencode("--psm 6 --oem 1"), "--psm%206%20--oem%201");
    }

    #[tokio::test]
    async fn test_disabled_engine_is_empty_and_unavailable() {
        let engine = DisabledOcr;
        assert!(!engine.is_available());
        let text = engine
            .recognize(b"bytes", &OcrProfile::fast())
            .await
            .unwrap();
        assert!(text.is_empty());
    }
}
