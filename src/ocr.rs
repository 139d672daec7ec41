// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Text extraction from screenshot images
//!
//! The real engine is tesseract via leptess, behind the `ocr` feature so the
//! crate builds without the native library installed. Builds without the
//! feature fall back to a no-op extractor that still validates images.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::{AppConfig, Result};

#[cfg(feature = "ocr")]
use crate::SnaptriageError;

/// Trait for pluggable text extraction engines
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Name of this engine
    fn name(&self) -> &'static str;

    /// Extract text from an image file. Returns an empty string when the
    /// image contains no recognizable text.
    async fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Extractor that decodes the image but recognizes nothing
pub struct NoopExtractor;

#[async_trait]
impl TextExtractor for NoopExtractor {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn extract_text(&self, path: &Path) -> Result<String> {
        // Unreadable images must still surface an error
        image::open(path).map(|_| ())?;
        Ok(String::new())
    }
}

/// Tesseract-backed extractor, accuracy-first with English and German models
#[cfg(feature = "ocr")]
pub struct TesseractExtractor {
    /// Languages joined in tesseract syntax, e.g. "eng+deu"
    languages: String,
}

#[cfg(feature = "ocr")]
impl TesseractExtractor {
    /// Create an extractor recognizing the given tesseract language codes
    pub fn new(languages: &[String]) -> Self {
        Self {
            languages: languages.join("+"),
        }
    }
}

#[cfg(feature = "ocr")]
#[async_trait]
impl TextExtractor for TesseractExtractor {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn extract_text(&self, path: &Path) -> Result<String> {
        let languages = self.languages.clone();
        let path = path.to_path_buf();

        // leptess blocks, keep it off the async runtime
        let text = tokio::task::spawn_blocking(move || -> Result<String> {
            // Undecodable files are image errors, not engine errors
            image::open(&path).map(|_| ())?;

            let mut engine = leptess::LepTess::new(None, &languages)
                .map_err(|e| SnaptriageError::Recognition(format!("Engine init failed: {}", e)))?;
            engine.set_image(&path).map_err(|e| {
                SnaptriageError::Recognition(format!("Failed to read {:?}: {}", path, e))
            })?;
            engine
                .get_utf8_text()
                .map_err(|e| SnaptriageError::Recognition(format!("Recognition failed: {}", e)))
        })
        .await
        .map_err(|e| SnaptriageError::Recognition(format!("Extraction task failed: {}", e)))??;

        Ok(text.trim_end().to_string())
    }
}

/// Build the extractor for this configuration
#[cfg(feature = "ocr")]
pub fn default_extractor(config: &AppConfig) -> Arc<dyn TextExtractor> {
    Arc::new(TesseractExtractor::new(&config.ocr.languages))
}

/// Build the extractor for this configuration
#[cfg(not(feature = "ocr"))]
pub fn default_extractor(_config: &AppConfig) -> Arc<dyn TextExtractor> {
    tracing::warn!("Built without the ocr feature, text extraction is disabled");
    Arc::new(NoopExtractor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SnaptriageError;

    fn write_test_png(path: &Path) {
        image::RgbImage::new(4, 4).save(path).unwrap();
    }

    #[tokio::test]
    async fn test_noop_extractor_returns_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        write_test_png(&path);

        let text = NoopExtractor.extract_text(&path).await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_noop_extractor_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, "definitely not a png").unwrap();

        let result = NoopExtractor.extract_text(&path).await;
        assert!(matches!(result, Err(SnaptriageError::Image(_))));
    }

    // Decode failures must keep the image error kind even on the real
    // engine; recognition errors are for the engine itself.
    #[cfg(feature = "ocr")]
    #[tokio::test]
    async fn test_tesseract_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, "definitely not a png").unwrap();

        let extractor = TesseractExtractor::new(&["eng".to_string()]);
        let result = extractor.extract_text(&path).await;
        assert!(matches!(result, Err(SnaptriageError::Image(_))));
    }

    #[test]
    fn test_engine_names() {
        assert_eq!(NoopExtractor.name(), "noop");
    }
}
