// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Deep analysis provider boundary

use crate::error::Result;
use crate::model::DeepAnalysisResult;
use async_trait::async_trait;
use std::path::Path;

/// A richer, slower analysis backend, typically a hosted vision model.
///
/// This crate ships no implementation. The pipeline gates every call:
/// cloud analysis must be enabled in the configuration, and records with
/// sensitivity findings are never sent out.
#[async_trait]
pub trait DeepAnalysisProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Analyze a screenshot given its extracted text and image file.
    async fn analyze(&self, extracted_text: &str, image: &Path) -> Result<DeepAnalysisResult>;
}
