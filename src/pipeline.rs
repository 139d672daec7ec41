// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Wires the watcher, hasher, classifier and store together.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::classifier::TriageClassifier;
use crate::cloud::DeepAnalysisProvider;
use crate::config::AppConfig;
use crate::error::{Result, SnaptriageError};
use crate::hash;
use crate::model::{Screenshot, TriageResult};
use crate::store::ScreenshotStore;
use crate::thumbnail::Thumbnailer;
use crate::watcher::FolderWatcher;

/// Orchestrates the screenshot flow: new file → fingerprint → record →
/// thumbnail → triage → store. One pipeline per watched folder.
pub struct Pipeline {
    shared: Shared,
    watcher: FolderWatcher,
}

/// The pieces every per-file task needs a handle on.
#[derive(Clone)]
struct Shared {
    config: AppConfig,
    store: ScreenshotStore,
    classifier: Arc<TriageClassifier>,
    thumbnailer: Option<Arc<dyn Thumbnailer>>,
    cloud: Option<Arc<dyn DeepAnalysisProvider>>,
}

impl Pipeline {
    pub fn new(config: AppConfig, store: ScreenshotStore, classifier: TriageClassifier) -> Self {
        let watcher = FolderWatcher::new(
            Duration::from_secs(config.watcher.poll_interval_secs),
            config.watcher.extensions.clone(),
        );

        Self {
            shared: Shared {
                config,
                store,
                classifier: Arc::new(classifier),
                thumbnailer: None,
                cloud: None,
            },
            watcher,
        }
    }

    pub fn with_thumbnailer(mut self, thumbnailer: Arc<dyn Thumbnailer>) -> Self {
        self.shared.thumbnailer = Some(thumbnailer);
        self
    }

    pub fn with_cloud_provider(mut self, provider: Arc<dyn DeepAnalysisProvider>) -> Self {
        self.shared.cloud = Some(provider);
        self
    }

    /// Replace the polling interval taken from the configuration.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.watcher = FolderWatcher::new(
            poll_interval,
            self.shared.config.watcher.extensions.clone(),
        );
        self
    }

    pub fn store(&self) -> &ScreenshotStore {
        &self.shared.store
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_watching()
    }

    /// Start watching the configured folder. Each new file is processed as
    /// its own task; failures are logged and never stop the loop.
    pub async fn start_watching(&mut self) -> Result<()> {
        let folder = self
            .shared
            .config
            .watched_folder
            .clone()
            .ok_or_else(|| SnaptriageError::Config("No watched folder configured".to_string()))?;

        let shared = self.shared.clone();
        self.watcher
            .start_watching(&folder, move |path| {
                let shared = shared.clone();
                async move {
                    if let Err(e) = shared.ingest(&path, None).await {
                        error!("Failed to process {:?}: {}", path, e);
                    }
                }
            })
            .await
    }

    pub async fn stop_watching(&mut self) {
        self.watcher.stop_watching().await;
    }

    /// Fingerprint, record, thumbnail and triage one file. The record is
    /// saved before triage so it is visible even if classification fails.
    pub async fn ingest(&self, path: &Path, supplied_text: Option<&str>) -> Result<Screenshot> {
        self.shared.ingest(path, supplied_text).await
    }

    /// Classify a file without persisting anything.
    pub async fn triage(&self, path: &Path, supplied_text: Option<&str>) -> Result<TriageResult> {
        self.shared
            .classifier
            .classify(supplied_text.unwrap_or_default(), path)
            .await
    }

    /// Send a stored record to the deep analysis provider and persist the
    /// result. Refuses disabled configs, missing records and anything the
    /// local triage marked sensitive.
    pub async fn deep_analyze(&self, id: Uuid) -> Result<Screenshot> {
        self.shared.deep_analyze(id).await
    }
}

impl Shared {
    async fn ingest(&self, path: &Path, supplied_text: Option<&str>) -> Result<Screenshot> {
        info!("Processing screenshot: {:?}", path);

        let data = tokio::fs::read(path).await?;
        let content_hash = hash::fingerprint(&data);

        let mut screenshot = Screenshot::new(path.to_path_buf(), content_hash);
        self.store.save(&screenshot)?;

        if let Some(thumbnailer) = &self.thumbnailer {
            match thumbnailer.generate(&data) {
                Ok(bytes) => screenshot.thumbnail = Some(bytes),
                Err(e) => warn!("Thumbnail generation failed for {:?}: {}", path, e),
            }
        }

        match self
            .classifier
            .classify(supplied_text.unwrap_or_default(), path)
            .await
        {
            Ok(result) => {
                info!(
                    "Triaged {:?} as {} ({:.0}%)",
                    path,
                    result.category.key(),
                    result.confidence * 100.0
                );
                screenshot.triage = Some(result);
            }
            Err(e) => {
                // The record stays visible, just untriaged.
                warn!("Triage failed for {:?}: {}", path, e);
            }
        }

        self.store.save(&screenshot)?;
        Ok(screenshot)
    }

    async fn deep_analyze(&self, id: Uuid) -> Result<Screenshot> {
        if !self.config.cloud.enabled {
            return Err(SnaptriageError::CloudDisabled);
        }
        let Some(provider) = &self.cloud else {
            return Err(SnaptriageError::CloudDisabled);
        };

        let mut screenshot = self
            .store
            .fetch(id)?
            .ok_or(SnaptriageError::NotFound(id))?;

        if !screenshot.cloud_eligible() {
            return Err(SnaptriageError::CloudBlocked);
        }

        let text = screenshot
            .triage
            .as_ref()
            .map(|t| t.extracted_text.clone())
            .unwrap_or_default();

        let result = provider.analyze(&text, &screenshot.file_path).await?;
        info!(
            "Deep analysis of {} via {} (${:.4})",
            id,
            provider.name(),
            result.cost_usd
        );

        screenshot.deep_analysis = Some(result);
        self.store.save(&screenshot)?;
        Ok(screenshot)
    }
}
