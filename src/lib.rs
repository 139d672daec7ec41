// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Snaptriage: local screenshot triage
//!
//! Watches a folder for new screenshots, extracts their text, classifies
//! them into categories with entity and sensitivity detection, and keeps
//! every record in a durable JSON store.

pub mod classifier;
pub mod cloud;
pub mod config;
pub mod error;
pub mod hash;
pub mod model;
pub mod ocr;
pub mod pipeline;
pub mod store;
pub mod thumbnail;
pub mod watcher;

pub use classifier::TriageClassifier;
pub use config::AppConfig;
pub use error::{Result, SnaptriageError};
pub use model::{Category, Screenshot, SensitivityFlag, TriageResult};
pub use pipeline::Pipeline;
pub use store::ScreenshotStore;
pub use watcher::FolderWatcher;
