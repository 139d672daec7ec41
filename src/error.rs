// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Error types for snaptriage

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for snaptriage operations
pub type Result<T> = std::result::Result<T, SnaptriageError>;

/// snaptriage error types
#[derive(Error, Debug)]
pub enum SnaptriageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Watched folder not found: {0}")]
    FolderNotFound(String),

    #[error("Watched folder not accessible: {0}")]
    PermissionDenied(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Text recognition error: {0}")]
    Recognition(String),

    #[error("Thumbnail error: {0}")]
    Thumbnail(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Screenshot not found: {0}")]
    NotFound(Uuid),

    #[error("Cloud analysis is disabled")]
    CloudDisabled,

    #[error("Cloud analysis blocked for sensitive content")]
    CloudBlocked,
}
