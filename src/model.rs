// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Core domain types for screenshots and their analysis results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Screenshot categories with stable serialized keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    ReceiptInvoice,
    EventAppointment,
    TodoNote,
    DesignInspo,
    DocumentResearch,
    ChatCommunication,
    SensitivePrivate,
    Other,
}

impl Category {
    /// All categories in scoring order. When two categories score equally,
    /// the one listed first wins.
    pub const ALL: [Category; 8] = [
        Category::ReceiptInvoice,
        Category::EventAppointment,
        Category::TodoNote,
        Category::DesignInspo,
        Category::DocumentResearch,
        Category::ChatCommunication,
        Category::SensitivePrivate,
        Category::Other,
    ];

    /// Stable key used in the persisted document and CLI filters
    pub fn key(&self) -> &'static str {
        match self {
            Category::ReceiptInvoice => "receiptInvoice",
            Category::EventAppointment => "eventAppointment",
            Category::TodoNote => "todoNote",
            Category::DesignInspo => "designInspo",
            Category::DocumentResearch => "documentResearch",
            Category::ChatCommunication => "chatCommunication",
            Category::SensitivePrivate => "sensitivePrivate",
            Category::Other => "other",
        }
    }

    /// Parse a stable key back into a category
    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.key() == key)
    }

    /// Keywords scored during classification (English and German)
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::ReceiptInvoice => &[
                "total", "tax", "subtotal", "invoice", "receipt", "payment", "$", "€", "£",
                "amount", "qty", "price", "rechnung", "betrag",
            ],
            Category::EventAppointment => &[
                "calendar",
                "meeting",
                "appointment",
                "event",
                "schedule",
                "termin",
                "besprechung",
                "am",
                "pm",
            ],
            Category::TodoNote => &[
                "todo",
                "task",
                "reminder",
                "note",
                "checklist",
                "aufgabe",
                "erinnerung",
                "notiz",
            ],
            Category::DesignInspo => {
                &["design", "ui", "ux", "figma", "sketch", "prototype", "mockup"]
            }
            Category::DocumentResearch => &[
                "abstract",
                "introduction",
                "conclusion",
                "references",
                "section",
                "chapter",
                "einleitung",
                "zusammenfassung",
            ],
            Category::ChatCommunication => &[
                "sent",
                "delivered",
                "read",
                "typing",
                "message",
                "gesendet",
                "zugestellt",
                "gelesen",
            ],
            Category::SensitivePrivate => &[
                "password",
                "ssn",
                "credit card",
                "cvv",
                "passwort",
                "geheim",
                "vertraulich",
            ],
            Category::Other => &[],
        }
    }

    /// Whether this category withholds cloud analysis by default
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Category::SensitivePrivate)
    }
}

/// Kinds of sensitive content the classifier can flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityFlag {
    CreditCard,
    Password,
    Ssn,
    Banking,
}

impl SensitivityFlag {
    /// Stable key used in the persisted document
    pub fn key(&self) -> &'static str {
        match self {
            SensitivityFlag::CreditCard => "credit_card",
            SensitivityFlag::Password => "password",
            SensitivityFlag::Ssn => "ssn",
            SensitivityFlag::Banking => "banking",
        }
    }
}

/// Result of local triage (text extraction, classification, sensitivity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageResult {
    /// Assigned category
    pub category: Category,
    /// Classification confidence (0.0 - 1.0)
    pub confidence: f64,
    /// Text recovered from the image
    pub extracted_text: String,
    /// Detected entities, keyed `date_0`, `amount_0`, `phone_0`, ...
    pub entities: BTreeMap<String, String>,
    /// Sensitivity flags in detection order
    pub sensitivity_flags: Vec<SensitivityFlag>,
    /// Time spent producing this result
    pub processing_time_ms: u64,
}

impl TriageResult {
    /// Whether any sensitive content was flagged
    pub fn is_sensitive(&self) -> bool {
        !self.sensitivity_flags.is_empty()
    }
}

/// Result of optional cloud-backed deep analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepAnalysisResult {
    /// Model that produced the analysis
    pub model: String,
    /// Detailed description of the screenshot
    pub description: String,
    /// Suggested follow-up actions
    #[serde(default)]
    pub suggested_actions: Vec<SuggestedAction>,
    /// Additional insights
    #[serde(default)]
    pub insights: Vec<String>,
    /// Cost of this analysis in USD
    pub cost_usd: f64,
    /// Time spent producing this result
    pub processing_time_ms: u64,
}

/// An action suggested from screenshot content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestedAction {
    #[serde(rename_all = "camelCase")]
    CreateReminder {
        title: String,
        notes: Option<String>,
        due_date: Option<DateTime<Utc>>,
    },
    #[serde(rename_all = "camelCase")]
    CreateCalendarEvent {
        title: String,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
        location: Option<String>,
    },
    ExportText {
        text: String,
    },
    Archive,
    Ignore,
}

impl SuggestedAction {
    /// Localization key for the action title
    pub fn title_key(&self) -> &'static str {
        match self {
            SuggestedAction::CreateReminder { .. } => "action.createReminder",
            SuggestedAction::CreateCalendarEvent { .. } => "action.createEvent",
            SuggestedAction::ExportText { .. } => "action.exportText",
            SuggestedAction::Archive => "action.archive",
            SuggestedAction::Ignore => "action.ignore",
        }
    }
}

/// A screenshot file with its metadata and analysis results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub id: Uuid,
    pub file_path: PathBuf,
    pub created_at: DateTime<Utc>,
    /// Content fingerprint (blake3 hex)
    pub content_hash: String,
    /// JPEG thumbnail bytes, base64 in the persisted document
    #[serde(
        default,
        with = "thumbnail_bytes",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail: Option<Vec<u8>>,
    /// Local triage result, absent until classification completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triage: Option<TriageResult>,
    /// Cloud deep-analysis result, absent unless requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_analysis: Option<DeepAnalysisResult>,
}

impl Screenshot {
    /// Create a record for a freshly detected file
    pub fn new(file_path: PathBuf, content_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_path,
            created_at: Utc::now(),
            content_hash,
            thumbnail: None,
            triage: None,
            deep_analysis: None,
        }
    }

    /// Whether triage flagged sensitive content or a sensitive category
    pub fn is_sensitive(&self) -> bool {
        match &self.triage {
            Some(t) => t.is_sensitive() || t.category.is_sensitive(),
            None => false,
        }
    }

    /// Whether this record may be sent for cloud analysis. Untriaged
    /// records are not eligible since nothing has screened them yet.
    pub fn cloud_eligible(&self) -> bool {
        matches!(&self.triage, Some(t) if !t.is_sensitive() && !t.category.is_sensitive())
    }
}

/// Thumbnail bytes serialize as base64 so the persisted document stays text
mod thumbnail_bytes {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(data) => general_purpose::STANDARD.encode(data).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(s) => general_purpose::STANDARD
                .decode(s.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
