// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Persistent screenshot store
//!
//! All records live in one JSON document on disk. The in-memory map is the
//! single logical owner; clones of the store share it behind a mutex, and
//! every mutation rewrites the document before the lock is released.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::model::{Category, Screenshot};
use crate::{Result, SnaptriageError};

/// Screenshot store (thread-safe wrapper)
#[derive(Clone)]
pub struct ScreenshotStore {
    inner: Arc<Mutex<StoreInner>>,
}

struct StoreInner {
    records: HashMap<Uuid, Screenshot>,
    path: PathBuf,
}

impl ScreenshotStore {
    /// Open or create the store document
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let records = load_records(&path);
        if !records.is_empty() {
            tracing::debug!("Loaded {} screenshots from {:?}", records.len(), path);
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(StoreInner { records, path })),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|_| SnaptriageError::Storage("Store lock poisoned".to_string()))
    }

    /// Insert or update a record and rewrite the document
    pub fn save(&self, screenshot: &Screenshot) -> Result<()> {
        let mut inner = self.lock()?;
        inner.records.insert(screenshot.id, screenshot.clone());
        persist(&inner)
    }

    /// Fetch a single record by id
    pub fn fetch(&self, id: Uuid) -> Result<Option<Screenshot>> {
        Ok(self.lock()?.records.get(&id).cloned())
    }

    /// All records, newest first
    pub fn fetch_all(&self) -> Result<Vec<Screenshot>> {
        let inner = self.lock()?;
        let mut all: Vec<Screenshot> = inner.records.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    /// Records triaged into the given category, newest first
    pub fn fetch_by_category(&self, category: Category) -> Result<Vec<Screenshot>> {
        let inner = self.lock()?;
        let mut matched: Vec<Screenshot> = inner
            .records
            .values()
            .filter(|s| s.triage.as_ref().map(|t| t.category) == Some(category))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    /// Case-insensitive substring search over extracted text, newest first.
    /// Untriaged records never match.
    pub fn search(&self, query: &str) -> Result<Vec<Screenshot>> {
        let needle = query.to_lowercase();
        let inner = self.lock()?;
        let mut matched: Vec<Screenshot> = inner
            .records
            .values()
            .filter(|s| {
                s.triage
                    .as_ref()
                    .map(|t| t.extracted_text.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    /// Remove a record. Absent ids are a no-op that skips the disk write.
    pub fn delete(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.lock()?;
        if inner.records.remove(&id).is_some() {
            persist(&inner)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Number of stored records
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.records.len())
    }

    /// Check if the store holds no records
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.records.is_empty())
    }
}

/// Load the document, or start empty when it is missing or unreadable
fn load_records(path: &Path) -> HashMap<Uuid, Screenshot> {
    if !path.exists() {
        return HashMap::new();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<Vec<Screenshot>>(&content) {
            Ok(list) => list.into_iter().map(|s| (s.id, s)).collect(),
            Err(e) => {
                tracing::warn!("Failed to parse screenshot document, starting empty: {}", e);
                HashMap::new()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read screenshot document, starting empty: {}", e);
            HashMap::new()
        }
    }
}

/// Rewrite the whole document: sibling tmp file, then rename over the old one
fn persist(inner: &StoreInner) -> Result<()> {
    let mut records: Vec<&Screenshot> = inner.records.values().collect();
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let json = serde_json::to_string_pretty(&records)?;

    let tmp = inner.path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, &inner.path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TriageResult;
    use chrono::{Duration, Utc};
    use std::collections::BTreeMap;

    fn triaged_shot(text: &str, category: Category, minutes_ago: i64) -> Screenshot {
        let mut shot = Screenshot::new(
            PathBuf::from(format!("/tmp/{}.png", text.len())),
            format!("hash-{}", text.len()),
        );
        shot.created_at = Utc::now() - Duration::minutes(minutes_ago);
        shot.triage = Some(TriageResult {
            category,
            confidence: 0.5,
            extracted_text: text.to_string(),
            entities: BTreeMap::new(),
            sensitivity_flags: vec![],
            processing_time_ms: 1,
        });
        shot
    }

    fn open_store(dir: &tempfile::TempDir) -> ScreenshotStore {
        ScreenshotStore::open(dir.path().join("screenshots.json")).unwrap()
    }

    #[test]
    fn test_save_and_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let shot = triaged_shot("groceries receipt", Category::ReceiptInvoice, 0);
        store.save(&shot).unwrap();

        assert_eq!(store.fetch(shot.id).unwrap(), Some(shot));
        assert_eq!(store.fetch(Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screenshots.json");

        let shot = triaged_shot("meeting notes", Category::TodoNote, 0);
        {
            let store = ScreenshotStore::open(&path).unwrap();
            store.save(&shot).unwrap();
        }

        let reopened = ScreenshotStore::open(&path).unwrap();
        assert_eq!(reopened.fetch(shot.id).unwrap(), Some(shot));
    }

    #[test]
    fn test_saving_same_id_updates_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let mut shot = triaged_shot("draft", Category::Other, 0);
        store.save(&shot).unwrap();

        shot.triage = Some(TriageResult {
            category: Category::TodoNote,
            confidence: 0.8,
            extracted_text: "todo later".to_string(),
            entities: BTreeMap::new(),
            sensitivity_flags: vec![],
            processing_time_ms: 2,
        });
        store.save(&shot).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        let fetched = store.fetch(shot.id).unwrap().unwrap();
        assert_eq!(
            fetched.triage.as_ref().map(|t| t.category),
            Some(Category::TodoNote)
        );
    }

    #[test]
    fn test_fetch_all_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let old = triaged_shot("old", Category::Other, 60);
        let new = triaged_shot("new", Category::Other, 1);
        store.save(&old).unwrap();
        store.save(&new).unwrap();

        let all = store.fetch_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, new.id);
        assert_eq!(all[1].id, old.id);
    }

    #[test]
    fn test_fetch_by_category_filters() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        store
            .save(&triaged_shot("receipt one", Category::ReceiptInvoice, 10))
            .unwrap();
        store
            .save(&triaged_shot("note one", Category::TodoNote, 5))
            .unwrap();

        let untriaged = Screenshot::new(PathBuf::from("/tmp/raw.png"), "raw".to_string());
        store.save(&untriaged).unwrap();

        let receipts = store.fetch_by_category(Category::ReceiptInvoice).unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(
            receipts[0].triage.as_ref().map(|t| t.category),
            Some(Category::ReceiptInvoice)
        );

        assert!(store
            .fetch_by_category(Category::DesignInspo)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_and_skips_untriaged() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        store
            .save(&triaged_shot("Lunch MEETING tomorrow", Category::EventAppointment, 2))
            .unwrap();
        store
            .save(&Screenshot::new(
                PathBuf::from("/tmp/raw.png"),
                "raw".to_string(),
            ))
            .unwrap();

        let hits = store.search("meeting").unwrap();
        assert_eq!(hits.len(), 1);

        assert!(store.search("zebra").unwrap().is_empty());
    }

    #[test]
    fn test_delete_persists_and_reports_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screenshots.json");
        let store = ScreenshotStore::open(&path).unwrap();

        let shot = triaged_shot("delete me", Category::Other, 0);
        store.save(&shot).unwrap();

        assert!(store.delete(shot.id).unwrap());
        assert!(!store.delete(shot.id).unwrap());

        let reopened = ScreenshotStore::open(&path).unwrap();
        assert!(reopened.is_empty().unwrap());
    }

    #[test]
    fn test_corrupt_document_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screenshots.json");
        std::fs::write(&path, "{{{ not json").unwrap();

        let store = ScreenshotStore::open(&path).unwrap();
        assert!(store.is_empty().unwrap());

        // The next save replaces the broken document
        store
            .save(&triaged_shot("fresh", Category::Other, 0))
            .unwrap();
        let reopened = ScreenshotStore::open(&path).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
    }

    #[test]
    fn test_no_leftover_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screenshots.json");
        let store = ScreenshotStore::open(&path).unwrap();

        store
            .save(&triaged_shot("anything", Category::Other, 0))
            .unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_clones_share_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let clone = store.clone();

        let shot = triaged_shot("shared", Category::Other, 0);
        clone.save(&shot).unwrap();

        assert_eq!(store.fetch(shot.id).unwrap(), Some(shot));
    }
}
