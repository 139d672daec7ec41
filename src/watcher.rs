// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 snaptriage contributors

//! Polling watcher that reports files added to a folder after watching began.

use crate::error::{Result, SnaptriageError};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::collections::HashSet;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

type NewFileCallback = Arc<dyn Fn(PathBuf) -> BoxFuture<'static, ()> + Send + Sync>;

/// Watches a folder by re-listing it on a fixed interval.
///
/// Files already present when watching starts are never reported, and each
/// file name is reported at most once per watching session. Stopping and
/// restarting begins a fresh session with a fresh snapshot of the folder.
pub struct FolderWatcher {
    poll_interval: Duration,
    extensions: Vec<String>,
    handle: Option<WatchHandle>,
}

struct WatchHandle {
    folder: PathBuf,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl FolderWatcher {
    pub fn new(poll_interval: Duration, extensions: Vec<String>) -> Self {
        Self {
            poll_interval,
            extensions,
            handle: None,
        }
    }

    pub fn is_watching(&self) -> bool {
        self.handle.is_some()
    }

    /// Start polling `folder`, invoking `on_new_file` once for each matching
    /// file that appears. Returns immediately if already watching.
    pub async fn start_watching<F, Fut>(&mut self, folder: &Path, on_new_file: F) -> Result<()>
    where
        F: Fn(PathBuf) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.handle.is_some() {
            return Ok(());
        }

        validate_folder(folder).await?;

        // Snapshot every name already present, matching or not, so only
        // files that arrive after this point are ever reported.
        let mut seen = HashSet::new();
        let mut dir = read_dir(folder).await?;
        while let Some(entry) = dir.next_entry().await? {
            seen.insert(entry.file_name().to_string_lossy().to_string());
        }

        info!("Watching folder: {:?}", folder);

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let callback: NewFileCallback = Arc::new(move |path| on_new_file(path).boxed());
        let poll_interval = self.poll_interval;
        let extensions = self.extensions.clone();
        let watched = folder.to_path_buf();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        poll_folder(&watched, &extensions, &mut seen, &callback, &shutdown_rx).await;
                    }
                    // Completes on stop_watching, and also when the watcher
                    // itself is dropped with the loop still running.
                    _ = shutdown_rx.changed() => {
                        break;
                    }
                }
            }

            debug!("Watcher loop ended for {:?}", watched);
        });

        self.handle = Some(WatchHandle {
            folder: folder.to_path_buf(),
            shutdown: shutdown_tx,
            task,
        });
        Ok(())
    }

    /// Stop polling. No further callbacks are dispatched after this
    /// returns; callbacks already running may finish.
    pub async fn stop_watching(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        let _ = handle.shutdown.send(true);
        if let Err(e) = handle.task.await {
            warn!("Watcher task ended abnormally: {}", e);
        }

        info!("Stopped watching: {:?}", handle.folder);
    }
}

async fn validate_folder(folder: &Path) -> Result<()> {
    let metadata = match tokio::fs::metadata(folder).await {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SnaptriageError::FolderNotFound(folder.display().to_string()));
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(SnaptriageError::PermissionDenied(
                folder.display().to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_dir() {
        return Err(SnaptriageError::FolderNotFound(folder.display().to_string()));
    }

    Ok(())
}

async fn read_dir(folder: &Path) -> Result<tokio::fs::ReadDir> {
    tokio::fs::read_dir(folder).await.map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => {
            SnaptriageError::PermissionDenied(folder.display().to_string())
        }
        _ => SnaptriageError::FileSystem(e),
    })
}

/// One polling pass: list the folder and dispatch the callback for every
/// matching file name not seen before in this session. Dispatches run as
/// their own tasks so a slow callback never delays the next pass.
async fn poll_folder(
    folder: &Path,
    extensions: &[String],
    seen: &mut HashSet<String>,
    callback: &NewFileCallback,
    shutdown: &watch::Receiver<bool>,
) {
    let mut dir = match tokio::fs::read_dir(folder).await {
        Ok(dir) => dir,
        Err(e) => {
            warn!("Failed to list watched folder {:?}: {}", folder, e);
            return;
        }
    };

    loop {
        let entry = match dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read entry in {:?}: {}", folder, e);
                break;
            }
        };

        let path = entry.path();
        if !matches_extension(&path, extensions) {
            continue;
        }
        match entry.file_type().await {
            Ok(t) if t.is_file() => {}
            _ => continue,
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if !seen.insert(name) {
            continue;
        }

        if *shutdown.borrow() {
            break;
        }

        debug!("New file detected: {:?}", path);
        tokio::spawn(callback(path));
    }
}

pub fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const FAST_POLL: Duration = Duration::from_millis(25);

    fn png_watcher() -> FolderWatcher {
        FolderWatcher::new(FAST_POLL, vec!["png".to_string()])
    }

    fn recorder() -> (
        Arc<Mutex<Vec<PathBuf>>>,
        impl Fn(PathBuf) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    ) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let callback = move |path: PathBuf| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(path);
            }
            .boxed()
        };
        (log, callback)
    }

    async fn settle() {
        tokio::time::sleep(FAST_POLL * 8).await;
    }

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"fake png bytes").unwrap();
        path
    }

    #[test]
    fn test_matches_extension_is_case_insensitive() {
        let extensions = vec!["png".to_string()];
        assert!(matches_extension(Path::new("/tmp/shot.png"), &extensions));
        assert!(matches_extension(Path::new("/tmp/SHOT.PNG"), &extensions));
        assert!(!matches_extension(Path::new("/tmp/notes.txt"), &extensions));
        assert!(!matches_extension(Path::new("/tmp/noext"), &extensions));
    }

    #[tokio::test]
    async fn test_preexisting_files_are_not_reported() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "before.png");

        let (log, callback) = recorder();
        let mut watcher = png_watcher();
        watcher.start_watching(dir.path(), callback).await.unwrap();

        settle().await;
        let after = touch(&dir, "after.png");
        settle().await;

        watcher.stop_watching().await;
        assert_eq!(*log.lock().unwrap(), vec![after]);
    }

    #[tokio::test]
    async fn test_each_file_is_reported_once() {
        let dir = TempDir::new().unwrap();
        let (log, callback) = recorder();
        let mut watcher = png_watcher();
        watcher.start_watching(dir.path(), callback).await.unwrap();

        touch(&dir, "shot.png");
        settle().await;
        settle().await;

        watcher.stop_watching().await;
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_other_extensions_are_ignored() {
        let dir = TempDir::new().unwrap();
        let (log, callback) = recorder();
        let mut watcher = png_watcher();
        watcher.start_watching(dir.path(), callback).await.unwrap();

        touch(&dir, "notes.txt");
        let upper = touch(&dir, "SHOT.PNG");
        settle().await;

        watcher.stop_watching().await;
        assert_eq!(*log.lock().unwrap(), vec![upper]);
    }

    #[tokio::test]
    async fn test_no_callbacks_after_stop() {
        let dir = TempDir::new().unwrap();
        let (log, callback) = recorder();
        let mut watcher = png_watcher();
        watcher.start_watching(dir.path(), callback).await.unwrap();
        watcher.stop_watching().await;

        touch(&dir, "late.png");
        settle().await;

        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restart_snapshots_the_folder_again() {
        let dir = TempDir::new().unwrap();
        let (log, callback) = recorder();
        let mut watcher = png_watcher();

        watcher.start_watching(dir.path(), callback).await.unwrap();
        let first = touch(&dir, "first.png");
        settle().await;
        watcher.stop_watching().await;

        // Added while stopped, so it is part of the next snapshot.
        touch(&dir, "while_stopped.png");

        let (second_log, callback) = recorder();
        watcher.start_watching(dir.path(), callback).await.unwrap();
        settle().await;
        let second = touch(&dir, "second.png");
        settle().await;
        watcher.stop_watching().await;

        assert_eq!(*log.lock().unwrap(), vec![first]);
        assert_eq!(*second_log.lock().unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let (_, callback) = recorder();
        let mut watcher = png_watcher();

        watcher.start_watching(dir.path(), callback).await.unwrap();
        assert!(watcher.is_watching());

        let (_, callback) = recorder();
        watcher.start_watching(dir.path(), callback).await.unwrap();

        watcher.stop_watching().await;
        assert!(!watcher.is_watching());
    }

    #[tokio::test]
    async fn test_missing_folder_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let (_, callback) = recorder();
        let mut watcher = png_watcher();
        let result = watcher.start_watching(&missing, callback).await;
        assert!(matches!(result, Err(SnaptriageError::FolderNotFound(_))));
    }

    #[tokio::test]
    async fn test_file_path_is_not_a_folder() {
        let dir = TempDir::new().unwrap();
        let file = touch(&dir, "plain.png");

        let (_, callback) = recorder();
        let mut watcher = png_watcher();
        let result = watcher.start_watching(&file, callback).await;
        assert!(matches!(result, Err(SnaptriageError::FolderNotFound(_))));
    }
}
