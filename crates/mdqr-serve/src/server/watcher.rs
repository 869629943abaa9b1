//! File watching for the served document.
//!
//! The parent directory is watched rather than the file itself so that
//! editors which save by writing a temp file and renaming it over the
//! original keep producing events.

use crate::error::{Result, ServeError};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Pending changes buffered between the notify thread and the pump.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A burst that never goes quiet still fires once every this many debounce
/// windows.
const MAX_WAIT_FACTOR: u32 = 4;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

/// Watches one file and sends its changes through a channel.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl FileWatcher {
    /// Create a watcher for `path`.
    ///
    /// # Returns
    ///
    /// Tuple of (FileWatcher, receiver for change events)
    ///
    /// # Errors
    ///
    /// Returns error if `path` has no parent directory or the watch cannot be installed
    pub fn new(path: &Path) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| ServeError::FileNotFound(path.to_path_buf()))?;
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| ServeError::FileNotFound(path.to_path_buf()))?
            .to_os_string();

        let (tx, rx) = mpsc::channel(CHANGE_CHANNEL_CAPACITY);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "file watch error");
                    return;
                }
            };

            // The watch is non-recursive, so a matching name means the document itself.
            for changed in event
                .paths
                .iter()
                .filter(|p| p.file_name() == Some(file_name.as_os_str()))
            {
                let change = match event.kind {
                    EventKind::Create(_) => FileChange::Created(changed.clone()),
                    EventKind::Modify(_) => FileChange::Modified(changed.clone()),
                    EventKind::Remove(_) => FileChange::Removed(changed.clone()),
                    _ => continue,
                };

                // A full channel already holds a pending change.
                match tx.try_send(change) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Closed(_)) => return,
                }
            }
        })?;

        watcher.watch(parent, RecursiveMode::NonRecursive)?;

        Ok((
            Self {
                _watcher: watcher,
                path: path.to_path_buf(),
            },
            rx,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

struct ActiveWatch {
    watcher: FileWatcher,
    pump: JoinHandle<()>,
}

/// Holds at most one document watch and the task that turns its events into
/// `on_change` calls.
pub struct WatchBridge {
    active: Mutex<Option<ActiveWatch>>,
}

impl WatchBridge {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    /// Watch `path`, replacing any previous watch.
    ///
    /// Changes arriving within `debounce` of each other are collapsed into a
    /// single `on_change` call made once the burst is over. Must be called
    /// from within a tokio runtime.
    pub fn watch<F>(&self, path: &Path, debounce: Duration, on_change: F) -> Result<()>
    where
        F: Fn() + Send + 'static,
    {
        self.unwatch();

        let (watcher, rx) = FileWatcher::new(path)?;
        let pump = tokio::spawn(pump_changes(rx, debounce, on_change));

        tracing::debug!(path = %path.display(), ?debounce, "watching document");
        *self.active.lock() = Some(ActiveWatch { watcher, pump });
        Ok(())
    }

    /// Release the current watch. Does nothing if there is none.
    pub fn unwatch(&self) {
        if let Some(active) = self.active.lock().take() {
            active.pump.abort();
            tracing::debug!(path = %active.watcher.path().display(), "released document watch");
        }
    }

    pub fn watched_path(&self) -> Option<PathBuf> {
        self.active
            .lock()
            .as_ref()
            .map(|active| active.watcher.path().to_path_buf())
    }
}

impl Default for WatchBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WatchBridge {
    fn drop(&mut self) {
        self.unwatch();
    }
}

async fn pump_changes<F: Fn()>(mut rx: mpsc::Receiver<FileChange>, debounce: Duration, on_change: F) {
    while let Some(change) = rx.recv().await {
        tracing::debug!(?change, "document changed");

        // Drain the rest of the burst, up to the max wait.
        let flush_at = Instant::now() + debounce * MAX_WAIT_FACTOR;
        loop {
            let quiet_until = (Instant::now() + debounce).min(flush_at);
            match tokio::time::timeout_at(quiet_until, rx.recv()).await {
                Ok(Some(_)) => continue,
                Ok(None) => {
                    on_change();
                    return;
                }
                Err(_) => break,
            }
        }

        on_change();
    }
}
