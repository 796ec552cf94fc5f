//! File watching for the JSON store

use crate::error::{BoardError, Result};
use crate::gateway::StoreChange;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

/// Watches one store file and broadcasts a [`StoreChange`] whenever it is
/// created, modified or removed. Stops watching on drop.
pub(crate) struct StoreWatcher {
    _watcher: RecommendedWatcher,
}

impl StoreWatcher {
    /// Start watching `path`.
    ///
    /// The parent directory is watched rather than the file itself so the
    /// watch survives atomic replacement and a file that does not exist yet.
    pub(crate) fn start(path: &Path, changes: broadcast::Sender<StoreChange>) -> Result<Self> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| BoardError::invalid_value("store", "path has no file name"))?
            .to_os_string();

        let mut watcher = RecommendedWatcher::new(
            move |result: std::result::Result<Event, notify::Error>| match result {
                Ok(event) => {
                    if is_relevant(&event, &file_name) {
                        tracing::debug!("store file changed: {:?}", event.kind);
                        let _ = changes.send(StoreChange);
                    }
                }
                Err(e) => tracing::warn!("store watcher error: {}", e),
            },
            notify::Config::default(),
        )
        .map_err(|e| BoardError::store(format!("failed to create file watcher: {}", e)))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| BoardError::store(format!("failed to watch {}: {}", dir.display(), e)))?;
        tracing::info!("watching store file {}", path.display());

        Ok(Self { _watcher: watcher })
    }
}

fn is_relevant(event: &Event, file_name: &OsString) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()))
}
