//! FileStore - the task list as one JSON document on disk
//!
//! ```text
//! .cardwall/
//! ├── board.json   # { "version": 1, "tasks": [...] }
//! ├── board.lock   # advisory lock between processes
//! └── board.tmp    # transient, atomic write staging
//! ```
//!
//! Documents in the older grouped layout (`{ "todo": [{ "id", "text" }], ... }`)
//! are read transparently and rewritten in the current layout on the next write.

use crate::error::{BoardError, Result};
use crate::gateway::{StoreChange, TaskGateway};
use crate::types::{ColumnId, TaskId, TaskRecord};
use crate::watcher::StoreWatcher;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::sync::{broadcast, Mutex};

/// Current document layout version
pub const DOCUMENT_VERSION: u32 = 1;

const LOCK_ATTEMPTS: u32 = 50;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(20);
const CHANGE_CAPACITY: usize = 64;

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    version: u32,
    #[serde(default)]
    tasks: Vec<TaskRecord>,
}

/// A card in the grouped layout. Only id and text are guaranteed.
#[derive(Debug, Deserialize)]
struct LegacyCard {
    id: TaskId,
    text: String,
    #[serde(default)]
    position: Option<f64>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredDocument {
    Current(Document),
    Legacy(BTreeMap<String, Vec<LegacyCard>>),
}

impl StoredDocument {
    fn into_records(self) -> Vec<TaskRecord> {
        match self {
            StoredDocument::Current(doc) => doc.tasks,
            StoredDocument::Legacy(groups) => {
                let now = Utc::now();
                groups
                    .into_iter()
                    .flat_map(|(column, cards)| {
                        cards.into_iter().enumerate().map(move |(index, card)| {
                            let created_at = card.created_at.unwrap_or(now);
                            TaskRecord {
                                id: card.id,
                                text: card.text,
                                column: column.clone(),
                                position: card.position.unwrap_or(index as f64),
                                created_at,
                                updated_at: card.updated_at.unwrap_or(created_at),
                            }
                        })
                    })
                    .collect()
            }
        }
    }
}

/// JSON file [`TaskGateway`]
pub struct FileStore {
    /// Path to the JSON document
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    gate: Mutex<()>,
    changes: broadcast::Sender<StoreChange>,
    watcher: Option<StoreWatcher>,
}

impl FileStore {
    /// Create a store for the document at `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            path: path.into(),
            gate: Mutex::new(()),
            changes,
            watcher: None,
        }
    }

    /// Create a store that also watches its document for outside changes
    pub fn watching(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::new(path);
        store.watcher = Some(StoreWatcher::start(&store.path, store.changes.clone())?);
        Ok(store)
    }

    // =========================================================================
    // Path helpers
    // =========================================================================

    /// Path to the JSON document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path to the lock file
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// True when the store is watching its document
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    // =========================================================================
    // Document I/O
    // =========================================================================

    /// Read every record. A missing or blank file is an empty board.
    async fn load(&self) -> Result<Vec<TaskRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let document: StoredDocument = serde_json::from_str(&content)?;
        if matches!(document, StoredDocument::Legacy(_)) {
            tracing::info!("reading legacy grouped document {}", self.path.display());
        }
        Ok(document.into_records())
    }

    /// Write every record (atomic write via temp file)
    async fn save(&self, tasks: Vec<TaskRecord>) -> Result<()> {
        let document = Document {
            version: DOCUMENT_VERSION,
            tasks,
        };
        let content = serde_json::to_string_pretty(&document)?;
        atomic_write(&self.path, content.as_bytes()).await
    }

    /// Load, apply `mutate`, save. Holds the in-process gate and the file lock.
    async fn modify<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<TaskRecord>) -> bool + Send,
    {
        let _gate = self.gate.lock().await;
        let _lock = self.lock().await?;

        let mut tasks = self.load().await?;
        if mutate(&mut tasks) {
            self.save(tasks).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Acquire the exclusive file lock, retrying for a bounded time
    pub async fn lock(&self) -> Result<StoreLock> {
        let lock_path = self.lock_path();

        // Ensure parent directory exists
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)
            .await?
            .into_std()
            .await;

        for attempt in 1..=LOCK_ATTEMPTS {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(StoreLock { file }),
                Err(_) if attempt < LOCK_ATTEMPTS => tokio::time::sleep(LOCK_RETRY_DELAY).await,
                Err(_) => break,
            }
        }
        Err(BoardError::LockBusy)
    }
}

#[async_trait]
impl TaskGateway for FileStore {
    async fn read_all(&self) -> Result<Vec<TaskRecord>> {
        let _gate = self.gate.lock().await;
        self.load().await
    }

    async fn create(&self, record: TaskRecord) -> Result<TaskRecord> {
        let stored = record.clone();
        self.modify(move |tasks| {
            tasks.retain(|t| t.id != record.id);
            tasks.push(record);
            true
        })
        .await?;
        Ok(stored)
    }

    async fn update_position(&self, id: &TaskId, column: ColumnId, position: f64) -> Result<()> {
        self.modify(|tasks| match tasks.iter_mut().find(|t| &t.id == id) {
            Some(task) => {
                task.column = column.as_str().to_string();
                task.position = position;
                task.updated_at = Utc::now();
                true
            }
            None => false,
        })
        .await
    }

    async fn delete(&self, id: &TaskId) -> Result<()> {
        self.modify(|tasks| {
            let before = tasks.len();
            tasks.retain(|t| &t.id != id);
            tasks.len() != before
        })
        .await
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<StoreChange>> {
        self.watcher.as_ref().map(|_| self.changes.subscribe())
    }
}

/// RAII lock guard - releases on drop
pub struct StoreLock {
    file: std::fs::File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Atomic write via temp file and rename
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    // Write to temp file in same directory
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;

    // Rename (atomic on same filesystem)
    fs::rename(&temp_path, path).await?;

    Ok(())
}
