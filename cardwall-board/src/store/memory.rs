//! Process-local task store

use crate::error::Result;
use crate::gateway::{StoreChange, TaskGateway};
use crate::types::{ColumnId, TaskId, TaskRecord};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, RwLock};

const CHANGE_CAPACITY: usize = 64;

/// In-memory [`TaskGateway`]. Broadcasts a [`StoreChange`] after every write.
pub struct MemoryStore {
    records: RwLock<Vec<TaskRecord>>,
    changes: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a store preloaded with records
    pub fn with_records(records: Vec<TaskRecord>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            records: RwLock::new(records),
            changes,
        }
    }

    fn notify(&self) {
        // No receivers is fine
        let _ = self.changes.send(StoreChange);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskGateway for MemoryStore {
    async fn read_all(&self) -> Result<Vec<TaskRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn create(&self, record: TaskRecord) -> Result<TaskRecord> {
        {
            let mut records = self.records.write().await;
            records.retain(|r| r.id != record.id);
            records.push(record.clone());
        }
        self.notify();
        Ok(record)
    }

    async fn update_position(&self, id: &TaskId, column: ColumnId, position: f64) -> Result<()> {
        let found = {
            let mut records = self.records.write().await;
            match records.iter_mut().find(|r| &r.id == id) {
                Some(record) => {
                    record.column = column.as_str().to_string();
                    record.position = position;
                    record.updated_at = Utc::now();
                    true
                }
                None => false,
            }
        };
        if found {
            self.notify();
        }
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<()> {
        let removed = {
            let mut records = self.records.write().await;
            let before = records.len();
            records.retain(|r| &r.id != id);
            records.len() != before
        };
        if removed {
            self.notify();
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<StoreChange>> {
        Some(self.changes.subscribe())
    }
}
