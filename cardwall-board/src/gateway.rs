//! The persistence gateway contract

use crate::error::Result;
use crate::types::{ColumnId, TaskId, TaskRecord};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Notification that the backing store changed. Carries no payload; the
/// receiver is expected to read everything again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange;

/// Durable storage for the flat task list.
///
/// Implementations decide the transport. Unknown ids are not errors for
/// `update_position` or `delete`: last write wins at task granularity.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// Every stored task, in no particular order
    async fn read_all(&self) -> Result<Vec<TaskRecord>>;

    /// Store a new task. Client-supplied id and position are kept; the
    /// returned record is what the store actually holds.
    async fn create(&self, record: TaskRecord) -> Result<TaskRecord>;

    /// Relocate a task
    async fn update_position(&self, id: &TaskId, column: ColumnId, position: f64) -> Result<()>;

    /// Remove a task permanently
    async fn delete(&self, id: &TaskId) -> Result<()>;

    /// Change notifications, when the store can produce them
    fn subscribe(&self) -> Option<broadcast::Receiver<StoreChange>> {
        None
    }
}
