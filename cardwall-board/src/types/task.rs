//! Task types: the persisted TaskRecord and the board-member Task

use super::ids::{ColumnId, TaskId};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task row as the persistence gateway stores it.
///
/// The column is kept as a raw string so records naming a column this
/// build does not know survive a read; the board drops them on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub text: String,
    pub column: String,
    pub position: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A card on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub column: ColumnId,
    pub position: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task with a fresh identity
    pub fn new(text: impl Into<String>, column: ColumnId, position: f64) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            text: text.into(),
            column,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    /// Convert a stored record, failing when its column is unknown
    pub fn from_record(record: TaskRecord) -> Result<Self> {
        let column = record.column.parse::<ColumnId>()?;
        Ok(Self {
            id: record.id,
            text: record.text,
            column,
            position: record.position,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// The record to hand to the gateway
    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: self.id.clone(),
            text: self.text.clone(),
            column: self.column.as_str().to_string(),
            position: self.position,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Relocate the task and refresh its modification time
    pub(crate) fn relocate(&mut self, column: ColumnId, position: f64) {
        self.column = column;
        self.position = position;
        self.updated_at = Utc::now();
    }
}
