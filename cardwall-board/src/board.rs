//! The board aggregate: per-column ordered card sequences.
//!
//! A [`Board`] is pure in-memory state. It never talks to storage; the
//! operations that change positions report what must be persisted and
//! [`BoardSession`](crate::BoardSession) does the writing.

use crate::error::{BoardError, Result};
use crate::position::{self, DEFAULT_REBALANCE_EPSILON};
use crate::types::{ColumnId, Task, TaskId, TaskRecord};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// A position change to persist through the gateway
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionUpdate {
    pub id: TaskId,
    pub column: ColumnId,
    pub position: f64,
}

impl From<&Task> for PositionUpdate {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            column: task.column,
            position: task.position,
        }
    }
}

/// Cards grouped by column, each column sorted by position ascending
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    columns: [Vec<Task>; 3],
    rebalance_epsilon: f64,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self {
            columns: [Vec::new(), Vec::new(), Vec::new()],
            rebalance_epsilon: DEFAULT_REBALANCE_EPSILON,
        }
    }

    /// Group a flat record list into sorted columns.
    ///
    /// Records naming an unknown column are dropped, as are repeated ids
    /// (the first occurrence wins). Equal positions keep input order.
    pub fn from_records(records: impl IntoIterator<Item = TaskRecord>) -> Self {
        let mut board = Self::new();
        let mut seen = HashSet::new();

        for record in records {
            if seen.contains(&record.id) {
                tracing::warn!(id = %record.id, "dropping duplicate task record");
                continue;
            }
            match Task::from_record(record) {
                Ok(task) => {
                    seen.insert(task.id.clone());
                    board.columns[task.column.index()].push(task);
                }
                Err(e) => tracing::warn!("dropping task record: {}", e),
            }
        }

        for column in board.columns.iter_mut() {
            column.sort_by(|a, b| a.position.total_cmp(&b.position));
        }
        board
    }

    /// Set the gap below which a column is respread after a move
    pub fn with_rebalance_epsilon(mut self, epsilon: f64) -> Self {
        self.rebalance_epsilon = epsilon;
        self
    }

    /// The configured rebalance threshold
    pub fn rebalance_epsilon(&self) -> f64 {
        self.rebalance_epsilon
    }

    /// Flatten back to records, column by column in display order
    pub fn to_records(&self) -> Vec<TaskRecord> {
        self.tasks().map(Task::to_record).collect()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Cards of one column in display order
    pub fn column(&self, column: ColumnId) -> &[Task] {
        &self.columns[column.index()]
    }

    /// Positions of one column, ascending
    pub fn positions(&self, column: ColumnId) -> Vec<f64> {
        self.column(column).iter().map(|t| t.position).collect()
    }

    /// All cards, column by column
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns.iter().flatten()
    }

    /// Find a card by id
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks().find(|t| &t.id == id)
    }

    /// Column and index of a card
    pub fn locate(&self, id: &TaskId) -> Option<(ColumnId, usize)> {
        ColumnId::ALL.into_iter().find_map(|column| {
            self.column(column)
                .iter()
                .position(|t| &t.id == id)
                .map(|index| (column, index))
        })
    }

    /// Total number of cards
    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// True when no column holds a card
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Append a new card to `column`.
    ///
    /// The text is trimmed; whitespace-only text is rejected.
    pub fn add(&mut self, column: ColumnId, text: &str) -> Result<Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BoardError::EmptyText);
        }

        let cards = &mut self.columns[column.index()];
        let positions: Vec<f64> = cards.iter().map(|t| t.position).collect();
        let task = Task::new(text, column, position::allocate(&positions, cards.len()));
        cards.push(task.clone());
        Ok(task)
    }

    /// Remove a card wherever it is. Unknown ids return `None`.
    pub fn delete(&mut self, id: &TaskId) -> Option<Task> {
        let (column, index) = self.locate(id)?;
        Some(self.columns[column.index()].remove(index))
    }

    /// Insert or replace a card, keeping its column sorted.
    ///
    /// Used to adopt the record a store returns after a write.
    pub fn upsert(&mut self, task: Task) {
        self.delete(&task.id);
        let cards = &mut self.columns[task.column.index()];
        let index = cards.partition_point(|t| t.position <= task.position);
        cards.insert(index, task);
    }

    /// Move a card to `index` in column `to`.
    ///
    /// Returns `None` when the card is not in `from` or would not move.
    /// Otherwise returns the updates to persist, including siblings
    /// renumbered by a rebalance, in [`write_order`] so a write that fails
    /// partway never leaves two cards of `to` on the same position.
    pub fn move_task(
        &mut self,
        id: &TaskId,
        from: ColumnId,
        to: ColumnId,
        index: usize,
    ) -> Option<Vec<PositionUpdate>> {
        let current = self.column(from).iter().position(|t| &t.id == id)?;

        let dest_len = self.column(to).len();
        let index = if from == to {
            index.min(dest_len - 1)
        } else {
            index.min(dest_len)
        };
        if from == to && current == index {
            return None;
        }

        let mut task = self.columns[from.index()].remove(current);
        let positions = self.positions(to);
        task.relocate(to, position::allocate(&positions, index));
        self.columns[to.index()].insert(index, task);

        let mut updates = if position::needs_rebalance(&self.positions(to), self.rebalance_epsilon)
        {
            self.respread(to)
        } else {
            Vec::new()
        };

        // The moved card changes column even when the respread kept its position
        if !updates.iter().any(|u| &u.id == id) {
            let moved = PositionUpdate::from(&self.columns[to.index()][index]);
            updates.insert(0, moved);
        }

        tracing::debug!(
            %id,
            %from,
            %to,
            index,
            updates = updates.len(),
            "moved task"
        );
        Some(updates)
    }

    /// Renumber a column to integer positions.
    ///
    /// Returns the cards whose position changed, in [`write_order`]; empty
    /// when the column is already integer-spaced.
    pub fn rebalance(&mut self, column: ColumnId) -> Vec<PositionUpdate> {
        if position::is_spread(&self.positions(column)) {
            return Vec::new();
        }
        self.respread(column)
    }

    fn respread(&mut self, column: ColumnId) -> Vec<PositionUpdate> {
        let mut changes = Vec::new();
        let cards = &mut self.columns[column.index()];
        let targets = position::spread(cards.len());
        for (task, target) in cards.iter_mut().zip(targets) {
            if task.position != target {
                let previous = task.position;
                task.relocate(column, target);
                changes.push((PositionUpdate::from(&*task), previous));
            }
        }
        tracing::info!(%column, changed = changes.len(), "rebalanced column");
        write_order(changes)
    }
}

/// Order renumbering writes for one column.
///
/// `changes` pairs each update with the card's previous position, in
/// column order. Cards moving up are written bottom first and cards moving
/// down top first: each write then lands strictly between the current
/// values of its neighbours, so every prefix of the returned list leaves
/// the column strictly ordered.
pub fn write_order(changes: Vec<(PositionUpdate, f64)>) -> Vec<PositionUpdate> {
    let (mut rising, falling): (Vec<_>, Vec<_>) = changes
        .into_iter()
        .partition(|(update, previous)| update.position > *previous);
    rising.reverse();
    rising
        .into_iter()
        .chain(falling)
        .map(|(update, _)| update)
        .collect()
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ColumnId::ALL.len()))?;
        for column in ColumnId::ALL {
            map.serialize_entry(column.as_str(), self.column(column))?;
        }
        map.end()
    }
}
