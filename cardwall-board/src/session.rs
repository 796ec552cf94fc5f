//! BoardSession - an explicit, caller-owned handle on one board
//!
//! Every write runs in two phases: the [`Board`] transition is applied
//! locally first, so [`BoardSession::snapshot`] reflects it immediately,
//! and then the gateway is called. When the gateway fails the local state
//! is thrown away and replaced by a fresh [`TaskGateway::read_all`]; the
//! original error is returned to the caller. Nothing is retried.
//!
//! Moves and rebalances write several cards one at a time. When one of
//! those writes fails after others landed, the reloaded column is checked
//! and respread if the store was left with tied positions.

use crate::board::{Board, PositionUpdate};
use crate::error::{BoardError, Result};
use crate::gateway::TaskGateway;
use crate::position::{self, DEFAULT_REBALANCE_EPSILON};
use crate::types::{ColumnId, Task, TaskId};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

/// In-memory board state backed by a [`TaskGateway`]
pub struct BoardSession {
    gateway: Arc<dyn TaskGateway>,
    board: RwLock<Board>,
    /// Serializes writers; readers only take `board`
    ops: Mutex<()>,
    rebalance_epsilon: f64,
}

impl BoardSession {
    /// Create a session with an empty board. Call [`reload`](Self::reload)
    /// to populate it, or use [`open`](Self::open).
    pub fn new(gateway: Arc<dyn TaskGateway>) -> Self {
        Self {
            gateway,
            board: RwLock::new(Board::new()),
            ops: Mutex::new(()),
            rebalance_epsilon: DEFAULT_REBALANCE_EPSILON,
        }
    }

    /// Set the gap below which a column is respread after a move
    pub fn with_rebalance_epsilon(mut self, epsilon: f64) -> Self {
        self.rebalance_epsilon = epsilon;
        self.board = RwLock::new(self.board.into_inner().with_rebalance_epsilon(epsilon));
        self
    }

    /// Create a session and load it from the gateway
    pub async fn open(gateway: Arc<dyn TaskGateway>) -> Result<Self> {
        let session = Self::new(gateway);
        session.reload().await?;
        Ok(session)
    }

    /// A copy of the current (possibly optimistic) board state
    pub async fn snapshot(&self) -> Board {
        self.board.read().await.clone()
    }

    /// Replace local state wholesale with the gateway's contents
    pub async fn reload(&self) -> Result<()> {
        let _ops = self.ops.lock().await;
        self.reload_locked().await
    }

    async fn reload_locked(&self) -> Result<()> {
        let records = self.gateway.read_all().await?;
        let board = Board::from_records(records).with_rebalance_epsilon(self.rebalance_epsilon);
        tracing::debug!(tasks = board.len(), "reloaded board");
        *self.board.write().await = board;
        Ok(())
    }

    /// Log a persistence failure, resynchronize, and hand the error back.
    ///
    /// After a successful reload, any of `columns` the store now holds with
    /// tied or out-of-order positions is respread.
    async fn reconcile(&self, op: &str, error: BoardError, columns: &[ColumnId]) -> BoardError {
        tracing::warn!(op, "persistence failed, reloading board: {}", error);
        if let Err(reload_error) = self.reload_locked().await {
            tracing::error!(op, "reload after failed write also failed: {}", reload_error);
            return error;
        }
        for column in columns {
            self.repair_locked(*column).await;
        }
        error
    }

    async fn repair_locked(&self, column: ColumnId) {
        let updates = {
            let mut board = self.board.write().await;
            if position::is_strictly_ordered(&board.positions(column)) {
                return;
            }
            board.rebalance(column)
        };
        tracing::warn!(
            %column,
            cards = updates.len(),
            "respreading column with tied positions"
        );

        if let Err(e) = self.write_positions(&updates).await {
            tracing::error!(%column, "respread of tied column failed: {}", e);
            if let Err(reload_error) = self.reload_locked().await {
                tracing::error!(
                    %column,
                    "reload after failed respread also failed: {}",
                    reload_error
                );
            }
        }
    }

    async fn write_positions(&self, updates: &[PositionUpdate]) -> Result<()> {
        for update in updates {
            self.gateway
                .update_position(&update.id, update.column, update.position)
                .await?;
        }
        Ok(())
    }

    /// Append a card to `column`.
    ///
    /// Blank text fails with [`BoardError::EmptyText`] before the gateway
    /// is called.
    pub async fn add(&self, column: ColumnId, text: &str) -> Result<Task> {
        let _ops = self.ops.lock().await;

        let task = self.board.write().await.add(column, text)?;
        tracing::debug!(id = %task.id, %column, "adding task");

        let stored = match self.gateway.create(task.to_record()).await {
            Ok(record) => record,
            Err(e) => return Err(self.reconcile("add", e, &[]).await),
        };

        // Adopt whatever the store normalized
        match Task::from_record(stored) {
            Ok(stored) => {
                self.board.write().await.upsert(stored.clone());
                Ok(stored)
            }
            Err(e) => Err(self.reconcile("add", e, &[]).await),
        }
    }

    /// Delete a card. Unknown ids are a silent no-op returning `None`.
    pub async fn delete(&self, id: &TaskId) -> Result<Option<Task>> {
        let _ops = self.ops.lock().await;

        let removed = self.board.write().await.delete(id);
        let Some(task) = removed else {
            tracing::debug!(%id, "delete of unknown task ignored");
            return Ok(None);
        };

        if let Err(e) = self.gateway.delete(id).await {
            return Err(self.reconcile("delete", e, &[]).await);
        }
        Ok(Some(task))
    }

    /// Move a card from `from` to `index` in `to`.
    ///
    /// Returns `false` without touching the gateway when the card is not in
    /// `from` or is already at `index`.
    pub async fn move_task(
        &self,
        id: &TaskId,
        from: ColumnId,
        to: ColumnId,
        index: usize,
    ) -> Result<bool> {
        let _ops = self.ops.lock().await;

        let updates = self.board.write().await.move_task(id, from, to, index);
        let Some(updates) = updates else {
            tracing::debug!(%id, %from, %to, index, "move was a no-op");
            return Ok(false);
        };

        if let Err(e) = self.write_positions(&updates).await {
            return Err(self.reconcile("move", e, &[from, to]).await);
        }
        Ok(true)
    }

    /// Respread a column to integer positions and persist the changes.
    ///
    /// Returns the number of cards whose position changed.
    pub async fn rebalance(&self, column: ColumnId) -> Result<usize> {
        let _ops = self.ops.lock().await;

        let updates = self.board.write().await.rebalance(column);
        if let Err(e) = self.write_positions(&updates).await {
            return Err(self.reconcile("rebalance", e, &[column]).await);
        }
        Ok(updates.len())
    }

    /// Reload whenever the gateway reports a change.
    ///
    /// Returns `None` when the gateway has no change feed. The task ends
    /// when the feed closes or the session is dropped; abort the handle to
    /// stop it sooner.
    pub fn watch_changes(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut changes = self.gateway.subscribe()?;
        let session: Weak<Self> = Arc::downgrade(self);

        Some(tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        let Some(session) = session.upgrade() else {
                            break;
                        };
                        if let Err(e) = session.reload().await {
                            tracing::warn!("reload after store change failed: {}", e);
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!("change watcher exiting");
        }))
    }
}
