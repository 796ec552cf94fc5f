//! Kanban board engine: card ordering, optimistic sessions and file-backed storage
//!
//! A board has three fixed columns (`todo`, `in-progress`, `done`) holding
//! short text cards. Order inside a column comes from a real-valued
//! position per card, so inserting or moving a card never renumbers its
//! neighbours.
//!
//! ## Overview
//!
//! - **[`position`]** - allocates the position that sorts a card at a given index
//! - **[`Board`]** - cards grouped by column; pure add/delete/move transitions
//! - **[`TaskGateway`]** - the storage contract, with [`FileStore`] and [`MemoryStore`]
//! - **[`BoardSession`]** - caller-owned state that applies changes optimistically
//!   and reloads from the gateway when a write fails or the store changes
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use cardwall_board::{BoardSession, ColumnId, FileStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(FileStore::new(".cardwall/board.json"));
//! let session = BoardSession::open(store).await?;
//!
//! let milk = session.add(ColumnId::Todo, "Buy milk").await?;
//! session.add(ColumnId::Todo, "Buy eggs").await?;
//!
//! // Drag milk below eggs
//! session.move_task(&milk.id, ColumnId::Todo, ColumnId::Todo, 1).await?;
//!
//! for task in session.snapshot().await.column(ColumnId::Todo) {
//!     println!("{} {}", task.position, task.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod board;
mod error;
pub mod gateway;
pub mod position;
pub mod session;
pub mod store;
pub mod types;
mod watcher;

pub use board::{Board, PositionUpdate};
pub use error::{BoardError, Result};
pub use gateway::{StoreChange, TaskGateway};
pub use session::BoardSession;
pub use store::{FileStore, MemoryStore};
pub use types::{ColumnId, Task, TaskId, TaskRecord};
