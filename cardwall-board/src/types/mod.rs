//! Core types for the board engine

mod ids;
mod task;

// Re-export all types
pub use ids::{ColumnId, TaskId};
pub use task::{Task, TaskRecord};
