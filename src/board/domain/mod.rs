//! Domain model for Kanban boards.
//!
//! Boards, columns and tasks are plain values. All rearrangement goes through
//! [`Board::relocate`] and [`Board::confirm`], which keep every task in exactly
//! one column.

mod activity;
mod board;
mod column;
mod error;
mod ids;
mod intent;
mod task;

pub use activity::{ActivityAction, ActivityEntry, TaskMovedRecord};
pub use board::{Board, TaskLocation};
pub use column::Column;
pub use error::{BoardDomainError, ParseTaskStatusError};
pub use ids::{ColumnId, MoveId, ProjectId, TaskId};
pub use intent::MoveIntent;
pub use task::{Task, TaskStatus};
