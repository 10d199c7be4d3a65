//! Error types for board domain validation and board operations.

use super::{ColumnId, TaskId};
use thiserror::Error;

/// Errors returned while constructing or rearranging boards.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// Two columns on the same board share an identifier.
    #[error("duplicate column identifier: {0}")]
    DuplicateColumn(ColumnId),

    /// A task appears more than once on the same board.
    #[error("task {0} appears in more than one place on the board")]
    DuplicateTask(TaskId),

    /// A task claims a column other than the one holding it.
    #[error("task {task_id} is held by column {holder} but references column {declared}")]
    ColumnMismatch {
        /// Misplaced task.
        task_id: TaskId,
        /// Column that holds the task.
        holder: ColumnId,
        /// Column the task references.
        declared: ColumnId,
    },

    /// The column does not exist on the board.
    #[error("column not found on board: {0}")]
    UnknownColumn(ColumnId),

    /// The task does not exist on the board.
    #[error("task not found on board: {0}")]
    UnknownTask(TaskId),
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
