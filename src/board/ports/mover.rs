//! Port for performing task moves on the backend.

use crate::board::domain::{ColumnId, ProjectId, Task, TaskId};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote task moves.
pub type TaskMoveResult<T> = Result<T, TaskMoveError>;

/// Payload of a remote move, mirroring the backend's move endpoint body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMoveRequest {
    /// Task being moved. Sent in the endpoint path, not the body.
    #[serde(skip)]
    pub task_id: TaskId,
    /// Destination column.
    pub target_column_id: ColumnId,
    /// Index the task occupied in its source column.
    pub from_position: usize,
    /// Index the task takes in the destination column.
    pub to_position: usize,
}

/// Remote state change for moving tasks between columns.
#[async_trait]
pub trait TaskMoveService: Send + Sync {
    /// Moves a task and returns the server's canonical post-move task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskMoveError::Conflict`] when another actor moved or
    /// deleted the task, [`TaskMoveError::Unauthorized`] when the caller may
    /// not edit the board, or [`TaskMoveError::Network`] for transport
    /// failures and timeouts.
    async fn move_task(
        &self,
        project_id: ProjectId,
        request: &TaskMoveRequest,
    ) -> TaskMoveResult<Task>;
}

/// Errors returned by task move implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskMoveError {
    /// The task was moved or deleted concurrently by another actor.
    #[error("task {0} was changed concurrently")]
    Conflict(TaskId),

    /// The caller may not move tasks on this board.
    #[error("not authorized to move tasks")]
    Unauthorized,

    /// Transport-layer failure, including timeouts.
    #[error("network error: {0}")]
    Network(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskMoveError {
    /// Wraps a transport error.
    pub fn network(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Network(Arc::new(err))
    }
}
