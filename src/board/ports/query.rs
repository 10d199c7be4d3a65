//! Port for fetching authoritative board snapshots.

use crate::board::domain::{Board, ProjectId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for board query operations.
pub type BoardQueryResult<T> = Result<T, BoardQueryError>;

/// Read access to the backend's board state.
#[async_trait]
pub trait BoardQueryService: Send + Sync {
    /// Fetches the current board for a project.
    ///
    /// # Errors
    ///
    /// Returns [`BoardQueryError::NotFound`] when the project has no board,
    /// [`BoardQueryError::Unauthorized`] when access is denied, or
    /// [`BoardQueryError::Network`] for transport failures.
    async fn fetch_board(&self, project_id: ProjectId) -> BoardQueryResult<Board>;
}

/// Errors returned by board query implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardQueryError {
    /// The project does not exist or has no board.
    #[error("board not found for project {0}")]
    NotFound(ProjectId),

    /// The caller may not read the board.
    #[error("not authorized to read the board")]
    Unauthorized,

    /// Transport-layer failure.
    #[error("network error: {0}")]
    Network(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardQueryError {
    /// Wraps a transport error.
    pub fn network(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Network(Arc::new(err))
    }
}
