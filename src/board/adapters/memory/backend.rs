//! In-memory board backend implementing both board ports.

use crate::board::{
    domain::{ActivityEntry, Board, ProjectId, Task, TaskMovedRecord},
    ports::{
        BoardQueryError, BoardQueryResult, BoardQueryService, TaskMoveError, TaskMoveRequest,
        TaskMoveResult, TaskMoveService,
    },
};
use async_trait::async_trait;
use mockable::Clock;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe in-memory stand-in for the REST board backend.
///
/// Moves behave like the real endpoint: the task and target column are
/// validated, the canonical task is returned and a `TASK_MOVED` activity
/// entry is written. Failures can be scripted with
/// [`InMemoryBoardBackend::fail_next_move`].
pub struct InMemoryBoardBackend<C: Clock + Send + Sync> {
    state: Arc<RwLock<BackendState>>,
    clock: Arc<C>,
}

#[derive(Debug, Default)]
struct BackendState {
    boards: HashMap<ProjectId, Board>,
    activity: HashMap<ProjectId, Vec<ActivityEntry>>,
    scripted_failures: VecDeque<TaskMoveError>,
    next_activity_id: u64,
    move_calls: usize,
}

impl<C: Clock + Send + Sync> Clone for InMemoryBoardBackend<C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C: Clock + Send + Sync> InMemoryBoardBackend<C> {
    /// Creates an empty backend.
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            state: Arc::new(RwLock::new(BackendState::default())),
            clock: Arc::new(clock),
        }
    }

    /// Stores or replaces a project's board.
    pub fn insert_board(&self, board: Board) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.boards.insert(board.project_id(), board);
    }

    /// Parses a board document in the backend's JSON shape and stores it.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the document is malformed or violates the
    /// board invariants.
    pub fn seed_from_json(&self, json: &str) -> Result<ProjectId, serde_json::Error> {
        let board: Board = serde_json::from_str(json)?;
        let project_id = board.project_id();
        self.insert_board(board);
        Ok(project_id)
    }

    /// Queues an error to be returned by the next move instead of moving.
    pub fn fail_next_move(&self, error: TaskMoveError) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.scripted_failures.push_back(error);
    }

    /// Returns the server-side board, if the project exists.
    #[must_use]
    pub fn board(&self, project_id: ProjectId) -> Option<Board> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.boards.get(&project_id).cloned()
    }

    /// Returns the project's activity feed, newest first.
    #[must_use]
    pub fn activity(&self, project_id: ProjectId) -> Vec<ActivityEntry> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .activity
            .get(&project_id)
            .map(|entries| entries.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns how many move requests reached the backend.
    #[must_use]
    pub fn move_calls(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.move_calls
    }
}

fn apply_move(
    state: &mut BackendState,
    project_id: ProjectId,
    request: &TaskMoveRequest,
) -> Result<(Task, TaskMovedRecord), TaskMoveError> {
    let conflict = || TaskMoveError::Conflict(request.task_id);
    let board = state.boards.get_mut(&project_id).ok_or_else(conflict)?;
    let origin = board.locate(request.task_id).ok_or_else(conflict)?;
    let destination = board
        .relocate(request.task_id, request.target_column_id, Some(request.to_position))
        .map_err(|_| conflict())?;
    let task = board.task(request.task_id).cloned().ok_or_else(conflict)?;

    let record = TaskMovedRecord {
        project_id,
        task_id: task.id(),
        task_title: task.title().to_owned(),
        from_column_id: origin.column_id,
        to_column_id: destination.column_id,
        from_position: origin.index,
        to_position: destination.index,
    };
    Ok((task, record))
}

#[async_trait]
impl<C: Clock + Send + Sync> BoardQueryService for InMemoryBoardBackend<C> {
    async fn fetch_board(&self, project_id: ProjectId) -> BoardQueryResult<Board> {
        let state = self.state.read().map_err(|err| {
            BoardQueryError::network(std::io::Error::other(err.to_string()))
        })?;
        state
            .boards
            .get(&project_id)
            .cloned()
            .ok_or(BoardQueryError::NotFound(project_id))
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> TaskMoveService for InMemoryBoardBackend<C> {
    async fn move_task(
        &self,
        project_id: ProjectId,
        request: &TaskMoveRequest,
    ) -> TaskMoveResult<Task> {
        let mut state = self.state.write().map_err(|err| {
            TaskMoveError::network(std::io::Error::other(err.to_string()))
        })?;
        state.move_calls += 1;
        if let Some(failure) = state.scripted_failures.pop_front() {
            return Err(failure);
        }

        let (task, record) = apply_move(&mut state, project_id, request)?;
        state.next_activity_id += 1;
        let entry = ActivityEntry::task_moved(state.next_activity_id, record, &*self.clock);
        state.activity.entry(project_id).or_default().push(entry);
        Ok(task)
    }
}
