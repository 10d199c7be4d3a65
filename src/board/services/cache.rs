//! Optimistic board cache with rollback.
//!
//! The cache serves the last known board per project and applies task moves
//! locally before the backend confirms them. Moves for one project run
//! strictly one at a time, in call order: a move's precondition checks and
//! speculative mutation happen only after every earlier move for the project
//! has reconciled, so each rollback snapshot is the board immediately before
//! that move's own change.

use super::{
    BoardCacheConfig,
    lane::{LaneSlot, Lanes},
};
use crate::board::{
    domain::{Board, BoardDomainError, ColumnId, MoveId, MoveIntent, ProjectId, Task, TaskId},
    ports::{BoardQueryError, BoardQueryService, TaskMoveError, TaskMoveRequest, TaskMoveService},
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::{sync::broadcast, task::JoinHandle};

/// Why a move could not be matched against the cached board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StaleReference {
    /// No board is cached for the project.
    #[error("no cached board for project {0}")]
    UnknownProject(ProjectId),

    /// The column is not on the cached board.
    #[error("column {0} is not on the cached board")]
    UnknownColumn(ColumnId),

    /// The task is not in the column the UI reported.
    #[error("task {task_id} is not in cached column {column_id}")]
    TaskNotInColumn {
        /// Task named by the move intent.
        task_id: TaskId,
        /// Source column named by the move intent.
        column_id: ColumnId,
    },
}

/// Errors reported by [`OptimisticBoardCache`].
#[derive(Debug, Error)]
pub enum BoardCacheError {
    /// Source and target column are the same; nothing was done.
    #[error("task {task_id} is already in column {column_id}")]
    NoOp {
        /// Task named by the move intent.
        task_id: TaskId,
        /// Column named as both source and target.
        column_id: ColumnId,
    },

    /// The cache is out of date relative to the caller; refetch the board.
    #[error("stale reference: {0}")]
    StaleReference(#[from] StaleReference),

    /// The backend refused the move. The board has already been rolled back.
    #[error("move of task {task_id} rejected: {cause}")]
    MoveRejected {
        /// Task whose move was undone.
        task_id: TaskId,
        /// Failure reported by the move service.
        #[source]
        cause: TaskMoveError,
    },

    /// Fetching the board failed.
    #[error(transparent)]
    Query(#[from] BoardQueryError),

    /// A board operation failed.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),

    /// The background reconciliation task did not run to completion.
    #[error("move reconciliation interrupted: {0}")]
    Interrupted(String),

    /// The cache state lock was poisoned by a panicking thread.
    #[error("board cache state lock poisoned")]
    StatePoisoned,
}

/// Result type for board cache operations.
pub type BoardCacheResult<T> = Result<T, BoardCacheError>;

/// What caused a board change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// The board was fetched because nothing usable was cached.
    Fetched,
    /// A move was applied locally ahead of the backend.
    Speculative(MoveId),
    /// The backend confirmed a move.
    Confirmed(MoveId),
    /// The backend rejected a move and the board was restored.
    RolledBack(MoveId),
    /// The board was refetched on request or after a confirmed move.
    Refreshed,
}

/// Notification delivered to subscribers on every cache change.
#[derive(Debug, Clone)]
pub struct BoardChange {
    /// Project whose board changed.
    pub project_id: ProjectId,
    /// Cause of the change.
    pub kind: ChangeKind,
    /// Board as cached after the change.
    pub board: Arc<Board>,
}

/// Board retained for the lifetime of one in-flight move.
#[derive(Debug, Clone)]
struct BoardSnapshot(Arc<Board>);

impl BoardSnapshot {
    fn capture(board: &Arc<Board>) -> Self {
        Self(Arc::clone(board))
    }

    fn restore(self) -> Arc<Board> {
        self.0
    }
}

/// A move whose speculative change is on the board and whose remote call is
/// pending.
#[derive(Debug)]
struct SpeculativeMove {
    move_id: MoveId,
    generation: u64,
    snapshot: BoardSnapshot,
    request: TaskMoveRequest,
}

#[derive(Debug)]
struct CachedBoard {
    board: Arc<Board>,
    generation: u64,
    stale: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<ProjectId, CachedBoard>,
    channels: HashMap<ProjectId, broadcast::Sender<BoardChange>>,
    lanes: Lanes,
    next_generation: u64,
}

impl CacheState {
    fn current_entry(&mut self, project_id: ProjectId, generation: u64) -> Option<&mut CachedBoard> {
        self.entries
            .get_mut(&project_id)
            .filter(|entry| entry.generation == generation)
    }

    /// Board a read can use without fetching: a fresh entry, or a stale one
    /// while the project's lane is held by an in-flight operation.
    fn servable_entry(&mut self, project_id: ProjectId) -> Option<Arc<Board>> {
        let busy = LaneSlot::is_busy(&mut self.lanes, project_id);
        self.entries
            .get(&project_id)
            .filter(|entry| !entry.stale || busy)
            .map(|entry| Arc::clone(&entry.board))
    }

    fn install(&mut self, project_id: ProjectId, fetched: Board, kind: ChangeKind) -> Arc<Board> {
        self.next_generation += 1;
        let board = Arc::new(fetched);
        self.entries.insert(
            project_id,
            CachedBoard {
                board: Arc::clone(&board),
                generation: self.next_generation,
                stale: false,
            },
        );
        self.publish(project_id, kind, Arc::clone(&board));
        board
    }

    /// Checks the intent against the cached board and applies it locally.
    fn begin_move(
        &mut self,
        project_id: ProjectId,
        intent: MoveIntent,
        move_id: MoveId,
    ) -> BoardCacheResult<SpeculativeMove> {
        let task_id = intent.task_id();
        let source = intent.source_column_id();
        let target = intent.target_column_id();

        let entry = self
            .entries
            .get_mut(&project_id)
            .ok_or(StaleReference::UnknownProject(project_id))?;
        let from_position = entry
            .board
            .column(source)
            .ok_or(StaleReference::UnknownColumn(source))?
            .index_of(task_id)
            .ok_or(StaleReference::TaskNotInColumn {
                task_id,
                column_id: source,
            })?;
        if entry.board.column(target).is_none() {
            return Err(StaleReference::UnknownColumn(target).into());
        }

        let snapshot = BoardSnapshot::capture(&entry.board);
        let placed =
            Arc::make_mut(&mut entry.board).relocate(task_id, target, intent.target_position())?;
        let board = Arc::clone(&entry.board);
        let generation = entry.generation;
        self.publish(project_id, ChangeKind::Speculative(move_id), board);

        tracing::debug!(
            project_id = %project_id,
            task_id = %task_id,
            move_id = %move_id,
            from_column = %source,
            to_column = %target,
            to_index = placed.index,
            "applied speculative move"
        );

        Ok(SpeculativeMove {
            move_id,
            generation,
            snapshot,
            request: TaskMoveRequest {
                task_id,
                target_column_id: target,
                from_position,
                to_position: placed.index,
            },
        })
    }

    fn publish(&self, project_id: ProjectId, kind: ChangeKind, board: Arc<Board>) {
        let Some(sender) = self.channels.get(&project_id) else {
            return;
        };
        // No live receivers is not an error; the cache stays authoritative.
        if sender
            .send(BoardChange {
                project_id,
                kind,
                board,
            })
            .is_err()
        {
            tracing::trace!(project_id = %project_id, "board change had no subscribers");
        }
    }
}

struct CacheInner<Q, M> {
    query: Arc<Q>,
    mover: Arc<M>,
    config: BoardCacheConfig,
    state: Mutex<CacheState>,
}

/// Handle to a dispatched move.
///
/// Dropping the handle does not cancel the move: the remote call and its
/// reconciliation always run to completion.
#[derive(Debug)]
pub struct PendingMove {
    move_id: MoveId,
    task_id: TaskId,
    handle: JoinHandle<BoardCacheResult<Task>>,
}

impl PendingMove {
    /// Returns the move's correlation identifier.
    #[must_use]
    pub const fn move_id(&self) -> MoveId {
        self.move_id
    }

    /// Returns the task being moved.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Waits until the move has been confirmed or rolled back.
    ///
    /// # Errors
    ///
    /// Returns the move's outcome error, or
    /// [`BoardCacheError::Interrupted`] if the reconciliation task died.
    pub async fn settled(self) -> BoardCacheResult<Task> {
        self.handle
            .await
            .unwrap_or_else(|err| Err(BoardCacheError::Interrupted(err.to_string())))
    }
}

/// Client-side board cache applying task moves optimistically.
///
/// Construct one per application session with the backend collaborators and
/// share it by cloning; clones see the same state.
pub struct OptimisticBoardCache<Q, M>
where
    Q: BoardQueryService + 'static,
    M: TaskMoveService + 'static,
{
    inner: Arc<CacheInner<Q, M>>,
}

impl<Q, M> Clone for OptimisticBoardCache<Q, M>
where
    Q: BoardQueryService + 'static,
    M: TaskMoveService + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Q, M> OptimisticBoardCache<Q, M>
where
    Q: BoardQueryService + 'static,
    M: TaskMoveService + 'static,
{
    /// Creates a cache with default configuration.
    #[must_use]
    pub fn new(query: Arc<Q>, mover: Arc<M>) -> Self {
        Self::with_config(query, mover, BoardCacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    #[must_use]
    pub fn with_config(query: Arc<Q>, mover: Arc<M>, config: BoardCacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                query,
                mover,
                config,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &BoardCacheConfig {
        &self.inner.config
    }

    /// Returns the cached board, fetching it when nothing usable is cached.
    ///
    /// A stale entry is served as is while moves for the project are in
    /// flight, so their speculative changes stay visible; the refetch waits
    /// for a later call. Fetches take their turn in the project's lane like
    /// moves and refreshes, so they never overwrite a board that a pending
    /// move still has to reconcile, and a fetch that finds a fresh entry once
    /// its turn comes returns that entry instead.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCacheError::Query`] with the fetch failure unchanged.
    pub async fn get_snapshot(&self, project_id: ProjectId) -> BoardCacheResult<Arc<Board>> {
        let mut slot = {
            let mut state = self.inner.lock_state()?;
            if let Some(board) = state.servable_entry(project_id) {
                return Ok(board);
            }
            LaneSlot::join(&mut state.lanes, project_id)
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            slot.wait_turn().await;
            let outcome = inner.fetch_unless_fresh(project_id).await;
            drop(slot);
            outcome
        })
        .await
        .unwrap_or_else(|err| Err(BoardCacheError::Interrupted(err.to_string())))
    }

    /// Returns the cached board without fetching.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCacheError::StatePoisoned`] when the state lock is
    /// poisoned.
    pub fn cached(&self, project_id: ProjectId) -> BoardCacheResult<Option<Arc<Board>>> {
        let state = self.inner.lock_state()?;
        Ok(state
            .entries
            .get(&project_id)
            .map(|entry| Arc::clone(&entry.board)))
    }

    /// Refetches the board once every in-flight move for the project has
    /// reconciled, replacing the cached entry.
    ///
    /// Like a move, the refetch keeps its place in the project's lane and
    /// runs to completion even if the caller stops waiting.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCacheError::Query`] with the fetch failure unchanged;
    /// the cached entry is left as it was.
    pub async fn refresh(&self, project_id: ProjectId) -> BoardCacheResult<Arc<Board>> {
        let mut slot = {
            let mut state = self.inner.lock_state()?;
            LaneSlot::join(&mut state.lanes, project_id)
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            slot.wait_turn().await;
            let outcome = inner.refetch(project_id).await;
            drop(slot);
            outcome
        })
        .await
        .unwrap_or_else(|err| Err(BoardCacheError::Interrupted(err.to_string())))
    }

    /// Discards the project's cached board.
    ///
    /// Moves still in flight for the project settle normally for their
    /// callers but no longer touch the cache. Subscriptions stay open.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCacheError::StatePoisoned`] when the state lock is
    /// poisoned.
    pub fn evict(&self, project_id: ProjectId) -> BoardCacheResult<bool> {
        let mut state = self.inner.lock_state()?;
        Ok(state.entries.remove(&project_id).is_some())
    }

    /// Subscribes to every change of the project's cached board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCacheError::StatePoisoned`] when the state lock is
    /// poisoned.
    pub fn subscribe(
        &self,
        project_id: ProjectId,
    ) -> BoardCacheResult<broadcast::Receiver<BoardChange>> {
        let capacity = self.inner.config.effective_event_capacity();
        let mut state = self.inner.lock_state()?;
        Ok(state
            .channels
            .entry(project_id)
            .or_insert_with(|| broadcast::channel(capacity).0)
            .subscribe())
    }

    /// Moves a task and waits until the move is confirmed or rolled back.
    ///
    /// # Errors
    ///
    /// See [`Self::dispatch_move`] and [`PendingMove::settled`].
    pub async fn move_task(
        &self,
        project_id: ProjectId,
        intent: MoveIntent,
    ) -> BoardCacheResult<Task> {
        self.dispatch_move(project_id, intent)?.settled().await
    }

    /// Starts a task move.
    ///
    /// When no other operation holds the project's lane, the move is checked
    /// and its speculative change is applied to the cached board before this
    /// returns.
    ///
    /// Otherwise the move queues behind the in-flight ones. A queued move is
    /// not visible on the cached board, and is not checked, until every
    /// earlier move has been confirmed or rolled back. A
    /// [`BoardCacheError::StaleReference`] found at that point is reported
    /// only by [`PendingMove::settled`], not by this call.
    ///
    /// # Errors
    ///
    /// Returns [`BoardCacheError::NoOp`] when source and target column are
    /// the same. For a move that does not queue, returns
    /// [`BoardCacheError::StaleReference`] when the cached board does not
    /// hold the task in the source column or lacks the target column.
    /// Neither touches the network.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn dispatch_move(
        &self,
        project_id: ProjectId,
        intent: MoveIntent,
    ) -> BoardCacheResult<PendingMove> {
        if intent.is_same_column() {
            return Err(BoardCacheError::NoOp {
                task_id: intent.task_id(),
                column_id: intent.source_column_id(),
            });
        }

        let move_id = MoveId::new();
        let (mut slot, prepared) = {
            let mut state = self.inner.lock_state()?;
            let joined = LaneSlot::join(&mut state.lanes, project_id);
            let prepared = if joined.is_first() {
                Some(state.begin_move(project_id, intent, move_id)?)
            } else {
                tracing::debug!(
                    project_id = %project_id,
                    task_id = %intent.task_id(),
                    move_id = %move_id,
                    "queued move behind in-flight moves"
                );
                None
            };
            (joined, prepared)
        };

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            slot.wait_turn().await;
            let speculative =
                prepared.map_or_else(|| inner.begin_queued(project_id, intent, move_id), Ok)?;
            let outcome = inner.settle(project_id, speculative).await;
            drop(slot);
            outcome
        });

        Ok(PendingMove {
            move_id,
            task_id: intent.task_id(),
            handle,
        })
    }
}

impl<Q, M> CacheInner<Q, M>
where
    Q: BoardQueryService,
    M: TaskMoveService,
{
    fn lock_state(&self) -> BoardCacheResult<MutexGuard<'_, CacheState>> {
        self.state.lock().map_err(|_| BoardCacheError::StatePoisoned)
    }

    fn fresh_entry(&self, project_id: ProjectId) -> BoardCacheResult<Option<Arc<Board>>> {
        let state = self.lock_state()?;
        Ok(state
            .entries
            .get(&project_id)
            .filter(|entry| !entry.stale)
            .map(|entry| Arc::clone(&entry.board)))
    }

    async fn fetch_unless_fresh(&self, project_id: ProjectId) -> BoardCacheResult<Arc<Board>> {
        if let Some(board) = self.fresh_entry(project_id)? {
            return Ok(board);
        }
        tracing::debug!(project_id = %project_id, "fetching board");
        let fetched = self.query.fetch_board(project_id).await?;
        let mut state = self.lock_state()?;
        Ok(state.install(project_id, fetched, ChangeKind::Fetched))
    }

    async fn refetch(&self, project_id: ProjectId) -> BoardCacheResult<Arc<Board>> {
        tracing::debug!(project_id = %project_id, "refreshing board");
        let fetched = self.query.fetch_board(project_id).await?;
        let mut state = self.lock_state()?;
        Ok(state.install(project_id, fetched, ChangeKind::Refreshed))
    }

    fn begin_queued(
        &self,
        project_id: ProjectId,
        intent: MoveIntent,
        move_id: MoveId,
    ) -> BoardCacheResult<SpeculativeMove> {
        let mut state = self.lock_state()?;
        state.begin_move(project_id, intent, move_id)
    }

    /// Issues the remote move and reconciles the cache with its outcome.
    async fn settle(
        &self,
        project_id: ProjectId,
        speculative: SpeculativeMove,
    ) -> BoardCacheResult<Task> {
        let task_id = speculative.request.task_id;
        match self
            .mover
            .move_task(project_id, &speculative.request)
            .await
        {
            Ok(task) => {
                self.adopt_confirmed(project_id, &speculative, task.clone())?;
                if self.config.refetch_after_confirm {
                    self.refetch_after_confirm(project_id, speculative.generation)
                        .await?;
                }
                Ok(task)
            }
            Err(cause) => {
                self.roll_back(project_id, speculative, &cause)?;
                Err(BoardCacheError::MoveRejected { task_id, cause })
            }
        }
    }

    fn adopt_confirmed(
        &self,
        project_id: ProjectId,
        speculative: &SpeculativeMove,
        task: Task,
    ) -> BoardCacheResult<()> {
        let mut state = self.lock_state()?;
        let move_id = speculative.move_id;
        let Some(entry) = state.current_entry(project_id, speculative.generation) else {
            tracing::debug!(
                project_id = %project_id,
                move_id = %move_id,
                "confirmed move for a discarded board; cache untouched"
            );
            return Ok(());
        };

        let task_id = task.id();
        let board = Arc::make_mut(&mut entry.board);
        match board.confirm(task) {
            Ok(placed) => tracing::info!(
                project_id = %project_id,
                task_id = %task_id,
                move_id = %move_id,
                column = %placed.column_id,
                index = placed.index,
                "move confirmed"
            ),
            Err(err) => {
                board.remove_task(task_id);
                entry.stale = true;
                tracing::warn!(
                    project_id = %project_id,
                    task_id = %task_id,
                    move_id = %move_id,
                    error = %err,
                    "confirmed task does not fit the cached board; marked stale"
                );
            }
        }
        let changed = Arc::clone(&entry.board);
        state.publish(project_id, ChangeKind::Confirmed(move_id), changed);
        Ok(())
    }

    fn roll_back(
        &self,
        project_id: ProjectId,
        speculative: SpeculativeMove,
        cause: &TaskMoveError,
    ) -> BoardCacheResult<()> {
        let mut state = self.lock_state()?;
        let move_id = speculative.move_id;
        let Some(entry) = state.current_entry(project_id, speculative.generation) else {
            tracing::debug!(
                project_id = %project_id,
                move_id = %move_id,
                "rejected move for a discarded board; cache untouched"
            );
            return Ok(());
        };

        entry.board = speculative.snapshot.restore();
        let board = Arc::clone(&entry.board);
        state.publish(project_id, ChangeKind::RolledBack(move_id), board);
        tracing::warn!(
            project_id = %project_id,
            task_id = %speculative.request.task_id,
            move_id = %move_id,
            error = %cause,
            "move rejected; board rolled back"
        );
        Ok(())
    }

    async fn refetch_after_confirm(
        &self,
        project_id: ProjectId,
        generation: u64,
    ) -> BoardCacheResult<()> {
        let fetched = self.query.fetch_board(project_id).await;
        let mut state = self.lock_state()?;
        let Some(entry) = state.current_entry(project_id, generation) else {
            return Ok(());
        };
        match fetched {
            Ok(board) => {
                let refreshed = Arc::new(board);
                entry.board = Arc::clone(&refreshed);
                entry.stale = false;
                state.publish(project_id, ChangeKind::Refreshed, refreshed);
            }
            Err(err) => {
                entry.stale = true;
                tracing::warn!(
                    project_id = %project_id,
                    error = %err,
                    "refetch after confirmed move failed; marked stale"
                );
            }
        }
        Ok(())
    }
}
