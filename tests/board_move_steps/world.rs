//! Shared world state for board move BDD scenarios.

use std::sync::Arc;

use kanban_board_cache::board::{
    adapters::memory::InMemoryBoardBackend,
    domain::{Board, Column, ColumnId, ProjectId, Task},
    services::{BoardCacheError, OptimisticBoardCache},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Backend used for both board queries and task moves.
pub type TestBackend = InMemoryBoardBackend<DefaultClock>;

/// Cache type used by the BDD world.
pub type TestCache = OptimisticBoardCache<TestBackend, TestBackend>;

/// Scenario world for board move behaviour tests.
pub struct BoardWorld {
    pub backend: TestBackend,
    pub cache: TestCache,
    pub project_id: Option<ProjectId>,
    pub board_before_move: Option<Arc<Board>>,
    pub last_move_result: Option<Result<Task, BoardCacheError>>,
}

impl BoardWorld {
    /// Creates a world with an empty backend and cache.
    #[must_use]
    pub fn new() -> Self {
        let backend = InMemoryBoardBackend::new(DefaultClock);
        let shared = Arc::new(backend.clone());
        let cache = OptimisticBoardCache::new(Arc::clone(&shared), shared);
        Self {
            backend,
            cache,
            project_id: None,
            board_before_move: None,
            last_move_result: None,
        }
    }

    /// Project seeded by the scenario.
    pub fn project(&self) -> Result<ProjectId, eyre::Report> {
        self.project_id
            .ok_or_else(|| eyre::eyre!("missing project in scenario world"))
    }

    /// Resolves a column by its display name on the seeded board.
    pub fn column_named(&self, name: &str) -> Result<ColumnId, eyre::Report> {
        let project_id = self.project()?;
        let board = self
            .backend
            .board(project_id)
            .ok_or_else(|| eyre::eyre!("project {project_id} was not seeded"))?;
        board
            .columns()
            .iter()
            .find(|column| column.name() == name)
            .map(Column::id)
            .ok_or_else(|| eyre::eyre!("no column named {name:?}"))
    }
}

impl Default for BoardWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
