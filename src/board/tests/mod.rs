//! Unit tests for the board module, plus shared fixtures.


use crate::board::{
    adapters::memory::InMemoryBoardBackend,
    domain::{Board, Column, ColumnId, ProjectId, Task, TaskId},
    ports::{TaskMoveError, TaskMoveRequest, TaskMoveResult, TaskMoveService},
};
use async_trait::async_trait;
use mockable::DefaultClock;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub(super) const PROJECT: ProjectId = ProjectId::new(7);
pub(super) const TODO: ColumnId = ColumnId::new(1);
pub(super) const DOING: ColumnId = ColumnId::new(2);
pub(super) const DONE: ColumnId = ColumnId::new(3);
pub(super) const DRAFT_COPY: TaskId = TaskId::new(11);
pub(super) const PICK_PALETTE: TaskId = TaskId::new(12);

pub(super) fn task(id: TaskId, column_id: ColumnId, title: &str) -> Task {
    Task::new(id, column_id, title).expect("valid task title")
}

/// Board with two tasks in "To do" and empty "Doing" and "Done" columns.
pub(super) fn sample_board() -> Board {
    Board::new(
        PROJECT,
        "Website relaunch",
        vec![
            Column::new(DONE, "Done", 2),
            Column::new(TODO, "To do", 0).with_tasks(vec![
                task(DRAFT_COPY, TODO, "Draft copy").with_position(0),
                task(PICK_PALETTE, TODO, "Pick palette").with_position(1),
            ]),
            Column::new(DOING, "Doing", 1),
        ],
    )
    .expect("valid sample board")
}

/// Task ids per column, in display order.
pub(super) fn layout(board: &Board) -> Vec<(ColumnId, Vec<TaskId>)> {
    board
        .columns()
        .iter()
        .map(|column| (column.id(), column.task_ids().collect()))
        .collect()
}

pub(super) fn backend_with_sample() -> InMemoryBoardBackend<DefaultClock> {
    let backend = InMemoryBoardBackend::new(DefaultClock);
    backend.insert_board(sample_board());
    backend
}

/// How a held remote move should settle.
#[derive(Debug)]
pub(super) enum GateDecision {
    Proceed,
    Fail(TaskMoveError),
}

/// Release handle for one held remote move.
#[derive(Debug)]
pub(super) struct Gate(oneshot::Sender<GateDecision>);

impl Gate {
    pub(super) fn proceed(self) {
        self.0
            .send(GateDecision::Proceed)
            .expect("held move still waiting");
    }

    pub(super) fn fail(self, error: TaskMoveError) {
        self.0
            .send(GateDecision::Fail(error))
            .expect("held move still waiting");
    }
}

/// Move service that holds calls open until the test releases them.
///
/// Gates are held per task and consumed in arrival order; calls for a task
/// without a pending gate go straight to the wrapped backend.
pub(super) struct GatedMover {
    backend: InMemoryBoardBackend<DefaultClock>,
    gates: Mutex<HashMap<TaskId, VecDeque<oneshot::Receiver<GateDecision>>>>,
}

impl GatedMover {
    pub(super) fn new(backend: InMemoryBoardBackend<DefaultClock>) -> Self {
        Self {
            backend,
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Holds the next remote move of `task_id` until the gate is released.
    pub(super) fn hold(&self, task_id: TaskId) -> Gate {
        let (sender, receiver) = oneshot::channel();
        self.gates
            .lock()
            .expect("gate lock")
            .entry(task_id)
            .or_default()
            .push_back(receiver);
        Gate(sender)
    }
}

#[async_trait]
impl TaskMoveService for GatedMover {
    async fn move_task(
        &self,
        project_id: ProjectId,
        request: &TaskMoveRequest,
    ) -> TaskMoveResult<Task> {
        let gate = self
            .gates
            .lock()
            .expect("gate lock")
            .get_mut(&request.task_id)
            .and_then(VecDeque::pop_front);
        if let Some(receiver) = gate {
            match receiver.await {
                Ok(GateDecision::Proceed) => {}
                Ok(GateDecision::Fail(error)) => return Err(error),
                Err(_) => return Err(TaskMoveError::network(std::io::Error::other("gate dropped"))),
            }
        }
        self.backend.move_task(project_id, request).await
    }
}

pub(super) fn gated(backend: &InMemoryBoardBackend<DefaultClock>) -> Arc<GatedMover> {
    Arc::new(GatedMover::new(backend.clone()))
}
