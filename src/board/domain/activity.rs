//! Activity log entries recorded by the backend for board changes.

use super::{ColumnId, ProjectId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Kind of board change an activity entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    /// A task changed column or position.
    TaskMoved,
}

/// One entry of a project's activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    id: u64,
    project_id: ProjectId,
    task_id: TaskId,
    task_title: String,
    action_type: ActivityAction,
    from_column_id: ColumnId,
    to_column_id: ColumnId,
    from_position: usize,
    to_position: usize,
    created_at: DateTime<Utc>,
}

/// Parameter object describing a completed task move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskMovedRecord {
    /// Project whose board changed.
    pub project_id: ProjectId,
    /// Moved task.
    pub task_id: TaskId,
    /// Title of the moved task at move time.
    pub task_title: String,
    /// Column the task left.
    pub from_column_id: ColumnId,
    /// Column the task entered.
    pub to_column_id: ColumnId,
    /// Index the task left.
    pub from_position: usize,
    /// Index the task entered.
    pub to_position: usize,
}

impl ActivityEntry {
    /// Records a task move, stamped with the clock's current time.
    #[must_use]
    pub fn task_moved(id: u64, record: TaskMovedRecord, clock: &impl Clock) -> Self {
        Self {
            id,
            project_id: record.project_id,
            task_id: record.task_id,
            task_title: record.task_title,
            action_type: ActivityAction::TaskMoved,
            from_column_id: record.from_column_id,
            to_column_id: record.to_column_id,
            from_position: record.from_position,
            to_position: record.to_position,
            created_at: clock.utc(),
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the task the entry is about.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the task title captured when the entry was written.
    #[must_use]
    pub fn task_title(&self) -> &str {
        &self.task_title
    }

    /// Returns the recorded action.
    #[must_use]
    pub const fn action(&self) -> ActivityAction {
        self.action_type
    }

    /// Returns the column the task left.
    #[must_use]
    pub const fn from_column_id(&self) -> ColumnId {
        self.from_column_id
    }

    /// Returns the column the task entered.
    #[must_use]
    pub const fn to_column_id(&self) -> ColumnId {
        self.to_column_id
    }

    /// Returns the index the task left.
    #[must_use]
    pub const fn from_position(&self) -> usize {
        self.from_position
    }

    /// Returns the index the task entered.
    #[must_use]
    pub const fn to_position(&self) -> usize {
        self.to_position
    }

    /// Returns when the entry was written.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
