//! Move intents produced by the UI when a drag gesture completes.

use super::{ColumnId, TaskId};
use serde::{Deserialize, Serialize};

/// A request to relocate a task between columns.
///
/// Produced once per completed drag gesture and consumed once by the board
/// cache. Positions are optional: without a target position the task is
/// appended to the target column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveIntent {
    task_id: TaskId,
    source_column_id: ColumnId,
    target_column_id: ColumnId,
    #[serde(default)]
    source_position: Option<usize>,
    #[serde(default)]
    target_position: Option<usize>,
}

impl MoveIntent {
    /// Creates an intent that appends the task to the target column.
    #[must_use]
    pub const fn new(task_id: TaskId, source_column_id: ColumnId, target_column_id: ColumnId) -> Self {
        Self {
            task_id,
            source_column_id,
            target_column_id,
            source_position: None,
            target_position: None,
        }
    }

    /// Records the task's index in the source column as seen by the UI.
    #[must_use]
    pub const fn with_source_position(mut self, position: usize) -> Self {
        self.source_position = Some(position);
        self
    }

    /// Requests a specific index in the target column.
    #[must_use]
    pub const fn with_target_position(mut self, position: usize) -> Self {
        self.target_position = Some(position);
        self
    }

    /// Returns the task being moved.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the column the UI saw the task in.
    #[must_use]
    pub const fn source_column_id(&self) -> ColumnId {
        self.source_column_id
    }

    /// Returns the drop target column.
    #[must_use]
    pub const fn target_column_id(&self) -> ColumnId {
        self.target_column_id
    }

    /// Returns the UI's source index, if recorded.
    #[must_use]
    pub const fn source_position(&self) -> Option<usize> {
        self.source_position
    }

    /// Returns the requested target index, if any.
    #[must_use]
    pub const fn target_position(&self) -> Option<usize> {
        self.target_position
    }

    /// Returns `true` when source and target column are the same.
    #[must_use]
    pub const fn is_same_column(&self) -> bool {
        self.source_column_id.value() == self.target_column_id.value()
    }
}
