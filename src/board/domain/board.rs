//! Board aggregate and the operations used to rearrange it.

use super::{BoardDomainError, Column, ColumnId, ProjectId, Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where a task currently sits on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskLocation {
    /// Column holding the task.
    pub column_id: ColumnId,
    /// Zero-based index inside the column.
    pub index: usize,
}

/// The full column and task arrangement for one project.
///
/// Invariants, checked on construction and on deserialisation:
///
/// - columns are ordered by `(position, id)`;
/// - column identifiers are unique;
/// - every task appears exactly once on the board;
/// - every task's `column_id` names the column that holds it.
///
/// The rearranging operations preserve these invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardWire", rename_all = "camelCase")]
pub struct Board {
    project_id: ProjectId,
    #[serde(rename = "projectName")]
    name: String,
    columns: Vec<Column>,
}

/// Unvalidated board shape as sent by the backend.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardWire {
    project_id: ProjectId,
    project_name: String,
    #[serde(default)]
    columns: Vec<Column>,
}

impl TryFrom<BoardWire> for Board {
    type Error = BoardDomainError;

    fn try_from(wire: BoardWire) -> Result<Self, Self::Error> {
        Self::new(wire.project_id, wire.project_name, wire.columns)
    }
}

impl Board {
    /// Creates a validated board, ordering columns by position then id.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::DuplicateColumn`],
    /// [`BoardDomainError::DuplicateTask`] or
    /// [`BoardDomainError::ColumnMismatch`] when the arrangement violates the
    /// board invariants.
    pub fn new(
        project_id: ProjectId,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = Column>,
    ) -> Result<Self, BoardDomainError> {
        let mut ordered: Vec<Column> = columns.into_iter().collect();
        ordered.sort_by_key(Column::sort_key);

        let mut column_ids = HashSet::new();
        let mut task_ids = HashSet::new();
        for column in &ordered {
            if !column_ids.insert(column.id()) {
                return Err(BoardDomainError::DuplicateColumn(column.id()));
            }
            for task in column.tasks() {
                if !task_ids.insert(task.id()) {
                    return Err(BoardDomainError::DuplicateTask(task.id()));
                }
                if task.column_id() != column.id() {
                    return Err(BoardDomainError::ColumnMismatch {
                        task_id: task.id(),
                        holder: column.id(),
                        declared: task.column_id(),
                    });
                }
            }
        }

        Ok(Self {
            project_id,
            name: name.into(),
            columns: ordered,
        })
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the board display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Finds a column by identifier.
    #[must_use]
    pub fn column(&self, column_id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| column.id() == column_id)
    }

    /// Finds a task anywhere on the board.
    #[must_use]
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.columns
            .iter()
            .flat_map(Column::tasks)
            .find(|task| task.id() == task_id)
    }

    /// Returns the column and index currently holding a task.
    #[must_use]
    pub fn locate(&self, task_id: TaskId) -> Option<TaskLocation> {
        self.columns.iter().find_map(|column| {
            column.index_of(task_id).map(|index| TaskLocation {
                column_id: column.id(),
                index,
            })
        })
    }

    /// Moves a task into `target_column`.
    ///
    /// The task is inserted at `target_index`, clamped to the target column's
    /// length, or appended when no index is given. Every task in the source
    /// and target columns, the moved one included, gets its `position`
    /// rewritten to its new index.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::UnknownColumn`] or
    /// [`BoardDomainError::UnknownTask`] without modifying the board.
    pub fn relocate(
        &mut self,
        task_id: TaskId,
        target_column: ColumnId,
        target_index: Option<usize>,
    ) -> Result<TaskLocation, BoardDomainError> {
        if self.column(target_column).is_none() {
            return Err(BoardDomainError::UnknownColumn(target_column));
        }
        let (_, mut task) = self
            .take_task(task_id)
            .ok_or(BoardDomainError::UnknownTask(task_id))?;
        let source_column = task.column_id();
        let column = self
            .column_mut(target_column)
            .ok_or(BoardDomainError::UnknownColumn(target_column))?;
        let index = column.clamp_index(target_index);
        task.place(target_column, u32::try_from(index).unwrap_or(u32::MAX));
        column.insert_clamped(index, task);
        column.renumber(None);
        self.renumber(source_column, None);
        Ok(TaskLocation {
            column_id: target_column,
            index,
        })
    }

    /// Replaces the board's entry for `task` with the given representation.
    ///
    /// The task lands in the column it names, at its own `position` (clamped)
    /// or at the end of the column when it carries none. Any existing entry
    /// for the same task id is removed first, wherever it sits. The other
    /// tasks of the affected columns get their `position` rewritten to their
    /// index; the confirmed task keeps the server's value.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::UnknownColumn`] when the task names a
    /// column that is not on the board; the board is left unchanged.
    pub fn confirm(&mut self, task: Task) -> Result<TaskLocation, BoardDomainError> {
        let column_id = task.column_id();
        if self.column(column_id).is_none() {
            return Err(BoardDomainError::UnknownColumn(column_id));
        }
        let previous_column = self
            .take_task(task.id())
            .map(|(_, previous)| previous.column_id());
        let task_id = task.id();
        let requested = task
            .position()
            .map(|position| usize::try_from(position).unwrap_or(usize::MAX));
        let column = self
            .column_mut(column_id)
            .ok_or(BoardDomainError::UnknownColumn(column_id))?;
        let index = column.clamp_index(requested);
        column.insert_clamped(index, task);
        column.renumber(Some(task_id));
        if let Some(previous) = previous_column.filter(|previous| *previous != column_id) {
            self.renumber(previous, None);
        }
        Ok(TaskLocation { column_id, index })
    }

    /// Removes a task from the board, returning it.
    pub fn remove_task(&mut self, task_id: TaskId) -> Option<Task> {
        self.take_task(task_id).map(|(_, task)| task)
    }

    fn take_task(&mut self, task_id: TaskId) -> Option<(usize, Task)> {
        self.columns
            .iter_mut()
            .find_map(|column| column.take(task_id))
    }

    fn renumber(&mut self, column_id: ColumnId, keep: Option<TaskId>) {
        if let Some(column) = self.column_mut(column_id) {
            column.renumber(keep);
        }
    }

    fn column_mut(&mut self, column_id: ColumnId) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|column| column.id() == column_id)
    }
}
