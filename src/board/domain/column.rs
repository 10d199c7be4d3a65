//! Board columns and their ordered task lists.

use super::{ColumnId, Task, TaskId};
use serde::{Deserialize, Serialize};

/// A board column holding tasks in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    id: ColumnId,
    name: String,
    position: i32,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl Column {
    /// Creates an empty column.
    #[must_use]
    pub fn new(id: ColumnId, name: impl Into<String>, position: i32) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            tasks: Vec::new(),
        }
    }

    /// Sets the column's tasks, in display order.
    #[must_use]
    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.tasks = tasks.into_iter().collect();
        self
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the sort position of the column on its board.
    #[must_use]
    pub const fn position(&self) -> i32 {
        self.position
    }

    /// Returns the tasks in display order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the index of a task within this column.
    #[must_use]
    pub fn index_of(&self, task_id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id() == task_id)
    }

    /// Returns the task identifiers in display order.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.iter().map(Task::id)
    }

    pub(super) fn clamp_index(&self, requested: Option<usize>) -> usize {
        requested.map_or(self.tasks.len(), |index| index.min(self.tasks.len()))
    }

    pub(super) fn take(&mut self, task_id: TaskId) -> Option<(usize, Task)> {
        let index = self.index_of(task_id)?;
        Some((index, self.tasks.remove(index)))
    }

    /// Inserts at an index already bounded by [`Self::clamp_index`].
    pub(super) fn insert_clamped(&mut self, index: usize, task: Task) {
        let bounded = index.min(self.tasks.len());
        self.tasks.insert(bounded, task);
    }

    /// Rewrites every task's `position` to its index, except `keep`'s.
    pub(super) fn renumber(&mut self, keep: Option<TaskId>) {
        let column_id = self.id;
        for (index, task) in self.tasks.iter_mut().enumerate() {
            if Some(task.id()) != keep {
                task.place(column_id, u32::try_from(index).unwrap_or(u32::MAX));
            }
        }
    }

    pub(super) fn sort_key(&self) -> (i32, ColumnId) {
        (self.position, self.id)
    }
}
