//! Task card values held by board columns.

use super::{BoardDomainError, ColumnId, ParseTaskStatusError, TaskId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Workflow status reported by the backend for a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Awaiting review.
    Review,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// Returns the backend representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::Review => "REVIEW",
            Self::Done => "DONE",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "TODO" => Ok(Self::Todo),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "REVIEW" => Ok(Self::Review),
            "DONE" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// A task card on a board.
///
/// `column_id` always names the column that holds the task; [`Board`]
/// construction rejects boards where it does not.
///
/// [`Board`]: super::Board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    column_id: ColumnId,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assignee_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assignee_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<u32>,
}

impl Task {
    /// Creates a task in the given column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTaskTitle`] when the title is blank.
    pub fn new(
        id: TaskId,
        column_id: ColumnId,
        title: impl Into<String>,
    ) -> Result<Self, BoardDomainError> {
        let raw = title.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BoardDomainError::EmptyTaskTitle);
        }
        Ok(Self {
            id,
            column_id,
            title: trimmed.to_owned(),
            description: None,
            status: TaskStatus::Todo,
            assignee_id: None,
            assignee_display_name: None,
            due_date: None,
            tags: None,
            position: None,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the workflow status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee_id: u64, display_name: impl Into<String>) -> Self {
        self.assignee_id = Some(assignee_id);
        self.assignee_display_name = Some(display_name.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the comma-separated tag list.
    #[must_use]
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Sets the server-assigned position inside the column.
    #[must_use]
    pub const fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the column that holds the task.
    #[must_use]
    pub const fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the assignee identifier, if any.
    #[must_use]
    pub const fn assignee_id(&self) -> Option<u64> {
        self.assignee_id
    }

    /// Returns the assignee display name, if any.
    #[must_use]
    pub fn assignee_display_name(&self) -> Option<&str> {
        self.assignee_display_name.as_deref()
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the raw tag string, if any.
    #[must_use]
    pub fn tags(&self) -> Option<&str> {
        self.tags.as_deref()
    }

    /// Iterates over the individual tags, trimmed, skipping blanks.
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }

    /// Returns the position inside the column, if known.
    #[must_use]
    pub const fn position(&self) -> Option<u32> {
        self.position
    }

    pub(super) const fn place(&mut self, column_id: ColumnId, position: u32) {
        self.column_id = column_id;
        self.position = Some(position);
    }
}
