//! Task entity, owned comments/attachments, input payloads, and validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Priority, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length for a task title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum number of tags a task may carry.
pub const MAX_TAGS: usize = 32;

/// Maximum length of a single tag.
pub const MAX_TAG_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Kanban stage of a task. Declared in board order; any stage is reachable
/// from any stage, there is no enforced linear progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Completed,
}

impl TaskStatus {
    /// All statuses in board column order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Completed,
    ];

    /// Human-readable column title.
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Completed => "Completed",
        }
    }
}

// ---------------------------------------------------------------------------
// Owned sub-entities
// ---------------------------------------------------------------------------

/// A comment on a task. Owned by exactly one task and destroyed with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: EntityId,
    pub content: String,
    pub author_id: UserId,
    pub created_at: Timestamp,
}

/// A file attachment on a task. Owned by exactly one task and destroyed
/// with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: EntityId,
    pub name: String,
    /// Size in bytes as reported by the uploader.
    pub size: u64,
    pub mime_type: String,
    pub url: String,
    pub uploaded_by: UserId,
    pub uploaded_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A task record as owned by the entity store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assignee_id: Option<UserId>,
    /// Must reference an existing project; enforced by the store.
    pub project_id: EntityId,
    pub due_date: Option<Timestamp>,
    /// Deduplicated on write; insertion order is preserved.
    pub tags: Vec<String>,
    pub attachments: Vec<Attachment>,
    pub comments: Vec<Comment>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// Derived, never stored: the task has a due date in the past and is
    /// not completed. `now` is an explicit input so the predicate stays
    /// deterministic; the aggregator evaluates it against the same `now`.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        match self.due_date {
            Some(due) => due < now && self.status != TaskStatus::Completed,
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Input payloads
// ---------------------------------------------------------------------------

/// Payload for creating a task. The store assigns id and timestamps and
/// checks that `project_id` resolves.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assignee_id: Option<UserId>,
    pub project_id: EntityId,
    pub due_date: Option<Timestamp>,
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_task_title(&self.title)?;
        validate_tags(&self.tags)?;
        Ok(())
    }
}

/// Partial update for a task. Only provided fields are touched.
///
/// Double-optional fields distinguish "leave as is" from "clear".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<Option<UserId>>,
    pub project_id: Option<EntityId>,
    pub due_date: Option<Option<Timestamp>>,
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// Shorthand for the status-only patch issued by the board controller.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Returns `true` if the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assignee_id.is_none()
            && self.project_id.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
    }

    /// Merge the patch over `task`, leaving timestamps, comments, and
    /// attachments untouched. The caller validates the merged record and
    /// refreshes `updated_at`.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(tags) = &self.tags {
            task.tags = dedup_tags(tags);
        }
    }
}

/// Payload for adding a comment to a task.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub content: String,
    pub author_id: UserId,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.content.trim().is_empty() {
            return Err(CoreError::Validation(
                "Comment content must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Payload for adding an attachment to a task.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAttachment {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub url: String,
    pub uploaded_by: UserId,
}

impl NewAttachment {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Attachment name must not be empty".to_string(),
            ));
        }
        if self.url.trim().is_empty() {
            return Err(CoreError::Validation(
                "Attachment url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a task title: non-empty after trimming, bounded length.
pub fn validate_task_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Task title must not be empty".to_string(),
        ));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Task title must not exceed {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a tag list: bounded count, non-empty bounded entries.
pub fn validate_tags(tags: &[String]) -> Result<(), CoreError> {
    if tags.len() > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "A task may have at most {MAX_TAGS} tags"
        )));
    }
    for (i, tag) in tags.iter().enumerate() {
        if tag.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Tag at index {i} must not be empty"
            )));
        }
        if tag.len() > MAX_TAG_LENGTH {
            return Err(CoreError::Validation(format!(
                "Tag at index {i} must not exceed {MAX_TAG_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Remove duplicate tags, keeping the first occurrence of each.
pub fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.iter()
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
