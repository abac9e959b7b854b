//! The entity store: sole authority over the project and task collections.
//!
//! All operations are async and model one remote round trip through
//! [`RemoteLink`] before touching state. Mutations are applied and
//! published under the write lock, so a subscriber can never observe a
//! half-applied change, and a caller awaiting a mutation never sees the
//! bus deliver state older than its own requested change.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use flowdeck_core::activity::{action_types, entity_types, ActivityEntry};
use flowdeck_core::types::{EntityId, Timestamp};
use flowdeck_core::{
    compute_stats, Attachment, Comment, CoreError, DashboardStats, NewAttachment, NewComment,
    NewProject, NewTask, Project, ProjectPatch, Task, TaskPatch,
};
use flowdeck_events::{ChangeBus, ChangeEvent, CollectionSnapshot};

use crate::link::{LocalLink, RemoteLink};
use crate::session::{Identity, StaticIdentity};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Activity entries beyond this count are dropped oldest-first.
pub const MAX_ACTIVITY_ENTRIES: usize = 1_000;

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// The owned entity collections, guarded by one `RwLock` so that a
/// mutation plus its change notification is atomic with respect to
/// readers and other writers.
#[derive(Default)]
struct Collections {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    current_project: Option<EntityId>,
    activity: Vec<ActivityEntry>,
}

impl Collections {
    fn project_mut(&mut self, id: EntityId) -> Result<&mut Project, CoreError> {
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CoreError::NotFound {
                entity: entity_types::PROJECT,
                id,
            })
    }

    fn task_mut(&mut self, id: EntityId) -> Result<&mut Task, CoreError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(CoreError::NotFound {
                entity: entity_types::TASK,
                id,
            })
    }

    fn project_exists(&self, id: EntityId) -> bool {
        self.projects.iter().any(|p| p.id == id)
    }
}

// ---------------------------------------------------------------------------
// EntityStore
// ---------------------------------------------------------------------------

/// Owned, explicitly constructed store instance; one per application
/// session. External components receive cloned snapshots and must route
/// every mutation through these operations.
pub struct EntityStore {
    state: RwLock<Collections>,
    bus: ChangeBus,
    link: Arc<dyn RemoteLink>,
    identity: Arc<dyn Identity>,
}

impl EntityStore {
    /// Build a store over the given transport link and session identity.
    pub fn new(link: Arc<dyn RemoteLink>, identity: Arc<dyn Identity>) -> Self {
        Self {
            state: RwLock::new(Collections::default()),
            bus: ChangeBus::default(),
            link,
            identity,
        }
    }

    /// A store with an instant, always-successful link and no session.
    /// The default for tests.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(LocalLink::instant()),
            Arc::new(StaticIdentity::anonymous()),
        )
    }

    /// Subscribe to change events. Each successful mutation delivers one
    /// event carrying a fresh snapshot of the affected collection.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.bus.subscribe()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Snapshot of all projects.
    pub async fn list_projects(&self) -> Result<Vec<Project>, CoreError> {
        self.link.round_trip("project.list").await?;
        Ok(self.state.read().await.projects.clone())
    }

    /// Fetch a single project.
    pub async fn get_project(&self, id: EntityId) -> Result<Project, CoreError> {
        self.link.round_trip("project.get").await?;
        let state = self.state.read().await;
        state
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: entity_types::PROJECT,
                id,
            })
    }

    /// Snapshot of tasks, optionally filtered to one project.
    pub async fn list_tasks(&self, project_id: Option<EntityId>) -> Result<Vec<Task>, CoreError> {
        self.link.round_trip("task.list").await?;
        let state = self.state.read().await;
        Ok(match project_id {
            Some(pid) => state
                .tasks
                .iter()
                .filter(|t| t.project_id == pid)
                .cloned()
                .collect(),
            None => state.tasks.clone(),
        })
    }

    /// Fetch a single task.
    pub async fn get_task(&self, id: EntityId) -> Result<Task, CoreError> {
        self.link.round_trip("task.get").await?;
        let state = self.state.read().await;
        state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(CoreError::NotFound {
                entity: entity_types::TASK,
                id,
            })
    }

    /// Dashboard aggregates over the current snapshot. Derived locally,
    /// no round trip.
    pub async fn dashboard_stats(&self, now: Timestamp) -> DashboardStats {
        let state = self.state.read().await;
        compute_stats(&state.projects, &state.tasks, now)
    }

    /// Most recent activity entries, newest first.
    pub async fn recent_activity(&self, limit: usize) -> Vec<ActivityEntry> {
        let state = self.state.read().await;
        state.activity.iter().rev().take(limit).cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Project mutations
    // -----------------------------------------------------------------------

    /// Create a project. Assigns a fresh v4 uuid and server-side
    /// timestamps; random ids stay unique under arbitrarily rapid
    /// back-to-back creates.
    pub async fn create_project(&self, data: NewProject) -> Result<Project, CoreError> {
        data.validate()?;
        self.link.round_trip("project.create").await?;

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            status: data.status,
            priority: data.priority,
            start_date: data.start_date,
            end_date: data.end_date,
            progress: data.progress,
            owner_id: data.owner_id,
            team_members: flowdeck_core::project::dedup_members(&data.team_members),
            created_at: now,
            updated_at: now,
        };

        let mut state = self.state.write().await;
        state.projects.push(project.clone());
        self.record(
            &mut state,
            action_types::ENTITY_CREATE,
            entity_types::PROJECT,
            project.id,
            json!({ "name": &project.name }),
        );
        self.publish_projects(&state, "project.created", project.id);

        tracing::info!(project_id = %project.id, name = %project.name, "Project created");
        Ok(project)
    }

    /// Merge a patch over an existing project. Cross-field rules are
    /// checked against the merged record, so a patch may move either end
    /// of the date range as long as the result stays ordered.
    pub async fn update_project(
        &self,
        id: EntityId,
        patch: ProjectPatch,
    ) -> Result<Project, CoreError> {
        self.link.round_trip("project.update").await?;

        let mut state = self.state.write().await;
        let existing = state.project_mut(id)?;

        let mut merged = existing.clone();
        patch.apply(&mut merged);
        merged.validate()?;
        merged.updated_at = Utc::now();
        *existing = merged.clone();

        self.record(
            &mut state,
            action_types::ENTITY_UPDATE,
            entity_types::PROJECT,
            id,
            json!({}),
        );
        self.publish_projects(&state, "project.updated", id);

        tracing::debug!(project_id = %id, "Project updated");
        Ok(merged)
    }

    /// Delete a project. Blocked with a conflict while tasks still
    /// reference it; callers must delete or reassign those tasks first.
    pub async fn delete_project(&self, id: EntityId) -> Result<(), CoreError> {
        self.link.round_trip("project.delete").await?;

        let mut state = self.state.write().await;
        if !state.project_exists(id) {
            return Err(CoreError::NotFound {
                entity: entity_types::PROJECT,
                id,
            });
        }

        let dependents = state.tasks.iter().filter(|t| t.project_id == id).count();
        if dependents > 0 {
            return Err(CoreError::Conflict(format!(
                "Cannot delete project: {dependents} task(s) still reference it"
            )));
        }

        state.projects.retain(|p| p.id != id);
        if state.current_project == Some(id) {
            state.current_project = None;
        }
        self.record(
            &mut state,
            action_types::ENTITY_DELETE,
            entity_types::PROJECT,
            id,
            json!({}),
        );
        self.publish_projects(&state, "project.deleted", id);

        tracing::info!(project_id = %id, "Project deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Task mutations
    // -----------------------------------------------------------------------

    /// Create a task. The referenced project must exist.
    pub async fn create_task(&self, data: NewTask) -> Result<Task, CoreError> {
        data.validate()?;
        self.link.round_trip("task.create").await?;

        let mut state = self.state.write().await;
        if !state.project_exists(data.project_id) {
            return Err(CoreError::NotFound {
                entity: entity_types::PROJECT,
                id: data.project_id,
            });
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            assignee_id: data.assignee_id,
            project_id: data.project_id,
            due_date: data.due_date,
            tags: flowdeck_core::task::dedup_tags(&data.tags),
            attachments: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        state.tasks.push(task.clone());
        self.record(
            &mut state,
            action_types::ENTITY_CREATE,
            entity_types::TASK,
            task.id,
            json!({ "title": &task.title, "project_id": task.project_id }),
        );
        self.publish_tasks(&state, "task.created", task.id);

        tracing::info!(task_id = %task.id, title = %task.title, "Task created");
        Ok(task)
    }

    /// Merge a patch over an existing task. A `status` patch is the board
    /// controller's commit path; a `project_id` patch must resolve.
    pub async fn update_task(&self, id: EntityId, patch: TaskPatch) -> Result<Task, CoreError> {
        if let Some(title) = &patch.title {
            flowdeck_core::task::validate_task_title(title)?;
        }
        if let Some(tags) = &patch.tags {
            flowdeck_core::task::validate_tags(tags)?;
        }
        self.link.round_trip("task.update").await?;

        let mut state = self.state.write().await;
        if let Some(project_id) = patch.project_id {
            if !state.project_exists(project_id) {
                return Err(CoreError::NotFound {
                    entity: entity_types::PROJECT,
                    id: project_id,
                });
            }
        }

        let existing = state.task_mut(id)?;
        let previous_status = existing.status;

        let mut merged = existing.clone();
        patch.apply(&mut merged);
        merged.updated_at = Utc::now();
        *existing = merged.clone();

        if merged.status != previous_status {
            self.record(
                &mut state,
                action_types::STATUS_CHANGE,
                entity_types::TASK,
                id,
                json!({ "from": previous_status, "to": merged.status }),
            );
        } else {
            self.record(
                &mut state,
                action_types::ENTITY_UPDATE,
                entity_types::TASK,
                id,
                json!({}),
            );
        }
        self.publish_tasks(&state, "task.updated", id);

        tracing::debug!(task_id = %id, status = ?merged.status, "Task updated");
        Ok(merged)
    }

    /// Delete a task. Owned comments and attachments go with it.
    pub async fn delete_task(&self, id: EntityId) -> Result<(), CoreError> {
        self.link.round_trip("task.delete").await?;

        let mut state = self.state.write().await;
        let Some(index) = state.tasks.iter().position(|t| t.id == id) else {
            return Err(CoreError::NotFound {
                entity: entity_types::TASK,
                id,
            });
        };

        let removed = state.tasks.remove(index);
        self.record(
            &mut state,
            action_types::ENTITY_DELETE,
            entity_types::TASK,
            id,
            json!({
                "cascaded_comments": removed.comments.len(),
                "cascaded_attachments": removed.attachments.len(),
            }),
        );
        self.publish_tasks(&state, "task.deleted", id);

        tracing::info!(task_id = %id, "Task deleted");
        Ok(())
    }

    /// Append a comment to a task; refreshes the task's `updated_at`.
    pub async fn add_comment(
        &self,
        task_id: EntityId,
        data: NewComment,
    ) -> Result<Comment, CoreError> {
        data.validate()?;
        self.link.round_trip("task.comment").await?;

        let mut state = self.state.write().await;
        let task = state.task_mut(task_id)?;

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            content: data.content,
            author_id: data.author_id,
            created_at: now,
        };
        task.comments.push(comment.clone());
        task.updated_at = now;

        self.record(
            &mut state,
            action_types::COMMENT_ADD,
            entity_types::TASK,
            task_id,
            json!({ "comment_id": comment.id }),
        );
        self.publish_tasks(&state, "task.comment_added", task_id);

        tracing::debug!(task_id = %task_id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    /// Append an attachment to a task; refreshes the task's `updated_at`.
    pub async fn add_attachment(
        &self,
        task_id: EntityId,
        data: NewAttachment,
    ) -> Result<Attachment, CoreError> {
        data.validate()?;
        self.link.round_trip("task.attach").await?;

        let mut state = self.state.write().await;
        let task = state.task_mut(task_id)?;

        let now = Utc::now();
        let attachment = Attachment {
            id: Uuid::new_v4(),
            name: data.name,
            size: data.size,
            mime_type: data.mime_type,
            url: data.url,
            uploaded_by: data.uploaded_by,
            uploaded_at: now,
        };
        task.attachments.push(attachment.clone());
        task.updated_at = now;

        self.record(
            &mut state,
            action_types::ATTACHMENT_ADD,
            entity_types::TASK,
            task_id,
            json!({ "attachment_id": attachment.id }),
        );
        self.publish_tasks(&state, "task.attachment_added", task_id);

        tracing::debug!(task_id = %task_id, attachment_id = %attachment.id, "Attachment added");
        Ok(attachment)
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select (or clear) the current project. Selection is session-local
    /// state; it does not publish a change event.
    pub async fn set_current_project(&self, id: Option<EntityId>) -> Result<(), CoreError> {
        let mut state = self.state.write().await;
        if let Some(id) = id {
            if !state.project_exists(id) {
                return Err(CoreError::NotFound {
                    entity: entity_types::PROJECT,
                    id,
                });
            }
        }
        state.current_project = id;
        Ok(())
    }

    /// The currently selected project, if any.
    pub async fn current_project(&self) -> Option<EntityId> {
        self.state.read().await.current_project
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn record(
        &self,
        state: &mut Collections,
        action: &'static str,
        entity_type: &'static str,
        entity_id: EntityId,
        details: serde_json::Value,
    ) {
        let entry = ActivityEntry::new(
            action,
            entity_type,
            entity_id,
            self.identity.current_user_id(),
            Utc::now(),
        )
        .with_details(details);
        state.activity.push(entry);
        if state.activity.len() > MAX_ACTIVITY_ENTRIES {
            let excess = state.activity.len() - MAX_ACTIVITY_ENTRIES;
            state.activity.drain(..excess);
        }
    }

    fn publish_projects(&self, state: &Collections, event_type: &str, entity_id: EntityId) {
        self.bus.publish(ChangeEvent::new(
            event_type,
            entity_id,
            CollectionSnapshot::Projects(Arc::new(state.projects.clone())),
        ));
    }

    fn publish_tasks(&self, state: &Collections, event_type: &str, entity_id: EntityId) {
        self.bus.publish(ChangeEvent::new(
            event_type,
            entity_id,
            CollectionSnapshot::Tasks(Arc::new(state.tasks.clone())),
        ));
    }
}
