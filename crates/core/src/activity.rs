//! Activity log vocabulary and entry type.
//!
//! The store records one entry per successful mutation; the actor comes
//! from the session boundary when one is present.

use serde::Serialize;

use crate::types::{EntityId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types for activity entries.
pub mod action_types {
    pub const ENTITY_CREATE: &str = "entity_create";
    pub const ENTITY_UPDATE: &str = "entity_update";
    pub const ENTITY_DELETE: &str = "entity_delete";
    pub const STATUS_CHANGE: &str = "status_change";
    pub const COMMENT_ADD: &str = "comment_add";
    pub const ATTACHMENT_ADD: &str = "attachment_add";
}

// ---------------------------------------------------------------------------
// Entity type constants
// ---------------------------------------------------------------------------

/// Known entity types referenced by activity entries.
pub mod entity_types {
    pub const PROJECT: &str = "project";
    pub const TASK: &str = "task";
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One recorded mutation against the store.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: EntityId,
    /// One of [`action_types`].
    pub action: &'static str,
    /// One of [`entity_types`].
    pub entity_type: &'static str,
    pub entity_id: EntityId,
    /// Acting user, when the session boundary supplies one.
    pub actor_id: Option<UserId>,
    /// Free-form JSON payload with action-specific detail.
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

impl ActivityEntry {
    /// Create an entry with an empty details object.
    pub fn new(
        action: &'static str,
        entity_type: &'static str,
        entity_id: EntityId,
        actor_id: Option<UserId>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            action,
            entity_type,
            entity_id,
            actor_id,
            details: serde_json::Value::Object(Default::default()),
            created_at,
        }
    }

    /// Attach action-specific detail.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_new_entry_has_empty_details() {
        let entry = ActivityEntry::new(
            action_types::ENTITY_CREATE,
            entity_types::PROJECT,
            Uuid::new_v4(),
            None,
            Utc::now(),
        );
        assert_eq!(entry.action, "entity_create");
        assert!(entry.details.as_object().unwrap().is_empty());
        assert!(entry.actor_id.is_none());
    }

    #[test]
    fn test_with_details_replaces_payload() {
        let entry = ActivityEntry::new(
            action_types::STATUS_CHANGE,
            entity_types::TASK,
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            Utc::now(),
        )
        .with_details(serde_json::json!({"from": "todo", "to": "review"}));
        assert_eq!(entry.details["from"], "todo");
        assert_eq!(entry.details["to"], "review");
    }
}
