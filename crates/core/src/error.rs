use crate::types::EntityId;

/// Domain error shared by the store, the board controller, and callers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An operation referenced an id absent from the collection.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    /// Malformed input: empty required field, inverted date range,
    /// out-of-range progress.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation is blocked by current state and can only be resolved
    /// by further caller action (e.g. deleting dependent tasks first).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A modeled I/O failure from the remote link. The store never retries
    /// internally; retry policy belongs to the caller.
    #[error("Transient failure: {0}")]
    Transient(String),
}

impl CoreError {
    /// Only transient failures are worth retrying; the other kinds need
    /// caller-side correction first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(CoreError::Transient("socket reset".into()).is_retryable());
        assert!(!CoreError::Validation("empty name".into()).is_retryable());
        assert!(!CoreError::Conflict("tasks remain".into()).is_retryable());
        assert!(!CoreError::NotFound {
            entity: "project",
            id: uuid::Uuid::new_v4()
        }
        .is_retryable());
    }

    #[test]
    fn test_not_found_message_names_entity_and_id() {
        let id = uuid::Uuid::new_v4();
        let err = CoreError::NotFound {
            entity: "task",
            id,
        };
        let msg = err.to_string();
        assert!(msg.contains("task"));
        assert!(msg.contains(&id.to_string()));
    }
}
