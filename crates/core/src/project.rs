//! Project entity, input payloads, and validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Priority, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Progress is a whole percentage.
pub const MAX_PROGRESS: u8 = 100;

/// Maximum length for a project name.
pub const MAX_NAME_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
    Cancelled,
}

impl ProjectStatus {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::OnHold => "On Hold",
            Self::Cancelled => "Cancelled",
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A project record as owned by the entity store.
///
/// Instances handed out by the store are snapshots; all mutation goes
/// through the store's operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: Timestamp,
    /// When present, must be on or after `start_date`.
    pub end_date: Option<Timestamp>,
    /// Completion percentage, `0..=100`.
    pub progress: u8,
    pub owner_id: UserId,
    /// Deduplicated on write; insertion order is preserved.
    pub team_members: Vec<UserId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Validate the record's own invariants. Used after patch merging,
    /// where cross-field rules must see the merged values.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_project_name(&self.name)?;
        validate_date_range(self.start_date, self.end_date)?;
        validate_progress(self.progress)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Input payloads
// ---------------------------------------------------------------------------

/// Payload for creating a project. The store assigns id and timestamps.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: Timestamp,
    pub end_date: Option<Timestamp>,
    pub progress: u8,
    pub owner_id: UserId,
    pub team_members: Vec<UserId>,
}

impl NewProject {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_project_name(&self.name)?;
        validate_date_range(self.start_date, self.end_date)?;
        validate_progress(self.progress)?;
        Ok(())
    }
}

/// Partial update for a project. Only provided fields are touched.
///
/// `end_date` is double-optional so a patch can distinguish "leave as is"
/// (`None`) from "clear the end date" (`Some(None)`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Option<Timestamp>>,
    pub progress: Option<u8>,
    pub owner_id: Option<UserId>,
    pub team_members: Option<Vec<UserId>>,
}

impl ProjectPatch {
    /// Returns `true` if the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.progress.is_none()
            && self.owner_id.is_none()
            && self.team_members.is_none()
    }

    /// Merge the patch over `project`, leaving timestamps untouched.
    /// The caller validates the merged record and refreshes `updated_at`.
    pub fn apply(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(priority) = self.priority {
            project.priority = priority;
        }
        if let Some(start_date) = self.start_date {
            project.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            project.end_date = end_date;
        }
        if let Some(progress) = self.progress {
            project.progress = progress;
        }
        if let Some(owner_id) = self.owner_id {
            project.owner_id = owner_id;
        }
        if let Some(team_members) = &self.team_members {
            project.team_members = dedup_members(team_members);
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a project name: non-empty after trimming, bounded length.
pub fn validate_project_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Project name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Project name must not exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate that the end date, when present, is not before the start date.
pub fn validate_date_range(
    start_date: Timestamp,
    end_date: Option<Timestamp>,
) -> Result<(), CoreError> {
    if let Some(end) = end_date {
        if end < start_date {
            return Err(CoreError::Validation(
                "End date must not be before start date".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validate a progress percentage.
pub fn validate_progress(progress: u8) -> Result<(), CoreError> {
    if progress > MAX_PROGRESS {
        return Err(CoreError::Validation(format!(
            "Progress must be between 0 and {MAX_PROGRESS}"
        )));
    }
    Ok(())
}

/// Remove duplicate member ids, keeping the first occurrence of each.
pub fn dedup_members(members: &[UserId]) -> Vec<UserId> {
    let mut seen = std::collections::HashSet::new();
    members
        .iter()
        .filter(|id| seen.insert(**id))
        .copied()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;

    fn sample_new_project() -> NewProject {
        NewProject {
            name: "Website Redesign".to_string(),
            description: "Complete redesign of the company website".to_string(),
            status: ProjectStatus::Active,
            priority: Priority::High,
            start_date: Utc::now(),
            end_date: None,
            progress: 0,
            owner_id: Uuid::new_v4(),
            team_members: vec![],
        }
    }

    #[test]
    fn test_valid_new_project_accepted() {
        assert!(sample_new_project().validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut input = sample_new_project();
        input.name = "".to_string();
        assert_matches!(input.validate(), Err(CoreError::Validation(_)));

        input.name = "   ".to_string();
        assert_matches!(input.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn test_overlong_name_rejected() {
        let mut input = sample_new_project();
        input.name = "x".repeat(MAX_NAME_LENGTH + 1);
        assert_matches!(input.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn test_inverted_date_range_rejected() {
        let mut input = sample_new_project();
        input.end_date = Some(input.start_date - Duration::days(1));
        assert_matches!(input.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn test_end_date_equal_to_start_accepted() {
        let mut input = sample_new_project();
        input.end_date = Some(input.start_date);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_progress_over_hundred_rejected() {
        let mut input = sample_new_project();
        input.progress = 101;
        assert_matches!(input.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn test_patch_apply_touches_only_provided_fields() {
        let now = Utc::now();
        let mut project = Project {
            id: Uuid::new_v4(),
            name: "Before".to_string(),
            description: "Original description".to_string(),
            status: ProjectStatus::Active,
            priority: Priority::Medium,
            start_date: now,
            end_date: None,
            progress: 10,
            owner_id: Uuid::new_v4(),
            team_members: vec![],
            created_at: now,
            updated_at: now,
        };

        let patch = ProjectPatch {
            name: Some("After".to_string()),
            progress: Some(55),
            ..Default::default()
        };
        patch.apply(&mut project);

        assert_eq!(project.name, "After");
        assert_eq!(project.progress, 55);
        assert_eq!(project.description, "Original description");
        assert_eq!(project.status, ProjectStatus::Active);
    }

    #[test]
    fn test_patch_can_clear_end_date() {
        let now = Utc::now();
        let mut project = Project {
            id: Uuid::new_v4(),
            name: "P".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            priority: Priority::Low,
            start_date: now,
            end_date: Some(now),
            progress: 0,
            owner_id: Uuid::new_v4(),
            team_members: vec![],
            created_at: now,
            updated_at: now,
        };

        let patch = ProjectPatch {
            end_date: Some(None),
            ..Default::default()
        };
        patch.apply(&mut project);
        assert!(project.end_date.is_none());
    }

    #[test]
    fn test_dedup_members_keeps_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let deduped = dedup_members(&[a, b, a, a, b]);
        assert_eq!(deduped, vec![a, b]);
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&ProjectStatus::OnHold).unwrap();
        assert_eq!(json, "\"on-hold\"");
    }
}
