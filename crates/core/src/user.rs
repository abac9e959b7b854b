//! User record and role, as supplied by the session boundary.
//!
//! The core never manages credentials; users exist here only so that
//! ownership, assignment, and activity attribution have a concrete type.

use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, UserId};

/// Access role of a user within the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    Manager,
    Member,
}

/// A user as seen by the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
