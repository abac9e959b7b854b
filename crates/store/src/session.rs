//! Session/identity boundary.
//!
//! The store consumes a [`Identity`] to learn the acting user when it
//! records activity. Credentials and authentication live entirely outside
//! the core; this trait is the whole surface.

use flowdeck_core::types::UserId;

/// Supplies the acting user id, when a session is present.
pub trait Identity: Send + Sync {
    fn current_user_id(&self) -> Option<UserId>;
}

/// Fixed identity, for the harness and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticIdentity {
    user_id: Option<UserId>,
}

impl StaticIdentity {
    /// No session; mutations are recorded without an actor.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in user.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

impl Identity for StaticIdentity {
    fn current_user_id(&self) -> Option<UserId> {
        self.user_id
    }
}
