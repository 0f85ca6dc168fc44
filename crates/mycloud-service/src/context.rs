//! The acting user passed explicitly into every service call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is performing an operation.
///
/// Authentication happens outside the service layer; by the time an
/// `Actor` exists the user id is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user's ID.
    pub user_id: Uuid,
}

impl Actor {
    /// Creates an actor for a user.
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    /// Whether this actor is the given user.
    pub fn is(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

impl From<Uuid> for Actor {
    fn from(user_id: Uuid) -> Self {
        Self::new(user_id)
    }
}
