//! Authenticated caller identity.
//!
//! The core never authenticates credentials; the auth collaborator hands
//! every operation a ready `Actor` value.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity reference supplied by the auth collaborator.
pub type ActorId = Uuid;

/// Authenticated party issuing one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    /// Privileged operator flag. Staff oversee every meeting.
    pub is_staff: bool,
}

impl Actor {
    /// Regular (non-staff) actor.
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            is_staff: false,
        }
    }

    /// Privileged actor with overseer rights on every meeting.
    pub fn staff(id: ActorId) -> Self {
        Self { id, is_staff: true }
    }
}
