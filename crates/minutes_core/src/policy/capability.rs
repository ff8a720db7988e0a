//! Capability and role vocabulary for meeting access checks.

use crate::model::actor::{Actor, ActorId};
use crate::model::meeting::{Meeting, MeetingId, Visibility};
use std::fmt::{Display, Formatter};

/// Named permission evaluated per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    View,
    Edit,
    Delete,
    ManageAttendees,
    Comment,
    UpdateOwnStatus,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Self::View,
        Self::Edit,
        Self::Delete,
        Self::ManageAttendees,
        Self::Comment,
        Self::UpdateOwnStatus,
    ];

    /// Stable string id used in logs and error payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::ManageAttendees => "manage_attendees",
            Self::Comment => "comment",
            Self::UpdateOwnStatus => "update_own_status",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facts about one meeting needed to evaluate access for one actor.
///
/// Built per request from stored rows; never cached between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingScope {
    pub meeting_id: MeetingId,
    pub created_by: ActorId,
    pub visibility: Visibility,
    /// Whether the evaluated actor has an attendee row on this meeting.
    pub actor_is_attendee: bool,
}

impl MeetingScope {
    pub fn new(meeting: &Meeting, actor_is_attendee: bool) -> Self {
        Self {
            meeting_id: meeting.id,
            created_by: meeting.created_by,
            visibility: meeting.visibility,
            actor_is_attendee,
        }
    }
}

/// Roles an actor holds on one meeting. Derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Roles {
    pub creator: bool,
    pub attendee: bool,
    /// Creator or staff.
    pub overseer: bool,
}

impl Roles {
    pub fn derive(actor: &Actor, scope: &MeetingScope) -> Self {
        let creator = actor.id == scope.created_by;
        Self {
            creator,
            attendee: scope.actor_is_attendee,
            overseer: creator || actor.is_staff,
        }
    }

    /// Holds none of creator/attendee/overseer.
    pub fn is_other(&self) -> bool {
        !(self.creator || self.attendee || self.overseer)
    }
}
