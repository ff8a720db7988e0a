//! Access policy evaluation.
//!
//! # Responsibility
//! - Decide allow/deny for (actor, meeting scope, request).
//! - Produce a typed denial that callers surface as `Forbidden`.
//!
//! # Invariants
//! - Evaluation is deterministic and side-effect free.
//! - `team` meetings are invisible to actors without a role on them.
//! - `public` grants `view`/`comment` only; never edit/delete/manage.
//! - A denial is always explicit; there is no silent no-op path.

use crate::model::actor::{Actor, ActorId};
use crate::model::meeting::{MeetingId, Visibility};
use crate::policy::capability::{Capability, MeetingScope, Roles};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// What the caller wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRequest {
    /// Meeting-level capability.
    Meeting(Capability),
    /// RSVP change on one attendee row, owned by `row_user` when user-backed.
    AttendeeStatus { row_user: Option<ActorId> },
    /// Edit/delete of a note written by `author`.
    ModifyNote { author: ActorId },
    /// Edit/delete of a comment written by `author`.
    ModifyComment { author: ActorId },
}

impl AccessRequest {
    /// Stable name used in logs and denial messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meeting(capability) => capability.as_str(),
            Self::AttendeeStatus { .. } => Capability::UpdateOwnStatus.as_str(),
            Self::ModifyNote { .. } => "modify_note",
            Self::ModifyComment { .. } => "modify_comment",
        }
    }
}

impl From<Capability> for AccessRequest {
    fn from(value: Capability) -> Self {
        Self::Meeting(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    fn from_bool(allowed: bool) -> Self {
        if allowed {
            Self::Allow
        } else {
            Self::Deny
        }
    }
}

/// Denial raised by [`require`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    pub actor: ActorId,
    pub meeting_id: MeetingId,
    pub request: &'static str,
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "actor {} may not `{}` on meeting {}",
            self.actor, self.request, self.meeting_id
        )
    }
}

impl Error for AccessDenied {}

/// Evaluates one request. The single policy entry point for the core.
pub fn evaluate(
    actor: &Actor,
    scope: &MeetingScope,
    request: impl Into<AccessRequest>,
) -> AccessDecision {
    let roles = Roles::derive(actor, scope);
    let public = scope.visibility == Visibility::Public;

    let allowed = match request.into() {
        AccessRequest::Meeting(Capability::View) | AccessRequest::Meeting(Capability::Comment) => {
            !roles.is_other() || public
        }
        AccessRequest::Meeting(Capability::Edit)
        | AccessRequest::Meeting(Capability::Delete)
        | AccessRequest::Meeting(Capability::ManageAttendees) => roles.overseer,
        // Meeting-level form: may this actor change *some* RSVP here at all.
        AccessRequest::Meeting(Capability::UpdateOwnStatus) => roles.overseer || roles.attendee,
        AccessRequest::AttendeeStatus { row_user } => {
            roles.overseer || row_user == Some(actor.id)
        }
        AccessRequest::ModifyNote { author } => roles.overseer || author == actor.id,
        // Author or meeting creator; staff do not qualify.
        AccessRequest::ModifyComment { author } => roles.creator || author == actor.id,
    };

    AccessDecision::from_bool(allowed)
}

/// Evaluates and converts a denial into an error.
pub fn require(
    actor: &Actor,
    scope: &MeetingScope,
    request: impl Into<AccessRequest>,
) -> Result<(), AccessDenied> {
    let request = request.into();
    if evaluate(actor, scope, request).is_allowed() {
        return Ok(());
    }
    Err(AccessDenied {
        actor: actor.id,
        meeting_id: scope.meeting_id,
        request: request.as_str(),
    })
}
