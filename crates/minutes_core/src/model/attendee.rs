//! Attendee records and the RSVP state machine.
//!
//! # Responsibility
//! - Define attendee rows (user-backed or guest) and invite inputs.
//! - Own the fixed RSVP enumeration and its transition rules.
//!
//! # Invariants
//! - New rows always start in `invited`.
//! - Status is always one of the four enumerated values.
//! - Every state may move to every state, itself included; none is terminal.
//! - At most one row per `(meeting_id, user)` and per `(meeting_id, email)`.

use crate::model::actor::ActorId;
use crate::model::meeting::MeetingId;
use crate::model::validation::{
    normalize_email, require_bounded_text, ValidationError, NAME_MAX_CHARS,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AttendeeId = Uuid;

/// RSVP state of one attendee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendeeStatus {
    #[default]
    Invited,
    Accepted,
    Declined,
    Tentative,
}

impl AttendeeStatus {
    pub const ALL: [AttendeeStatus; 4] = [
        Self::Invited,
        Self::Accepted,
        Self::Declined,
        Self::Tentative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invited => "invited",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Tentative => "tentative",
        }
    }

    /// Parses a transport value; anything outside the enumeration is a validation error.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim() {
            "invited" => Ok(Self::Invited),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "tentative" => Ok(Self::Tentative),
            other => Err(ValidationError::InvalidEnumValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }

    /// Computes the transition to `target`.
    ///
    /// The workflow is permissive: there is no forward-only ordering, and
    /// re-entering the current state is an accepted no-op transition.
    pub fn transition(self, target: AttendeeStatus) -> StatusTransition {
        StatusTransition {
            from: self,
            to: target,
        }
    }
}

/// One applied RSVP move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub from: AttendeeStatus,
    pub to: AttendeeStatus,
}

impl StatusTransition {
    /// `false` for idempotent re-application of the current status.
    pub fn changes_status(&self) -> bool {
        self.from != self.to
    }
}

/// Persisted attendee row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: AttendeeId,
    pub meeting_id: MeetingId,
    /// Registered user, when invited by reference.
    pub user: Option<ActorId>,
    /// Guest display name, when invited by name/email.
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: AttendeeStatus,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_edited_by: Option<ActorId>,
}

impl Attendee {
    /// Moves this row to `target` and stamps the editor.
    pub fn apply_status(
        &mut self,
        target: AttendeeStatus,
        editor: ActorId,
        updated_at: i64,
    ) -> StatusTransition {
        let transition = self.status.transition(target);
        self.status = transition.to;
        self.last_edited_by = Some(editor);
        self.updated_at = updated_at;
        transition
    }
}

/// Who is being invited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendeeInvite {
    /// Registered user reference.
    User(ActorId),
    /// External guest identified by email.
    Guest { name: String, email: String },
}

impl AttendeeInvite {
    pub fn guest(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::Guest {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Returns a normalized copy (trimmed name, lowercased email).
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        match self {
            Self::User(user) => Ok(Self::User(*user)),
            Self::Guest { name, email } => Ok(Self::Guest {
                name: require_bounded_text("name", name, NAME_MAX_CHARS)?,
                email: normalize_email(email)?,
            }),
        }
    }
}

/// Partial update of guest contact fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl AttendeePatch {
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self
                .name
                .as_deref()
                .map(|value| require_bounded_text("name", value, NAME_MAX_CHARS))
                .transpose()?,
            email: self.email.as_deref().map(normalize_email).transpose()?,
        })
    }
}
