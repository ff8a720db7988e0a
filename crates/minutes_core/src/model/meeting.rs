//! Meeting aggregate root.
//!
//! # Responsibility
//! - Define the meeting record plus its create/patch inputs.
//! - Own visibility parsing, including the legacy `private` alias.
//!
//! # Invariants
//! - `title` is never blank and at most 200 chars.
//! - `last_edited_by`/`updated_at` only move on a committed, authorized write.

use crate::audit::AuditStamp;
use crate::model::actor::ActorId;
use crate::model::validation::{
    optional_bounded_text, require_bounded_text, ValidationError, LOCATION_MAX_CHARS,
    TITLE_MAX_CHARS,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MeetingId = Uuid;

/// Who may see a meeting beyond its participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Creator, attendees and overseers only.
    #[default]
    #[serde(alias = "private")]
    Team,
    /// Any authenticated actor may view and comment.
    Public,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Public => "public",
        }
    }

    /// Parses a transport value. `private` is a retired value folded into `team`.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim() {
            "team" | "private" => Ok(Self::Team),
            "public" => Ok(Self::Public),
            other => Err(ValidationError::InvalidEnumValue {
                field: "visibility",
                value: other.to_string(),
            }),
        }
    }
}

/// Persisted meeting record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub title: String,
    pub description: String,
    /// Scheduled start, epoch milliseconds.
    pub date: i64,
    pub location: String,
    pub visibility: Visibility,
    pub created_by: ActorId,
    pub last_edited_by: Option<ActorId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Meeting {
    pub fn audit(&self) -> AuditStamp {
        AuditStamp {
            created_by: self.created_by,
            created_at: self.created_at,
            last_edited_by: self.last_edited_by,
            updated_at: self.updated_at,
        }
    }

    pub fn set_audit(&mut self, stamp: AuditStamp) {
        self.created_by = stamp.created_by;
        self.created_at = stamp.created_at;
        self.last_edited_by = stamp.last_edited_by;
        self.updated_at = stamp.updated_at;
    }
}

/// Create request for a meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMeeting {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Epoch ms; defaults to creation time.
    #[serde(default)]
    pub date: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
}

impl NewMeeting {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Returns a trimmed copy, or the first offending field.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: require_bounded_text("title", &self.title, TITLE_MAX_CHARS)?,
            description: self.description.as_deref().map(|value| value.trim().to_string()),
            date: self.date,
            location: self
                .location
                .as_deref()
                .map(|value| optional_bounded_text("location", value, LOCATION_MAX_CHARS))
                .transpose()?,
            visibility: self.visibility,
        })
    }
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

impl MeetingPatch {
    /// Returns a trimmed copy. A patch with no fields is valid and only
    /// refreshes the audit fields when applied.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: self
                .title
                .as_deref()
                .map(|value| require_bounded_text("title", value, TITLE_MAX_CHARS))
                .transpose()?,
            description: self.description.as_deref().map(|value| value.trim().to_string()),
            date: self.date,
            location: self
                .location
                .as_deref()
                .map(|value| optional_bounded_text("location", value, LOCATION_MAX_CHARS))
                .transpose()?,
            visibility: self.visibility,
        })
    }

    /// Writes every present field onto `meeting`.
    pub fn apply_to(&self, meeting: &mut Meeting) {
        if let Some(title) = &self.title {
            meeting.title = title.clone();
        }
        if let Some(description) = &self.description {
            meeting.description = description.clone();
        }
        if let Some(date) = self.date {
            meeting.date = date;
        }
        if let Some(location) = &self.location {
            meeting.location = location.clone();
        }
        if let Some(visibility) = self.visibility {
            meeting.visibility = visibility;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MeetingPatch, NewMeeting, Visibility};
    use crate::model::validation::ValidationError;

    #[test]
    fn visibility_folds_private_into_team() {
        assert_eq!(Visibility::parse("private").unwrap(), Visibility::Team);
        assert_eq!(Visibility::parse(" public ").unwrap(), Visibility::Public);
        assert!(matches!(
            Visibility::parse("secret"),
            Err(ValidationError::InvalidEnumValue { field: "visibility", .. })
        ));
    }

    #[test]
    fn new_meeting_requires_title() {
        let err = NewMeeting::new("  ").normalized().unwrap_err();
        assert_eq!(err, ValidationError::EmptyField("title"));

        let mut input = NewMeeting::new(" Weekly sync ");
        input.location = Some(" Room A ".to_string());
        let normalized = input.normalized().unwrap();
        assert_eq!(normalized.title, "Weekly sync");
        assert_eq!(normalized.location.as_deref(), Some("Room A"));
    }

    #[test]
    fn empty_patch_is_valid_and_blank_title_is_invalid() {
        assert_eq!(
            MeetingPatch::default().normalized().unwrap(),
            MeetingPatch::default()
        );

        let patch = MeetingPatch {
            title: Some(String::new()),
            ..MeetingPatch::default()
        };
        assert_eq!(
            patch.normalized().unwrap_err(),
            ValidationError::EmptyField("title")
        );
    }

    #[test]
    fn new_meeting_deserializes_with_defaults() {
        let input: NewMeeting = serde_json::from_str(r#"{"title":"Retro"}"#).unwrap();
        assert_eq!(input.visibility, Visibility::Team);
        assert!(input.date.is_none());
    }
}
