//! Action items and attachments owned by a meeting.
//!
//! # Invariants
//! - Action item titles are never blank.
//! - Attachments are immutable once added; replace by delete + add.

use crate::model::actor::ActorId;
use crate::model::meeting::MeetingId;
use crate::model::validation::{
    require_bounded_text, require_text, ValidationError, ATTACHMENT_NAME_MAX_CHARS,
    TITLE_MAX_CHARS,
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub type ActionItemId = Uuid;
pub type AttachmentId = Uuid;

/// Follow-up task recorded during a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: ActionItemId,
    pub meeting_id: MeetingId,
    pub title: String,
    pub description: String,
    pub assigned_to: Option<ActorId>,
    pub completed: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActionItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<ActorId>,
}

impl NewActionItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: require_bounded_text("title", &self.title, TITLE_MAX_CHARS)?,
            description: self.description.as_deref().map(|value| value.trim().to_string()),
            assigned_to: self.assigned_to,
        })
    }
}

/// Partial update of an action item.
///
/// `assigned_to: Some(None)` clears the assignee; in JSON that is an explicit
/// `null`, while an absent key leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItemPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_to: Option<Option<ActorId>>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl ActionItemPatch {
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: self
                .title
                .as_deref()
                .map(|value| require_bounded_text("title", value, TITLE_MAX_CHARS))
                .transpose()?,
            description: self.description.as_deref().map(|value| value.trim().to_string()),
            assigned_to: self.assigned_to,
            completed: self.completed,
        })
    }

    pub fn apply_to(&self, item: &mut ActionItem) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(assigned_to) = self.assigned_to {
            item.assigned_to = assigned_to;
        }
        if let Some(completed) = self.completed {
            item.completed = completed;
        }
    }
}

/// Marks a key that is present in the input, even when its value is `null`.
fn present_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// File reference attached to a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub meeting_id: MeetingId,
    pub name: String,
    pub file_url: String,
    pub uploaded_by: Option<ActorId>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttachment {
    pub name: String,
    pub file_url: String,
}

impl NewAttachment {
    pub fn new(name: impl Into<String>, file_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_url: file_url.into(),
        }
    }

    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require_bounded_text("name", &self.name, ATTACHMENT_NAME_MAX_CHARS)?,
            file_url: require_text("file_url", &self.file_url)?,
        })
    }
}
