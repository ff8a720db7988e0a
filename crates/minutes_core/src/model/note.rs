//! Meeting notes and their comment threads.

use crate::model::actor::ActorId;
use crate::model::meeting::MeetingId;
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NoteId = Uuid;
pub type CommentId = Uuid;

/// Markdown note attached to one meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub meeting_id: MeetingId,
    pub content: String,
    pub created_by: ActorId,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Comment on one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub note_id: NoteId,
    pub content: String,
    pub created_by: ActorId,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Note together with its comments, oldest comment first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteThread {
    pub note: Note,
    pub comments: Vec<Comment>,
}

/// Validates note/comment body text.
pub fn normalize_content(content: &str) -> Result<String, ValidationError> {
    require_text("content", content)
}
