//! Notes and their comment threads.
//!
//! # Invariants
//! - Posting a note or comment requires `comment` on the parent meeting.
//! - A note may be changed by its author or a meeting overseer.
//! - A comment may be changed by its author or the meeting creator only.

use super::{authorize, validated, LifecycleManager};
use crate::audit::{next_updated_at, Clock};
use crate::model::actor::Actor;
use crate::model::meeting::MeetingId;
use crate::model::note::{normalize_content, Comment, CommentId, Note, NoteId};
use crate::policy::{AccessRequest, Capability};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::service::error::{LifecycleError, LifecycleResult};
use rusqlite::Connection;
use uuid::Uuid;

impl<C: Clock> LifecycleManager<C> {
    pub fn create_note(
        &mut self,
        actor: &Actor,
        meeting_id: MeetingId,
        content: &str,
    ) -> LifecycleResult<Note> {
        let content = validated("note_create", actor, normalize_content(content))?;

        self.write("note_create", actor, |tx, now| {
            authorize(tx, actor, meeting_id, Capability::Comment)?;
            let note = Note {
                id: Uuid::new_v4(),
                meeting_id,
                content,
                created_by: actor.id,
                created_at: now,
                updated_at: now,
            };
            SqliteNoteRepository::try_new(tx)?.insert_note(&note)?;
            Ok(note)
        })
    }

    /// Replaces note content. Author or overseer only.
    pub fn update_note(
        &mut self,
        actor: &Actor,
        note_id: NoteId,
        content: &str,
    ) -> LifecycleResult<Note> {
        let content = validated("note_update", actor, normalize_content(content))?;

        self.write("note_update", actor, |tx, now| {
            let mut note = load_note(tx, note_id)?;
            authorize(
                tx,
                actor,
                note.meeting_id,
                AccessRequest::ModifyNote {
                    author: note.created_by,
                },
            )?;
            note.content = content;
            note.updated_at = next_updated_at(note.updated_at, now);
            SqliteNoteRepository::try_new(tx)?.update_note(&note)?;
            Ok(note)
        })
    }

    /// Deletes a note and its comments; returns how many comments went with it.
    pub fn delete_note(&mut self, actor: &Actor, note_id: NoteId) -> LifecycleResult<usize> {
        self.write("note_delete", actor, |tx, _| {
            let note = load_note(tx, note_id)?;
            authorize(
                tx,
                actor,
                note.meeting_id,
                AccessRequest::ModifyNote {
                    author: note.created_by,
                },
            )?;
            Ok(SqliteNoteRepository::try_new(tx)?.delete_note(note.id)?)
        })
    }

    pub fn create_comment(
        &mut self,
        actor: &Actor,
        note_id: NoteId,
        content: &str,
    ) -> LifecycleResult<Comment> {
        let content = validated("comment_create", actor, normalize_content(content))?;

        self.write("comment_create", actor, |tx, now| {
            let note = load_note(tx, note_id)?;
            authorize(tx, actor, note.meeting_id, Capability::Comment)?;
            let comment = Comment {
                id: Uuid::new_v4(),
                note_id: note.id,
                content,
                created_by: actor.id,
                created_at: now,
                updated_at: now,
            };
            SqliteNoteRepository::try_new(tx)?.insert_comment(&comment)?;
            Ok(comment)
        })
    }

    /// Replaces comment content. Author or meeting creator only.
    pub fn update_comment(
        &mut self,
        actor: &Actor,
        comment_id: CommentId,
        content: &str,
    ) -> LifecycleResult<Comment> {
        let content = validated("comment_update", actor, normalize_content(content))?;

        self.write("comment_update", actor, |tx, now| {
            let (mut comment, meeting_id) = load_comment(tx, comment_id)?;
            authorize(
                tx,
                actor,
                meeting_id,
                AccessRequest::ModifyComment {
                    author: comment.created_by,
                },
            )?;
            comment.content = content;
            comment.updated_at = next_updated_at(comment.updated_at, now);
            SqliteNoteRepository::try_new(tx)?.update_comment(&comment)?;
            Ok(comment)
        })
    }

    pub fn delete_comment(&mut self, actor: &Actor, comment_id: CommentId) -> LifecycleResult<()> {
        self.write("comment_delete", actor, |tx, _| {
            let (comment, meeting_id) = load_comment(tx, comment_id)?;
            authorize(
                tx,
                actor,
                meeting_id,
                AccessRequest::ModifyComment {
                    author: comment.created_by,
                },
            )?;
            SqliteNoteRepository::try_new(tx)?.delete_comment(comment.id)?;
            Ok(())
        })
    }
}

fn load_note(conn: &Connection, id: NoteId) -> LifecycleResult<Note> {
    SqliteNoteRepository::try_new(conn)?
        .get_note(id)?
        .ok_or(LifecycleError::not_found("note", id))
}

/// Loads a comment plus the meeting its note belongs to.
fn load_comment(conn: &Connection, id: CommentId) -> LifecycleResult<(Comment, MeetingId)> {
    let repo = SqliteNoteRepository::try_new(conn)?;
    let comment = repo
        .get_comment(id)?
        .ok_or(LifecycleError::not_found("comment", id))?;
    let note = repo
        .get_note(comment.note_id)?
        .ok_or(LifecycleError::Persistence(format!(
            "comment {id} references missing note {}",
            comment.note_id
        )))?;
    Ok((comment, note.meeting_id))
}
