//! Note and comment repository.
//!
//! # Invariants
//! - Notes list oldest-first; comments list oldest-first within a note.
//! - Deleting a note removes its comments first, in the same savepoint.

use crate::model::meeting::MeetingId;
use crate::model::note::{Comment, CommentId, Note, NoteId};
use crate::repo::{ensure_schema_ready, uuid_column, RepoError, RepoResult};
use log::warn;
use rusqlite::{params, Connection, Row};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    meeting_id,
    content,
    created_by,
    created_at,
    updated_at
FROM notes";

const COMMENT_SELECT_SQL: &str = "SELECT
    id,
    note_id,
    content,
    created_by,
    created_at,
    updated_at
FROM comments";

/// Repository interface for notes and their comments.
pub trait NoteRepository {
    fn insert_note(&self, note: &Note) -> RepoResult<()>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    fn update_note(&self, note: &Note) -> RepoResult<()>;
    /// Deletes the note and its comments; returns the number of comments removed.
    fn delete_note(&self, id: NoteId) -> RepoResult<usize>;
    fn list_notes(&self, meeting_id: MeetingId) -> RepoResult<Vec<Note>>;

    fn insert_comment(&self, comment: &Comment) -> RepoResult<()>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    fn update_comment(&self, comment: &Comment) -> RepoResult<()>;
    fn delete_comment(&self, id: CommentId) -> RepoResult<()>;
    fn list_comments(&self, note_id: NoteId) -> RepoResult<Vec<Comment>>;
}

/// SQLite-backed note/comment repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, note: &Note) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO notes (id, meeting_id, content, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                note.id.to_string(),
                note.meeting_id.to_string(),
                note.content.as_str(),
                note.created_by.to_string(),
                note.created_at,
                note.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes SET content = ?2, updated_at = ?3 WHERE id = ?1;",
            params![note.id.to_string(), note.content.as_str(), note.updated_at],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "note",
                id: note.id,
            });
        }
        Ok(())
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<usize> {
        self.conn.execute_batch("SAVEPOINT note_delete;")?;
        let result = delete_note_rows(self.conn, id);

        match result {
            Ok(comments) => {
                self.conn.execute_batch("RELEASE note_delete;")?;
                Ok(comments)
            }
            Err(err) => {
                if let Err(rollback_err) = self
                    .conn
                    .execute_batch("ROLLBACK TO note_delete; RELEASE note_delete;")
                {
                    warn!(
                        "event=note_delete module=repo status=rollback_failed note_id={id} error={rollback_err}"
                    );
                }
                Err(err)
            }
        }
    }

    fn list_notes(&self, meeting_id: MeetingId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} WHERE meeting_id = ?1 ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([meeting_id.to_string()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn insert_comment(&self, comment: &Comment) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO comments (id, note_id, content, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                comment.id.to_string(),
                comment.note_id.to_string(),
                comment.content.as_str(),
                comment.created_by.to_string(),
                comment.created_at,
                comment.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_comment_row(row)?));
        }
        Ok(None)
    }

    fn update_comment(&self, comment: &Comment) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE comments SET content = ?2, updated_at = ?3 WHERE id = ?1;",
            params![
                comment.id.to_string(),
                comment.content.as_str(),
                comment.updated_at
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "comment",
                id: comment.id,
            });
        }
        Ok(())
    }

    fn delete_comment(&self, id: CommentId) -> RepoResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1;", [id.to_string()])?;
        if removed == 0 {
            return Err(RepoError::NotFound {
                entity: "comment",
                id,
            });
        }
        Ok(())
    }

    fn list_comments(&self, note_id: NoteId) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_SELECT_SQL} WHERE note_id = ?1 ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([note_id.to_string()])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }
}

fn delete_note_rows(conn: &Connection, id: NoteId) -> RepoResult<usize> {
    let comments = conn.execute("DELETE FROM comments WHERE note_id = ?1;", [id.to_string()])?;
    let removed = conn.execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;
    if removed == 0 {
        return Err(RepoError::NotFound { entity: "note", id });
    }
    Ok(comments)
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    Ok(Note {
        id: uuid_column(row, "notes", "id")?,
        meeting_id: uuid_column(row, "notes", "meeting_id")?,
        content: row.get("content")?,
        created_by: uuid_column(row, "notes", "created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    Ok(Comment {
        id: uuid_column(row, "comments", "id")?,
        note_id: uuid_column(row, "comments", "note_id")?,
        content: row.get("content")?,
        created_by: uuid_column(row, "comments", "created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
