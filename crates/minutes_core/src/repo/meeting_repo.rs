//! Meeting repository and the cascading delete routine.
//!
//! # Responsibility
//! - Persist and load meeting rows.
//! - Remove a meeting together with every dependent row.
//!
//! # Invariants
//! - Cascade order: comments, then notes, then attendees, action items and
//!   attachments, then the meeting row.
//! - The cascade is all-or-nothing. It runs under its own savepoint, so a
//!   failure at any step restores every row, whether or not the caller
//!   holds an outer transaction.

use crate::model::actor::ActorId;
use crate::model::meeting::{Meeting, MeetingId, Visibility};
use crate::repo::{
    ensure_schema_ready, optional_uuid_column, uuid_column, RepoError, RepoResult,
};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;

const MEETING_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    date,
    location,
    visibility,
    created_by,
    last_edited_by,
    created_at,
    updated_at
FROM meetings";

const CASCADE_SAVEPOINT: &str = "meeting_cascade";

/// Row counts removed by one cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub comments: usize,
    pub notes: usize,
    pub attendees: usize,
    pub action_items: usize,
    pub attachments: usize,
}

impl CascadeReport {
    pub fn dependents(&self) -> usize {
        self.comments + self.notes + self.attendees + self.action_items + self.attachments
    }
}

/// Repository interface for meeting rows.
pub trait MeetingRepository {
    fn insert_meeting(&self, meeting: &Meeting) -> RepoResult<()>;
    fn get_meeting(&self, id: MeetingId) -> RepoResult<Option<Meeting>>;
    /// Overwrites mutable fields and audit columns of an existing row.
    fn update_meeting(&self, meeting: &Meeting) -> RepoResult<()>;
    /// Deletes the meeting and all dependents atomically.
    fn delete_meeting_cascade(&self, id: MeetingId) -> RepoResult<CascadeReport>;
    /// All meetings, newest `date` first.
    fn list_meetings(&self) -> RepoResult<Vec<Meeting>>;
    /// Ids of meetings where `user` holds an attendee row.
    fn meetings_attended_by(&self, user: ActorId) -> RepoResult<HashSet<MeetingId>>;
}

/// SQLite-backed meeting repository.
pub struct SqliteMeetingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMeetingRepository<'conn> {
    /// Constructs a repository from a migrated connection or open transaction.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MeetingRepository for SqliteMeetingRepository<'_> {
    fn insert_meeting(&self, meeting: &Meeting) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO meetings (
                id,
                title,
                description,
                date,
                location,
                visibility,
                created_by,
                last_edited_by,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                meeting.id.to_string(),
                meeting.title.as_str(),
                meeting.description.as_str(),
                meeting.date,
                meeting.location.as_str(),
                meeting.visibility.as_str(),
                meeting.created_by.to_string(),
                meeting.last_edited_by.map(|id| id.to_string()),
                meeting.created_at,
                meeting.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_meeting(&self, id: MeetingId) -> RepoResult<Option<Meeting>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEETING_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_meeting_row(row)?));
        }
        Ok(None)
    }

    fn update_meeting(&self, meeting: &Meeting) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE meetings
             SET
                title = ?2,
                description = ?3,
                date = ?4,
                location = ?5,
                visibility = ?6,
                last_edited_by = ?7,
                updated_at = ?8
             WHERE id = ?1;",
            params![
                meeting.id.to_string(),
                meeting.title.as_str(),
                meeting.description.as_str(),
                meeting.date,
                meeting.location.as_str(),
                meeting.visibility.as_str(),
                meeting.last_edited_by.map(|id| id.to_string()),
                meeting.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "meeting",
                id: meeting.id,
            });
        }
        Ok(())
    }

    fn delete_meeting_cascade(&self, id: MeetingId) -> RepoResult<CascadeReport> {
        self.conn
            .execute_batch(&format!("SAVEPOINT {CASCADE_SAVEPOINT};"))?;

        match cascade_steps(self.conn, id) {
            Ok(report) => {
                self.conn
                    .execute_batch(&format!("RELEASE {CASCADE_SAVEPOINT};"))?;
                Ok(report)
            }
            Err(err) => {
                let undo = format!(
                    "ROLLBACK TO {CASCADE_SAVEPOINT}; RELEASE {CASCADE_SAVEPOINT};"
                );
                if let Err(rollback_err) = self.conn.execute_batch(&undo) {
                    warn!(
                        "event=meeting_cascade module=repo status=rollback_failed meeting_id={id} error={rollback_err}"
                    );
                }
                Err(err)
            }
        }
    }

    fn list_meetings(&self) -> RepoResult<Vec<Meeting>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEETING_SELECT_SQL} ORDER BY date DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut meetings = Vec::new();
        while let Some(row) = rows.next()? {
            meetings.push(parse_meeting_row(row)?);
        }
        Ok(meetings)
    }

    fn meetings_attended_by(&self, user: ActorId) -> RepoResult<HashSet<MeetingId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT meeting_id FROM attendees WHERE user_id = ?1;")?;
        let mut rows = stmt.query([user.to_string()])?;
        let mut ids = HashSet::new();
        while let Some(row) = rows.next()? {
            ids.insert(uuid_column(row, "attendees", "meeting_id")?);
        }
        Ok(ids)
    }
}

fn cascade_steps(conn: &Connection, id: MeetingId) -> RepoResult<CascadeReport> {
    let meeting_id = id.to_string();
    let exists = conn
        .query_row("SELECT 1 FROM meetings WHERE id = ?1;", [&meeting_id], |_| {
            Ok(())
        })
        .optional()?;
    if exists.is_none() {
        return Err(RepoError::NotFound {
            entity: "meeting",
            id,
        });
    }

    // Comments hang off notes, so they must go before their parent rows.
    let comments = conn.execute(
        "DELETE FROM comments
         WHERE note_id IN (SELECT id FROM notes WHERE meeting_id = ?1);",
        [&meeting_id],
    )?;
    let notes = conn.execute("DELETE FROM notes WHERE meeting_id = ?1;", [&meeting_id])?;
    let attendees = conn.execute(
        "DELETE FROM attendees WHERE meeting_id = ?1;",
        [&meeting_id],
    )?;
    let action_items = conn.execute(
        "DELETE FROM action_items WHERE meeting_id = ?1;",
        [&meeting_id],
    )?;
    let attachments = conn.execute(
        "DELETE FROM attachments WHERE meeting_id = ?1;",
        [&meeting_id],
    )?;

    let removed = conn.execute("DELETE FROM meetings WHERE id = ?1;", [&meeting_id])?;
    if removed != 1 {
        return Err(RepoError::InvalidData(format!(
            "meeting {id} removal affected {removed} rows"
        )));
    }

    Ok(CascadeReport {
        comments,
        notes,
        attendees,
        action_items,
        attachments,
    })
}

fn parse_meeting_row(row: &Row<'_>) -> RepoResult<Meeting> {
    let visibility_text: String = row.get("visibility")?;
    let visibility = Visibility::parse(&visibility_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid visibility `{visibility_text}` in meetings.visibility"
        ))
    })?;

    Ok(Meeting {
        id: uuid_column(row, "meetings", "id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        date: row.get("date")?,
        location: row.get("location")?,
        visibility,
        created_by: uuid_column(row, "meetings", "created_by")?,
        last_edited_by: optional_uuid_column(row, "meetings", "last_edited_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
