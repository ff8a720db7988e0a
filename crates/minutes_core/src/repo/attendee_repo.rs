//! Attendee repository.
//!
//! # Invariants
//! - `(meeting_id, user_id)` and `(meeting_id, email)` are unique; a
//!   duplicate insert or update fails with `RepoError::Conflict` and leaves
//!   the existing row untouched.
//! - Only the four enumerated statuses are ever written or accepted on read.

use crate::model::actor::ActorId;
use crate::model::attendee::{Attendee, AttendeeId, AttendeeStatus};
use crate::model::meeting::MeetingId;
use crate::repo::{
    ensure_schema_ready, map_unique_violation, optional_uuid_column, uuid_column, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row};

const ATTENDEE_SELECT_SQL: &str = "SELECT
    id,
    meeting_id,
    user_id,
    name,
    email,
    status,
    created_at,
    updated_at,
    last_edited_by
FROM attendees";

pub trait AttendeeRepository {
    fn insert_attendee(&self, attendee: &Attendee) -> RepoResult<()>;
    fn get_attendee(&self, id: AttendeeId) -> RepoResult<Option<Attendee>>;
    /// Writes status, contact fields and audit columns.
    fn update_attendee(&self, attendee: &Attendee) -> RepoResult<()>;
    fn delete_attendee(&self, id: AttendeeId) -> RepoResult<()>;
    fn list_attendees(&self, meeting_id: MeetingId) -> RepoResult<Vec<Attendee>>;
    fn is_attendee(&self, meeting_id: MeetingId, user: ActorId) -> RepoResult<bool>;
}

pub struct SqliteAttendeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendeeRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AttendeeRepository for SqliteAttendeeRepository<'_> {
    fn insert_attendee(&self, attendee: &Attendee) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO attendees (
                    id,
                    meeting_id,
                    user_id,
                    name,
                    email,
                    status,
                    created_at,
                    updated_at,
                    last_edited_by
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    attendee.id.to_string(),
                    attendee.meeting_id.to_string(),
                    attendee.user.map(|id| id.to_string()),
                    attendee.name.as_deref(),
                    attendee.email.as_deref(),
                    attendee.status.as_str(),
                    attendee.created_at,
                    attendee.updated_at,
                    attendee.last_edited_by.map(|id| id.to_string()),
                ],
            )
            .map_err(|err| map_unique_violation(err, "attendee"))?;
        Ok(())
    }

    fn get_attendee(&self, id: AttendeeId) -> RepoResult<Option<Attendee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ATTENDEE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_attendee_row(row)?));
        }
        Ok(None)
    }

    fn update_attendee(&self, attendee: &Attendee) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE attendees
                 SET
                    name = ?2,
                    email = ?3,
                    status = ?4,
                    updated_at = ?5,
                    last_edited_by = ?6
                 WHERE id = ?1;",
                params![
                    attendee.id.to_string(),
                    attendee.name.as_deref(),
                    attendee.email.as_deref(),
                    attendee.status.as_str(),
                    attendee.updated_at,
                    attendee.last_edited_by.map(|id| id.to_string()),
                ],
            )
            .map_err(|err| map_unique_violation(err, "attendee"))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "attendee",
                id: attendee.id,
            });
        }
        Ok(())
    }

    fn delete_attendee(&self, id: AttendeeId) -> RepoResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM attendees WHERE id = ?1;", [id.to_string()])?;
        if removed == 0 {
            return Err(RepoError::NotFound {
                entity: "attendee",
                id,
            });
        }
        Ok(())
    }

    fn list_attendees(&self, meeting_id: MeetingId) -> RepoResult<Vec<Attendee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATTENDEE_SELECT_SQL} WHERE meeting_id = ?1 ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([meeting_id.to_string()])?;
        let mut attendees = Vec::new();
        while let Some(row) = rows.next()? {
            attendees.push(parse_attendee_row(row)?);
        }
        Ok(attendees)
    }

    fn is_attendee(&self, meeting_id: MeetingId, user: ActorId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM attendees WHERE meeting_id = ?1 AND user_id = ?2
            );",
            params![meeting_id.to_string(), user.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_attendee_row(row: &Row<'_>) -> RepoResult<Attendee> {
    let status_text: String = row.get("status")?;
    let status = AttendeeStatus::parse(&status_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in attendees.status"))
    })?;

    Ok(Attendee {
        id: uuid_column(row, "attendees", "id")?,
        meeting_id: uuid_column(row, "attendees", "meeting_id")?,
        user: optional_uuid_column(row, "attendees", "user_id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        last_edited_by: optional_uuid_column(row, "attendees", "last_edited_by")?,
    })
}
