//! Lifecycle manager: the one entry point for every meeting operation.
//!
//! # Responsibility
//! - Validate input, authorize through the access policy, then persist.
//! - Stamp audit fields from the acting identity and the clock.
//! - Scope each call to exactly one SQLite transaction.
//!
//! # Invariants
//! - Validation failures are returned before a transaction opens.
//! - Authorization runs inside the transaction, against the rows it reads,
//!   and before any write.
//! - Any error drops the transaction uncommitted, which rolls it back; a
//!   failed call leaves no partial effect.
//! - Writes use `BEGIN IMMEDIATE`; read-only calls use a deferred transaction.

use crate::audit::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::db::{open_db_in_memory, open_db_with_options};
use crate::model::actor::Actor;
use crate::model::meeting::{Meeting, MeetingId};
use crate::model::validation::ValidationError;
use crate::policy::{require, AccessRequest, MeetingScope};
use crate::repo::attendee_repo::{AttendeeRepository, SqliteAttendeeRepository};
use crate::repo::meeting_repo::{MeetingRepository, SqliteMeetingRepository};
use crate::repo::ensure_schema_ready;
use crate::service::error::{LifecycleError, LifecycleResult};
use log::{error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Instant;

mod attendees;
mod items;
mod meetings;
mod notes;

pub use meetings::{Dashboard, MeetingDetail};

/// Owns the database connection and runs lifecycle operations against it.
pub struct LifecycleManager<C: Clock = SystemClock> {
    conn: Connection,
    clock: C,
}

impl LifecycleManager<SystemClock> {
    /// Wraps a migrated connection using the wall clock.
    pub fn try_new(conn: Connection) -> LifecycleResult<Self> {
        Self::try_with_clock(conn, SystemClock)
    }

    /// Opens the configured database (in-memory when no path is set).
    pub fn open(config: &CoreConfig) -> LifecycleResult<Self> {
        let conn = match &config.database.path {
            Some(path) => open_db_with_options(path, config.database.db_options()),
            None => open_db_in_memory(),
        }
        .map_err(|err| LifecycleError::Persistence(err.to_string()))?;
        Self::try_new(conn)
    }
}

impl<C: Clock> LifecycleManager<C> {
    /// Wraps a migrated connection with an explicit clock.
    pub fn try_with_clock(conn: Connection, clock: C) -> LifecycleResult<Self> {
        ensure_schema_ready(&conn)?;
        Ok(Self { conn, clock })
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Runs `op` in one write transaction and commits on success.
    fn write<T>(
        &mut self,
        event: &'static str,
        actor: &Actor,
        op: impl FnOnce(&Transaction<'_>, i64) -> LifecycleResult<T>,
    ) -> LifecycleResult<T> {
        self.run(event, TransactionBehavior::Immediate, actor, op)
    }

    /// Runs `op` in one deferred transaction.
    fn read<T>(
        &mut self,
        event: &'static str,
        actor: &Actor,
        op: impl FnOnce(&Transaction<'_>) -> LifecycleResult<T>,
    ) -> LifecycleResult<T> {
        self.run(event, TransactionBehavior::Deferred, actor, |tx, _| op(tx))
    }

    fn run<T>(
        &mut self,
        event: &'static str,
        behavior: TransactionBehavior,
        actor: &Actor,
        op: impl FnOnce(&Transaction<'_>, i64) -> LifecycleResult<T>,
    ) -> LifecycleResult<T> {
        let started_at = Instant::now();
        info!(
            "event={event} module=service status=start actor_id={}",
            actor.id
        );

        let now = self.clock.now_ms();
        let result = self
            .conn
            .transaction_with_behavior(behavior)
            .map_err(LifecycleError::from)
            .and_then(|tx| {
                let value = op(&tx, now)?;
                tx.commit()?;
                Ok(value)
            });

        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(_) => info!(
                "event={event} module=service status=ok actor_id={} duration_ms={duration_ms}",
                actor.id
            ),
            Err(LifecycleError::Persistence(message)) => error!(
                "event={event} module=service status=error actor_id={} duration_ms={duration_ms} error_kind=PERSISTENCE_ERROR error={message}",
                actor.id
            ),
            Err(err) => warn!(
                "event={event} module=service status=error actor_id={} duration_ms={duration_ms} error_kind={}",
                actor.id,
                err.kind()
            ),
        }
        result
    }
}

/// Converts an input check into a lifecycle result, logging the rejection.
fn validated<T>(
    event: &'static str,
    actor: &Actor,
    result: Result<T, ValidationError>,
) -> LifecycleResult<T> {
    result.map_err(|err| {
        let err = LifecycleError::from(err);
        warn!(
            "event={event} module=service status=rejected actor_id={} error_kind={}",
            actor.id,
            err.kind()
        );
        err
    })
}

fn load_meeting(conn: &Connection, id: MeetingId) -> LifecycleResult<Meeting> {
    SqliteMeetingRepository::try_new(conn)?
        .get_meeting(id)?
        .ok_or(LifecycleError::not_found("meeting", id))
}

fn meeting_scope(
    conn: &Connection,
    actor: &Actor,
    meeting: &Meeting,
) -> LifecycleResult<MeetingScope> {
    let attending = SqliteAttendeeRepository::try_new(conn)?.is_attendee(meeting.id, actor.id)?;
    Ok(MeetingScope::new(meeting, attending))
}

/// Loads the meeting and requires `request` for `actor` on it.
fn authorize(
    conn: &Connection,
    actor: &Actor,
    meeting_id: MeetingId,
    request: impl Into<AccessRequest>,
) -> LifecycleResult<Meeting> {
    let meeting = load_meeting(conn, meeting_id)?;
    let scope = meeting_scope(conn, actor, &meeting)?;
    require(actor, &scope, request)?;
    Ok(meeting)
}
