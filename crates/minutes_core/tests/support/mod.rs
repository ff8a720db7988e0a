#![allow(dead_code)]

use minutes_core::db::open_db_in_memory;
use minutes_core::{
    Actor, AttendeeInvite, Clock, LifecycleManager, Meeting, NewMeeting, SystemClock, Visibility,
};
use rusqlite::Connection;
use std::cell::Cell;
use uuid::Uuid;

/// Clock that only moves when a test moves it.
pub struct ManualClock(Cell<i64>);

impl ManualClock {
    pub fn at(now_ms: i64) -> Self {
        Self(Cell::new(now_ms))
    }

    pub fn set(&self, now_ms: i64) {
        self.0.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.get()
    }
}

pub fn manager() -> LifecycleManager<SystemClock> {
    LifecycleManager::try_new(open_db_in_memory().unwrap()).unwrap()
}

pub fn manual_manager(now_ms: i64) -> LifecycleManager<ManualClock> {
    LifecycleManager::try_with_clock(open_db_in_memory().unwrap(), ManualClock::at(now_ms))
        .unwrap()
}

pub fn user() -> Actor {
    Actor::new(Uuid::new_v4())
}

pub fn staff() -> Actor {
    Actor::staff(Uuid::new_v4())
}

pub fn meeting<C: Clock>(
    manager: &mut LifecycleManager<C>,
    owner: &Actor,
    visibility: Visibility,
) -> Meeting {
    let input = NewMeeting {
        visibility,
        ..NewMeeting::new("Test Meeting")
    };
    manager.create_meeting(owner, &input).unwrap()
}

/// Team meeting owned by `owner` with `guest` invited by user reference.
pub fn meeting_with_attendee<C: Clock>(
    manager: &mut LifecycleManager<C>,
    owner: &Actor,
    guest: &Actor,
) -> (Meeting, minutes_core::Attendee) {
    let meeting = meeting(manager, owner, Visibility::Team);
    let attendee = manager
        .add_attendee(owner, meeting.id, &AttendeeInvite::User(guest.id))
        .unwrap();
    (meeting, attendee)
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

/// Makes every DELETE on `table` abort.
pub fn fail_deletes_on(conn: &Connection, table: &str) {
    conn.execute_batch(&format!(
        "CREATE TRIGGER fail_delete_{table}
         BEFORE DELETE ON {table}
         BEGIN
             SELECT RAISE(ABORT, 'injected delete failure');
         END;"
    ))
    .unwrap();
}

/// Makes every UPDATE on `table` abort.
pub fn fail_updates_on(conn: &Connection, table: &str) {
    conn.execute_batch(&format!(
        "CREATE TRIGGER fail_update_{table}
         BEFORE UPDATE ON {table}
         BEGIN
             SELECT RAISE(ABORT, 'injected update failure');
         END;"
    ))
    .unwrap();
}
