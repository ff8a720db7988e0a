//! Invitations and RSVP transitions.
//!
//! # Invariants
//! - Status updates run load, then policy, then the enumeration check. An
//!   unknown status from an unauthorized actor is reported as `Forbidden`.
//! - Rejected transitions leave the stored row untouched.

use super::{authorize, validated, LifecycleManager};
use crate::audit::{next_updated_at, Clock};
use crate::model::actor::Actor;
use crate::model::attendee::{
    Attendee, AttendeeId, AttendeeInvite, AttendeePatch, AttendeeStatus,
};
use crate::model::meeting::MeetingId;
use crate::policy::{AccessRequest, Capability};
use crate::repo::attendee_repo::{AttendeeRepository, SqliteAttendeeRepository};
use crate::service::error::{LifecycleError, LifecycleResult};
use log::debug;
use rusqlite::Connection;
use uuid::Uuid;

impl<C: Clock> LifecycleManager<C> {
    /// Invites a user or guest. Requires `manage_attendees`; new rows start `invited`.
    pub fn add_attendee(
        &mut self,
        actor: &Actor,
        meeting_id: MeetingId,
        invite: &AttendeeInvite,
    ) -> LifecycleResult<Attendee> {
        let invite = validated("attendee_add", actor, invite.normalized())?;

        self.write("attendee_add", actor, |tx, now| {
            authorize(tx, actor, meeting_id, Capability::ManageAttendees)?;
            let (user, name, email) = match invite {
                AttendeeInvite::User(user) => (Some(user), None, None),
                AttendeeInvite::Guest { name, email } => (None, Some(name), Some(email)),
            };
            let attendee = Attendee {
                id: Uuid::new_v4(),
                meeting_id,
                user,
                name,
                email,
                status: AttendeeStatus::Invited,
                created_at: now,
                updated_at: now,
                last_edited_by: None,
            };
            SqliteAttendeeRepository::try_new(tx)?.insert_attendee(&attendee)?;
            Ok(attendee)
        })
    }

    /// Moves an attendee to `status`.
    ///
    /// Allowed to the attendee on their own row and to meeting overseers.
    /// Re-applying the current status is accepted and refreshes the audit fields.
    pub fn update_attendee_status(
        &mut self,
        actor: &Actor,
        attendee_id: AttendeeId,
        status: &str,
    ) -> LifecycleResult<Attendee> {
        let target = AttendeeStatus::parse(status);

        self.write("attendee_status_update", actor, |tx, now| {
            let mut attendee = load_attendee(tx, attendee_id)?;
            authorize(
                tx,
                actor,
                attendee.meeting_id,
                AccessRequest::AttendeeStatus {
                    row_user: attendee.user,
                },
            )?;
            let target = target?;

            let updated_at = next_updated_at(attendee.updated_at, now);
            let transition = attendee.apply_status(target, actor.id, updated_at);
            SqliteAttendeeRepository::try_new(tx)?.update_attendee(&attendee)?;
            debug!(
                "event=attendee_status_update module=service status=applied attendee_id={} from={} to={} changed={}",
                attendee.id,
                transition.from.as_str(),
                transition.to.as_str(),
                transition.changes_status()
            );
            Ok(attendee)
        })
    }

    /// Edits guest contact fields. Requires `manage_attendees`.
    pub fn update_attendee(
        &mut self,
        actor: &Actor,
        attendee_id: AttendeeId,
        patch: &AttendeePatch,
    ) -> LifecycleResult<Attendee> {
        let patch = validated("attendee_update", actor, patch.normalized())?;

        self.write("attendee_update", actor, |tx, now| {
            let mut attendee = load_attendee(tx, attendee_id)?;
            authorize(tx, actor, attendee.meeting_id, Capability::ManageAttendees)?;
            if let Some(name) = patch.name {
                attendee.name = Some(name);
            }
            if let Some(email) = patch.email {
                attendee.email = Some(email);
            }
            attendee.last_edited_by = Some(actor.id);
            attendee.updated_at = next_updated_at(attendee.updated_at, now);
            SqliteAttendeeRepository::try_new(tx)?.update_attendee(&attendee)?;
            Ok(attendee)
        })
    }

    /// Uninvites an attendee. Requires `manage_attendees`.
    pub fn remove_attendee(&mut self, actor: &Actor, attendee_id: AttendeeId) -> LifecycleResult<()> {
        self.write("attendee_remove", actor, |tx, _| {
            let attendee = load_attendee(tx, attendee_id)?;
            authorize(tx, actor, attendee.meeting_id, Capability::ManageAttendees)?;
            SqliteAttendeeRepository::try_new(tx)?.delete_attendee(attendee.id)?;
            Ok(())
        })
    }
}

fn load_attendee(conn: &Connection, id: AttendeeId) -> LifecycleResult<Attendee> {
    SqliteAttendeeRepository::try_new(conn)?
        .get_attendee(id)?
        .ok_or(LifecycleError::not_found("attendee", id))
}
