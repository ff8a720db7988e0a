//! Meeting create/read/update/delete and listings.

use super::{authorize, validated, LifecycleManager};
use crate::audit::{AuditStamp, Clock};
use crate::model::actor::Actor;
use crate::model::attendee::Attendee;
use crate::model::item::{ActionItem, Attachment};
use crate::model::meeting::{Meeting, MeetingId, MeetingPatch, NewMeeting};
use crate::model::note::NoteThread;
use crate::policy::{evaluate, Capability, MeetingScope};
use crate::repo::attendee_repo::{AttendeeRepository, SqliteAttendeeRepository};
use crate::repo::item_repo::{ItemRepository, SqliteItemRepository};
use crate::repo::meeting_repo::{CascadeReport, MeetingRepository, SqliteMeetingRepository};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::service::error::LifecycleResult;
use serde::Serialize;
use uuid::Uuid;

/// Meeting with every dependent collection, as returned by `get_meeting`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeetingDetail {
    pub meeting: Meeting,
    pub notes: Vec<NoteThread>,
    pub attendees: Vec<Attendee>,
    pub action_items: Vec<ActionItem>,
    pub attachments: Vec<Attachment>,
}

/// Meetings split by the actor's relation to them, newest date first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub created: Vec<Meeting>,
    pub attending: Vec<Meeting>,
}

impl<C: Clock> LifecycleManager<C> {
    /// Creates a meeting owned by `actor`. Any authenticated actor may create.
    pub fn create_meeting(
        &mut self,
        actor: &Actor,
        input: &NewMeeting,
    ) -> LifecycleResult<Meeting> {
        let input = validated("meeting_create", actor, input.normalized())?;

        self.write("meeting_create", actor, |tx, now| {
            let stamp = AuditStamp::created(actor, now);
            let meeting = Meeting {
                id: Uuid::new_v4(),
                title: input.title,
                description: input.description.unwrap_or_default(),
                date: input.date.unwrap_or(now),
                location: input.location.unwrap_or_default(),
                visibility: input.visibility,
                created_by: stamp.created_by,
                last_edited_by: stamp.last_edited_by,
                created_at: stamp.created_at,
                updated_at: stamp.updated_at,
            };
            SqliteMeetingRepository::try_new(tx)?.insert_meeting(&meeting)?;
            Ok(meeting)
        })
    }

    /// Loads a meeting and all of its dependents. Requires `view`.
    pub fn get_meeting(
        &mut self,
        actor: &Actor,
        meeting_id: MeetingId,
    ) -> LifecycleResult<MeetingDetail> {
        self.read("meeting_get", actor, |tx| {
            let meeting = authorize(tx, actor, meeting_id, Capability::View)?;

            let note_repo = SqliteNoteRepository::try_new(tx)?;
            let mut notes = Vec::new();
            for note in note_repo.list_notes(meeting_id)? {
                let comments = note_repo.list_comments(note.id)?;
                notes.push(NoteThread { note, comments });
            }
            let items = SqliteItemRepository::try_new(tx)?;

            Ok(MeetingDetail {
                meeting,
                notes,
                attendees: SqliteAttendeeRepository::try_new(tx)?.list_attendees(meeting_id)?,
                action_items: items.list_action_items(meeting_id)?,
                attachments: items.list_attachments(meeting_id)?,
            })
        })
    }

    /// Applies the present fields of `patch`. Requires `edit`.
    ///
    /// Audit fields refresh on every accepted write, even when no value differs.
    pub fn update_meeting(
        &mut self,
        actor: &Actor,
        meeting_id: MeetingId,
        patch: &MeetingPatch,
    ) -> LifecycleResult<Meeting> {
        let patch = validated("meeting_update", actor, patch.normalized())?;

        self.write("meeting_update", actor, |tx, now| {
            let mut meeting = authorize(tx, actor, meeting_id, Capability::Edit)?;
            patch.apply_to(&mut meeting);
            meeting.set_audit(meeting.audit().touched(actor, now));
            SqliteMeetingRepository::try_new(tx)?.update_meeting(&meeting)?;
            Ok(meeting)
        })
    }

    /// Removes the meeting and every dependent row. Requires `delete`.
    pub fn delete_meeting(
        &mut self,
        actor: &Actor,
        meeting_id: MeetingId,
    ) -> LifecycleResult<CascadeReport> {
        self.write("meeting_delete", actor, |tx, _| {
            authorize(tx, actor, meeting_id, Capability::Delete)?;
            let report =
                SqliteMeetingRepository::try_new(tx)?.delete_meeting_cascade(meeting_id)?;
            Ok(report)
        })
    }

    /// Every meeting `actor` may view, newest date first.
    pub fn list_meetings(&mut self, actor: &Actor) -> LifecycleResult<Vec<Meeting>> {
        self.read("meeting_list", actor, |tx| {
            let repo = SqliteMeetingRepository::try_new(tx)?;
            let attended = repo.meetings_attended_by(actor.id)?;
            let visible: Vec<Meeting> = repo
                .list_meetings()?
                .into_iter()
                .filter(|meeting| {
                    let scope = MeetingScope::new(meeting, attended.contains(&meeting.id));
                    evaluate(actor, &scope, Capability::View).is_allowed()
                })
                .collect();
            Ok(visible)
        })
    }

    /// Meetings the actor created and meetings the actor is invited to.
    pub fn dashboard(&mut self, actor: &Actor) -> LifecycleResult<Dashboard> {
        self.read("meeting_dashboard", actor, |tx| {
            let repo = SqliteMeetingRepository::try_new(tx)?;
            let attended = repo.meetings_attended_by(actor.id)?;
            let mut dashboard = Dashboard::default();
            for meeting in repo.list_meetings()? {
                if attended.contains(&meeting.id) {
                    dashboard.attending.push(meeting.clone());
                }
                if meeting.created_by == actor.id {
                    dashboard.created.push(meeting);
                }
            }
            Ok(dashboard)
        })
    }
}
