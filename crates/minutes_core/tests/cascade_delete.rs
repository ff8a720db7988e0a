mod support;

use minutes_core::{
    Actor, AttendeeInvite, CascadeReport, LifecycleError, LifecycleManager, Meeting, NewActionItem,
    NewAttachment, SystemClock, Visibility,
};
use support::{count_rows, fail_deletes_on, manager, meeting, staff, user};

const DEPENDENT_TABLES: [&str; 5] = [
    "notes",
    "comments",
    "attendees",
    "action_items",
    "attachments",
];

/// One note (with one comment), one attendee, one action item, one attachment.
fn populated_meeting(manager: &mut LifecycleManager<SystemClock>) -> (Meeting, Actor) {
    let owner = user();
    let guest = user();
    let meeting = meeting(manager, &owner, Visibility::Team);

    let note = manager
        .create_note(&owner, meeting.id, "Decisions recorded")
        .unwrap();
    manager
        .add_attendee(&owner, meeting.id, &AttendeeInvite::User(guest.id))
        .unwrap();
    manager
        .create_comment(&guest, note.id, "Looks right")
        .unwrap();
    manager
        .create_action_item(&owner, meeting.id, &NewActionItem::new("Send minutes"))
        .unwrap();
    manager
        .add_attachment(
            &owner,
            meeting.id,
            &NewAttachment::new("slides.pdf", "https://files.example.com/slides.pdf"),
        )
        .unwrap();

    (meeting, owner)
}

fn assert_all_rows_intact(manager: &LifecycleManager<SystemClock>) {
    let conn = manager.connection();
    assert_eq!(count_rows(conn, "meetings"), 1);
    for table in DEPENDENT_TABLES {
        assert_eq!(count_rows(conn, table), 1, "{table} lost a row");
    }
}

#[test]
fn owner_delete_removes_meeting_and_every_dependent() {
    let mut manager = manager();
    let (doomed, owner) = populated_meeting(&mut manager);

    let report = manager.delete_meeting(&owner, doomed.id).unwrap();
    assert_eq!(
        report,
        CascadeReport {
            comments: 1,
            notes: 1,
            attendees: 1,
            action_items: 1,
            attachments: 1,
        }
    );
    assert_eq!(report.dependents(), 5);

    let conn = manager.connection();
    assert_eq!(count_rows(conn, "meetings"), 0);
    for table in DEPENDENT_TABLES {
        assert_eq!(count_rows(conn, table), 0, "{table} kept a row");
    }
    assert!(matches!(
        manager.get_meeting(&owner, doomed.id),
        Err(LifecycleError::NotFound { entity: "meeting", .. })
    ));
}

#[test]
fn delete_leaves_other_meetings_untouched() {
    let mut manager = manager();
    let (doomed, owner) = populated_meeting(&mut manager);
    let (survivor, survivor_owner) = populated_meeting(&mut manager);

    manager.delete_meeting(&owner, doomed.id).unwrap();

    let detail = manager.get_meeting(&survivor_owner, survivor.id).unwrap();
    assert_eq!(detail.notes.len(), 1);
    assert_eq!(detail.notes[0].comments.len(), 1);
    assert_eq!(detail.attendees.len(), 1);
    assert_eq!(detail.action_items.len(), 1);
    assert_eq!(detail.attachments.len(), 1);
}

#[test]
fn failure_at_meeting_row_removal_restores_everything() {
    let mut manager = manager();
    let (doomed, owner) = populated_meeting(&mut manager);
    fail_deletes_on(manager.connection(), "meetings");

    let err = manager.delete_meeting(&owner, doomed.id).unwrap_err();
    assert!(matches!(err, LifecycleError::Persistence(_)));
    assert_eq!(err.status_code(), 500);

    assert_all_rows_intact(&manager);
}

#[test]
fn failure_mid_cascade_restores_everything() {
    for table in ["comments", "notes", "attendees", "action_items", "attachments"] {
        let mut manager = manager();
        let (doomed, owner) = populated_meeting(&mut manager);
        fail_deletes_on(manager.connection(), table);

        let err = manager.delete_meeting(&owner, doomed.id).unwrap_err();
        assert_eq!(err.kind(), "PERSISTENCE_ERROR", "failure on {table}");
        assert_all_rows_intact(&manager);
    }
}

#[test]
fn manager_stays_usable_after_rolled_back_delete() {
    let mut manager = manager();
    let (doomed, owner) = populated_meeting(&mut manager);
    fail_deletes_on(manager.connection(), "attachments");
    assert!(manager.delete_meeting(&owner, doomed.id).is_err());

    manager
        .connection()
        .execute_batch("DROP TRIGGER fail_delete_attachments;")
        .unwrap();
    manager.delete_meeting(&owner, doomed.id).unwrap();
    assert_eq!(count_rows(manager.connection(), "meetings"), 0);
}

#[test]
fn only_overseers_may_delete() {
    let mut manager = manager();
    let (doomed, _owner) = populated_meeting(&mut manager);
    let attendee_id = {
        let conn = manager.connection();
        let user_id: String = conn
            .query_row("SELECT user_id FROM attendees LIMIT 1;", [], |row| row.get(0))
            .unwrap();
        uuid::Uuid::parse_str(&user_id).unwrap()
    };

    let attendee = Actor::new(attendee_id);
    let err = manager.delete_meeting(&attendee, doomed.id).unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));
    let err = manager.delete_meeting(&user(), doomed.id).unwrap_err();
    assert!(matches!(err, LifecycleError::Forbidden(_)));
    assert_all_rows_intact(&manager);

    manager.delete_meeting(&staff(), doomed.id).unwrap();
    assert_eq!(count_rows(manager.connection(), "meetings"), 0);
}
