mod support;

use minutes_core::db::open_db_in_memory;
use minutes_core::{
    AttendeeInvite, CoreConfig, LifecycleError, LifecycleManager, MeetingPatch, NewMeeting,
    ValidationError, Visibility,
};
use support::{fail_updates_on, manager, manual_manager, meeting, staff, user};
use uuid::Uuid;

#[test]
fn create_meeting_stamps_creator_and_defaults() {
    let mut manager = manual_manager(1_000);
    let owner = user();

    let created = manager
        .create_meeting(&owner, &NewMeeting::new("  Test Meeting  "))
        .unwrap();

    assert_eq!(created.title, "Test Meeting");
    assert_eq!(created.created_by, owner.id);
    assert_eq!(created.last_edited_by, None);
    assert_eq!(created.created_at, 1_000);
    assert_eq!(created.updated_at, 1_000);
    assert_eq!(created.date, 1_000);
    assert_eq!(created.visibility, Visibility::Team);
    assert_eq!(created.description, "");

    let detail = manager.get_meeting(&owner, created.id).unwrap();
    assert_eq!(detail.meeting, created);
    assert!(detail.notes.is_empty());
    assert!(detail.attendees.is_empty());
}

#[test]
fn create_meeting_rejects_invalid_input_without_writing() {
    let mut manager = manager();
    let owner = user();

    let err = manager
        .create_meeting(&owner, &NewMeeting::new("   "))
        .unwrap_err();
    assert_eq!(
        err,
        LifecycleError::Validation(ValidationError::EmptyField("title"))
    );
    assert_eq!(err.status_code(), 400);

    let err = manager
        .create_meeting(&owner, &NewMeeting::new("x".repeat(201)))
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Validation(ValidationError::TooLong { field: "title", .. })
    ));

    assert!(manager.list_meetings(&owner).unwrap().is_empty());
}

#[test]
fn creator_edit_sets_editor_and_strictly_advances_updated_at() {
    let mut manager = manual_manager(1_000);
    let owner = user();
    let created = meeting(&mut manager, &owner, Visibility::Team);

    let patch = MeetingPatch {
        title: Some("Renamed".to_string()),
        ..MeetingPatch::default()
    };
    let first = manager.update_meeting(&owner, created.id, &patch).unwrap();
    assert_eq!(first.title, "Renamed");
    assert_eq!(first.last_edited_by, Some(owner.id));
    assert_eq!(first.created_by, owner.id);
    assert!(first.updated_at > created.updated_at);

    // Same values again with a stalled clock: still an accepted, stamped write.
    let second = manager.update_meeting(&owner, created.id, &patch).unwrap();
    assert_eq!(second.title, "Renamed");
    assert!(second.updated_at > first.updated_at);

    manager.clock().set(50_000);
    let third = manager.update_meeting(&owner, created.id, &patch).unwrap();
    assert_eq!(third.updated_at, 50_000);

    let stored = manager.get_meeting(&owner, created.id).unwrap().meeting;
    assert_eq!(stored, third);
}

#[test]
fn update_applies_only_present_fields() {
    let mut manager = manager();
    let owner = user();
    let input = NewMeeting {
        description: Some("agenda".to_string()),
        location: Some("Room 4".to_string()),
        date: Some(42),
        ..NewMeeting::new("Planning")
    };
    let created = manager.create_meeting(&owner, &input).unwrap();

    let updated = manager
        .update_meeting(
            &owner,
            created.id,
            &MeetingPatch {
                visibility: Some(Visibility::Public),
                ..MeetingPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.visibility, Visibility::Public);
    assert_eq!(updated.title, "Planning");
    assert_eq!(updated.description, "agenda");
    assert_eq!(updated.location, "Room 4");
    assert_eq!(updated.date, 42);
}

#[test]
fn staff_edit_records_staff_as_editor() {
    let mut manager = manager();
    let owner = user();
    let admin = staff();
    let created = meeting(&mut manager, &owner, Visibility::Team);

    let updated = manager
        .update_meeting(
            &admin,
            created.id,
            &MeetingPatch {
                location: Some("HQ".to_string()),
                ..MeetingPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.created_by, owner.id);
    assert_eq!(updated.last_edited_by, Some(admin.id));
}

#[test]
fn non_overseer_edit_is_forbidden_and_leaves_meeting_unchanged() {
    let mut manager = manager();
    let owner = user();
    let guest = user();
    let created = meeting(&mut manager, &owner, Visibility::Public);
    manager
        .add_attendee(&owner, created.id, &AttendeeInvite::User(guest.id))
        .unwrap();

    let patch = MeetingPatch {
        title: Some("Hijacked".to_string()),
        ..MeetingPatch::default()
    };
    for actor in [guest, user()] {
        let err = manager.update_meeting(&actor, created.id, &patch).unwrap_err();
        assert!(matches!(err, LifecycleError::Forbidden(_)));
        assert_eq!(err.kind(), "FORBIDDEN");
    }

    let stored = manager.get_meeting(&owner, created.id).unwrap().meeting;
    assert_eq!(stored, created);
}

#[test]
fn empty_patch_touches_audit_fields_only() {
    let mut manager = manual_manager(1_000);
    let owner = user();
    let editor = staff();
    let created = meeting(&mut manager, &owner, Visibility::Team);

    manager.clock().set(9_000);
    let touched = manager
        .update_meeting(&editor, created.id, &MeetingPatch::default())
        .unwrap();
    assert_eq!(touched.title, created.title);
    assert_eq!(touched.visibility, created.visibility);
    assert_eq!(touched.created_by, owner.id);
    assert_eq!(touched.last_edited_by, Some(editor.id));
    assert_eq!(touched.updated_at, 9_000);

    let stored = manager.get_meeting(&owner, created.id).unwrap().meeting;
    assert_eq!(stored, touched);
}

#[test]
fn failed_update_leaves_meeting_and_audit_untouched() {
    let mut manager = manual_manager(1_000);
    let owner = user();
    let created = meeting(&mut manager, &owner, Visibility::Team);
    fail_updates_on(manager.connection(), "meetings");

    manager.clock().set(2_000);
    let patch = MeetingPatch {
        title: Some("Renamed".to_string()),
        ..MeetingPatch::default()
    };
    let err = manager.update_meeting(&owner, created.id, &patch).unwrap_err();
    assert!(matches!(err, LifecycleError::Persistence(_)));
    assert_eq!(err.status_code(), 500);

    let stored = manager.get_meeting(&owner, created.id).unwrap().meeting;
    assert_eq!(stored, created);
    assert_eq!(stored.last_edited_by, None);
    assert_eq!(stored.updated_at, 1_000);
}

#[test]
fn missing_meeting_is_not_found_not_forbidden() {
    let mut manager = manager();
    let actor = user();
    let missing = Uuid::new_v4();

    let err = manager.get_meeting(&actor, missing).unwrap_err();
    assert_eq!(
        err,
        LifecycleError::NotFound {
            entity: "meeting",
            id: missing
        }
    );
    assert_eq!(err.status_code(), 404);

    let err = manager.delete_meeting(&actor, missing).unwrap_err();
    assert_eq!(err.kind(), "NOT_FOUND");
}

#[test]
fn list_meetings_returns_viewable_meetings_newest_first() {
    let mut manager = manager();
    let owner = user();
    let viewer = user();

    let hidden = manager
        .create_meeting(
            &owner,
            &NewMeeting {
                date: Some(100),
                ..NewMeeting::new("Private planning")
            },
        )
        .unwrap();
    let public = manager
        .create_meeting(
            &owner,
            &NewMeeting {
                date: Some(300),
                visibility: Visibility::Public,
                ..NewMeeting::new("Town hall")
            },
        )
        .unwrap();
    let invited = manager
        .create_meeting(
            &owner,
            &NewMeeting {
                date: Some(200),
                ..NewMeeting::new("Design review")
            },
        )
        .unwrap();
    manager
        .add_attendee(&owner, invited.id, &AttendeeInvite::User(viewer.id))
        .unwrap();

    let ids: Vec<_> = manager
        .list_meetings(&viewer)
        .unwrap()
        .into_iter()
        .map(|meeting| meeting.id)
        .collect();
    assert_eq!(ids, vec![public.id, invited.id]);

    let all: Vec<_> = manager
        .list_meetings(&staff())
        .unwrap()
        .into_iter()
        .map(|meeting| meeting.id)
        .collect();
    assert_eq!(all, vec![public.id, invited.id, hidden.id]);
}

#[test]
fn dashboard_splits_created_and_attending() {
    let mut manager = manager();
    let alice = user();
    let bob = user();

    let own = meeting(&mut manager, &alice, Visibility::Team);
    let theirs = meeting(&mut manager, &bob, Visibility::Team);
    meeting(&mut manager, &bob, Visibility::Public);
    manager
        .add_attendee(&bob, theirs.id, &AttendeeInvite::User(alice.id))
        .unwrap();

    let dashboard = manager.dashboard(&alice).unwrap();
    assert_eq!(dashboard.created.len(), 1);
    assert_eq!(dashboard.created[0].id, own.id);
    assert_eq!(dashboard.attending.len(), 1);
    assert_eq!(dashboard.attending[0].id, theirs.id);
}

#[test]
fn legacy_private_visibility_deserializes_as_team() {
    let input: NewMeeting =
        serde_json::from_str(r#"{"title":"Old export","visibility":"private"}"#).unwrap();
    assert_eq!(input.visibility, Visibility::Team);

    let mut manager = manager();
    let owner = user();
    let created = manager.create_meeting(&owner, &input).unwrap();
    assert_eq!(created.visibility, Visibility::Team);
    assert!(matches!(
        manager.get_meeting(&user(), created.id),
        Err(LifecycleError::Forbidden(_))
    ));
}

#[test]
fn open_from_config_uses_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("minutes.sqlite3");
    let config = CoreConfig::from_json_str(&format!(
        r#"{{ "database": {{ "path": {}, "busy_timeout_ms": 200 }} }}"#,
        serde_json::to_string(&path).unwrap()
    ))
    .unwrap();
    let owner = user();

    let created = {
        let mut manager = LifecycleManager::open(&config).unwrap();
        meeting(&mut manager, &owner, Visibility::Team)
    };

    let mut reopened = LifecycleManager::open(&config).unwrap();
    let detail = reopened.get_meeting(&owner, created.id).unwrap();
    assert_eq!(detail.meeting, created);
}

#[test]
fn manager_rejects_unmigrated_connection() {
    let raw = rusqlite::Connection::open_in_memory().unwrap();
    let err = LifecycleManager::try_new(raw).err().unwrap();
    assert_eq!(err.kind(), "PERSISTENCE_ERROR");

    assert!(LifecycleManager::try_new(open_db_in_memory().unwrap()).is_ok());
}
