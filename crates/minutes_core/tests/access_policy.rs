mod support;

use minutes_core::policy::{evaluate, AccessRequest, Capability, MeetingScope};
use minutes_core::{
    Actor, AttendeeInvite, LifecycleError, LifecycleManager, MeetingPatch, Visibility,
};
use support::{manager, meeting, staff, user};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Creator,
    Attendee,
    Staff,
    Other,
}

const RELATIONS: [Relation; 4] = [
    Relation::Creator,
    Relation::Attendee,
    Relation::Staff,
    Relation::Other,
];

#[test]
fn view_is_granted_iff_related_or_public() {
    for visibility in [Visibility::Team, Visibility::Public] {
        for relation in RELATIONS {
            let mut manager = manager();
            let owner = user();
            let meeting = meeting(&mut manager, &owner, visibility);
            let actor = actor_for(&mut manager, relation, &owner, meeting.id);

            let result = manager.get_meeting(&actor, meeting.id);
            let expected = relation != Relation::Other || visibility == Visibility::Public;
            assert_eq!(
                result.is_ok(),
                expected,
                "{relation:?} on {visibility:?} meeting"
            );
            if !expected {
                assert!(matches!(result, Err(LifecycleError::Forbidden(_))));
            }
        }
    }
}

#[test]
fn edit_delete_manage_are_overseer_only() {
    for visibility in [Visibility::Team, Visibility::Public] {
        for relation in RELATIONS {
            let mut manager = manager();
            let owner = user();
            let meeting = meeting(&mut manager, &owner, visibility);
            let actor = actor_for(&mut manager, relation, &owner, meeting.id);
            let overseer = matches!(relation, Relation::Creator | Relation::Staff);

            let edit = manager.update_meeting(
                &actor,
                meeting.id,
                &MeetingPatch {
                    description: Some("updated".to_string()),
                    ..MeetingPatch::default()
                },
            );
            assert_eq!(edit.is_ok(), overseer, "edit by {relation:?}");

            let invite =
                manager.add_attendee(&actor, meeting.id, &AttendeeInvite::User(user().id));
            assert_eq!(invite.is_ok(), overseer, "invite by {relation:?}");

            let delete = manager.delete_meeting(&actor, meeting.id);
            assert_eq!(delete.is_ok(), overseer, "delete by {relation:?}");
            if !overseer {
                assert!(matches!(delete, Err(LifecycleError::Forbidden(_))));
            }
        }
    }
}

#[test]
fn evaluate_is_pure_and_deterministic() {
    let owner = user();
    let stranger = user();
    let mut manager = manager();
    let meeting = meeting(&mut manager, &owner, Visibility::Public);
    let scope = MeetingScope::new(&meeting, false);

    for capability in Capability::ALL {
        let first = evaluate(&stranger, &scope, capability);
        let second = evaluate(&stranger, &scope, capability);
        assert_eq!(first, second, "{capability}");
    }
    assert!(evaluate(&stranger, &scope, Capability::Comment).is_allowed());
    assert!(!evaluate(&stranger, &scope, Capability::Edit).is_allowed());
    assert!(!evaluate(
        &stranger,
        &scope,
        AccessRequest::AttendeeStatus {
            row_user: Some(owner.id)
        }
    )
    .is_allowed());
    assert!(evaluate(
        &stranger,
        &scope,
        AccessRequest::AttendeeStatus {
            row_user: Some(stranger.id)
        }
    )
    .is_allowed());

    // Nothing was written by evaluation.
    assert_eq!(manager.get_meeting(&owner, meeting.id).unwrap().meeting, meeting);
}

fn actor_for(
    manager: &mut LifecycleManager,
    relation: Relation,
    owner: &Actor,
    meeting_id: Uuid,
) -> Actor {
    match relation {
        Relation::Creator => *owner,
        Relation::Attendee => {
            let attendee = user();
            manager
                .add_attendee(owner, meeting_id, &AttendeeInvite::User(attendee.id))
                .unwrap();
            attendee
        }
        Relation::Staff => staff(),
        Relation::Other => user(),
    }
}
