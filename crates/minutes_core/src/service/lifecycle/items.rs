//! Action items and attachments. Every write requires `edit` on the meeting.

use super::{authorize, validated, LifecycleManager};
use crate::audit::{next_updated_at, Clock};
use crate::model::actor::Actor;
use crate::model::item::{
    ActionItem, ActionItemId, ActionItemPatch, Attachment, AttachmentId, NewActionItem,
    NewAttachment,
};
use crate::model::meeting::MeetingId;
use crate::policy::Capability;
use crate::repo::item_repo::{ItemRepository, SqliteItemRepository};
use crate::service::error::{LifecycleError, LifecycleResult};
use rusqlite::Connection;
use uuid::Uuid;

impl<C: Clock> LifecycleManager<C> {
    pub fn create_action_item(
        &mut self,
        actor: &Actor,
        meeting_id: MeetingId,
        input: &NewActionItem,
    ) -> LifecycleResult<ActionItem> {
        let input = validated("action_item_create", actor, input.normalized())?;

        self.write("action_item_create", actor, |tx, now| {
            authorize(tx, actor, meeting_id, Capability::Edit)?;
            let item = ActionItem {
                id: Uuid::new_v4(),
                meeting_id,
                title: input.title,
                description: input.description.unwrap_or_default(),
                assigned_to: input.assigned_to,
                completed: false,
                created_at: now,
                updated_at: now,
            };
            SqliteItemRepository::try_new(tx)?.insert_action_item(&item)?;
            Ok(item)
        })
    }

    pub fn update_action_item(
        &mut self,
        actor: &Actor,
        item_id: ActionItemId,
        patch: &ActionItemPatch,
    ) -> LifecycleResult<ActionItem> {
        let patch = validated("action_item_update", actor, patch.normalized())?;

        self.write("action_item_update", actor, |tx, now| {
            let mut item = load_action_item(tx, item_id)?;
            authorize(tx, actor, item.meeting_id, Capability::Edit)?;
            patch.apply_to(&mut item);
            item.updated_at = next_updated_at(item.updated_at, now);
            SqliteItemRepository::try_new(tx)?.update_action_item(&item)?;
            Ok(item)
        })
    }

    pub fn delete_action_item(
        &mut self,
        actor: &Actor,
        item_id: ActionItemId,
    ) -> LifecycleResult<()> {
        self.write("action_item_delete", actor, |tx, _| {
            let item = load_action_item(tx, item_id)?;
            authorize(tx, actor, item.meeting_id, Capability::Edit)?;
            SqliteItemRepository::try_new(tx)?.delete_action_item(item.id)?;
            Ok(())
        })
    }

    /// Records a file reference; the uploader is the acting identity.
    pub fn add_attachment(
        &mut self,
        actor: &Actor,
        meeting_id: MeetingId,
        input: &NewAttachment,
    ) -> LifecycleResult<Attachment> {
        let input = validated("attachment_add", actor, input.normalized())?;

        self.write("attachment_add", actor, |tx, now| {
            authorize(tx, actor, meeting_id, Capability::Edit)?;
            let attachment = Attachment {
                id: Uuid::new_v4(),
                meeting_id,
                name: input.name,
                file_url: input.file_url,
                uploaded_by: Some(actor.id),
                created_at: now,
            };
            SqliteItemRepository::try_new(tx)?.insert_attachment(&attachment)?;
            Ok(attachment)
        })
    }

    pub fn delete_attachment(
        &mut self,
        actor: &Actor,
        attachment_id: AttachmentId,
    ) -> LifecycleResult<()> {
        self.write("attachment_delete", actor, |tx, _| {
            let attachment = SqliteItemRepository::try_new(tx)?
                .get_attachment(attachment_id)?
                .ok_or(LifecycleError::not_found("attachment", attachment_id))?;
            authorize(tx, actor, attachment.meeting_id, Capability::Edit)?;
            SqliteItemRepository::try_new(tx)?.delete_attachment(attachment.id)?;
            Ok(())
        })
    }
}

fn load_action_item(conn: &Connection, id: ActionItemId) -> LifecycleResult<ActionItem> {
    SqliteItemRepository::try_new(conn)?
        .get_action_item(id)?
        .ok_or(LifecycleError::not_found("action item", id))
}
