//! Action item and attachment repository.

use crate::model::item::{ActionItem, ActionItemId, Attachment, AttachmentId};
use crate::model::meeting::MeetingId;
use crate::repo::{
    bool_column, bool_to_int, ensure_schema_ready, optional_uuid_column, uuid_column, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row};

const ACTION_ITEM_SELECT_SQL: &str = "SELECT
    id,
    meeting_id,
    title,
    description,
    assigned_to,
    completed,
    created_at,
    updated_at
FROM action_items";

const ATTACHMENT_SELECT_SQL: &str = "SELECT
    id,
    meeting_id,
    name,
    file_url,
    uploaded_by,
    created_at
FROM attachments";

pub trait ItemRepository {
    fn insert_action_item(&self, item: &ActionItem) -> RepoResult<()>;
    fn get_action_item(&self, id: ActionItemId) -> RepoResult<Option<ActionItem>>;
    fn update_action_item(&self, item: &ActionItem) -> RepoResult<()>;
    fn delete_action_item(&self, id: ActionItemId) -> RepoResult<()>;
    /// Open items first, then by creation time.
    fn list_action_items(&self, meeting_id: MeetingId) -> RepoResult<Vec<ActionItem>>;

    fn insert_attachment(&self, attachment: &Attachment) -> RepoResult<()>;
    fn get_attachment(&self, id: AttachmentId) -> RepoResult<Option<Attachment>>;
    fn delete_attachment(&self, id: AttachmentId) -> RepoResult<()>;
    fn list_attachments(&self, meeting_id: MeetingId) -> RepoResult<Vec<Attachment>>;
}

pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn insert_action_item(&self, item: &ActionItem) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO action_items (
                id,
                meeting_id,
                title,
                description,
                assigned_to,
                completed,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                item.id.to_string(),
                item.meeting_id.to_string(),
                item.title.as_str(),
                item.description.as_str(),
                item.assigned_to.map(|id| id.to_string()),
                bool_to_int(item.completed),
                item.created_at,
                item.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_action_item(&self, id: ActionItemId) -> RepoResult<Option<ActionItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTION_ITEM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_action_item_row(row)?));
        }
        Ok(None)
    }

    fn update_action_item(&self, item: &ActionItem) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE action_items
             SET
                title = ?2,
                description = ?3,
                assigned_to = ?4,
                completed = ?5,
                updated_at = ?6
             WHERE id = ?1;",
            params![
                item.id.to_string(),
                item.title.as_str(),
                item.description.as_str(),
                item.assigned_to.map(|id| id.to_string()),
                bool_to_int(item.completed),
                item.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "action item",
                id: item.id,
            });
        }
        Ok(())
    }

    fn delete_action_item(&self, id: ActionItemId) -> RepoResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM action_items WHERE id = ?1;", [id.to_string()])?;
        if removed == 0 {
            return Err(RepoError::NotFound {
                entity: "action item",
                id,
            });
        }
        Ok(())
    }

    fn list_action_items(&self, meeting_id: MeetingId) -> RepoResult<Vec<ActionItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACTION_ITEM_SELECT_SQL}
             WHERE meeting_id = ?1
             ORDER BY completed ASC, created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([meeting_id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_action_item_row(row)?);
        }
        Ok(items)
    }

    fn insert_attachment(&self, attachment: &Attachment) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO attachments (id, meeting_id, name, file_url, uploaded_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                attachment.id.to_string(),
                attachment.meeting_id.to_string(),
                attachment.name.as_str(),
                attachment.file_url.as_str(),
                attachment.uploaded_by.map(|id| id.to_string()),
                attachment.created_at,
            ],
        )?;
        Ok(())
    }

    fn get_attachment(&self, id: AttachmentId) -> RepoResult<Option<Attachment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ATTACHMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_attachment_row(row)?));
        }
        Ok(None)
    }

    fn delete_attachment(&self, id: AttachmentId) -> RepoResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM attachments WHERE id = ?1;", [id.to_string()])?;
        if removed == 0 {
            return Err(RepoError::NotFound {
                entity: "attachment",
                id,
            });
        }
        Ok(())
    }

    fn list_attachments(&self, meeting_id: MeetingId) -> RepoResult<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATTACHMENT_SELECT_SQL} WHERE meeting_id = ?1 ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([meeting_id.to_string()])?;
        let mut attachments = Vec::new();
        while let Some(row) = rows.next()? {
            attachments.push(parse_attachment_row(row)?);
        }
        Ok(attachments)
    }
}

fn parse_action_item_row(row: &Row<'_>) -> RepoResult<ActionItem> {
    Ok(ActionItem {
        id: uuid_column(row, "action_items", "id")?,
        meeting_id: uuid_column(row, "action_items", "meeting_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        assigned_to: optional_uuid_column(row, "action_items", "assigned_to")?,
        completed: bool_column(row, "action_items", "completed")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_attachment_row(row: &Row<'_>) -> RepoResult<Attachment> {
    Ok(Attachment {
        id: uuid_column(row, "attachments", "id")?,
        meeting_id: uuid_column(row, "attachments", "meeting_id")?,
        name: row.get("name")?,
        file_url: row.get("file_url")?,
        uploaded_by: optional_uuid_column(row, "attachments", "uploaded_by")?,
        created_at: row.get("created_at")?,
    })
}
