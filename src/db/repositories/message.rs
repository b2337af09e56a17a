//! Contact message repository

use crate::db::DbPool;
use crate::models::{ContactMessage, CreateMessageInput, MessageStatus, UpdateMessageInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

/// Contact message repository trait
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Store a newly submitted message
    async fn create(&self, input: &CreateMessageInput) -> Result<ContactMessage>;

    /// Get message by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<ContactMessage>>;

    /// List messages newest-first, optionally filtered by status
    async fn list(
        &self,
        status: Option<MessageStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ContactMessage>>;

    /// Count messages under the same status filter
    async fn count(&self, status: Option<MessageStatus>) -> Result<i64>;

    /// Update status and notes
    async fn update(&self, id: i64, input: &UpdateMessageInput) -> Result<ContactMessage>;

    /// Delete a message
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based contact message repository implementation
pub struct SqlxMessageRepository {
    pool: DbPool,
}

impl SqlxMessageRepository {
    /// Create a new SQLx message repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn MessageRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl MessageRepository for SqlxMessageRepository {
    async fn create(&self, input: &CreateMessageInput) -> Result<ContactMessage> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO contact_messages (name, email, phone, message, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.message)
        .bind(MessageStatus::Unread.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create contact message")?;

        Ok(ContactMessage {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            message: input.message.clone(),
            status: MessageStatus::Unread,
            notes: None,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ContactMessage>> {
        let row = sqlx::query(
            "SELECT id, name, email, phone, message, status, notes, created_at FROM contact_messages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get contact message by ID")?;

        row.map(|r| row_to_message(&r)).transpose()
    }

    async fn list(
        &self,
        status: Option<MessageStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ContactMessage>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    r#"
                    SELECT id, name, email, phone, message, status, notes, created_at
                    FROM contact_messages
                    WHERE status = ?
                    ORDER BY created_at DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(status.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, name, email, phone, message, status, notes, created_at
                    FROM contact_messages
                    ORDER BY created_at DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list contact messages")?;

        rows.iter().map(row_to_message).collect()
    }

    async fn count(&self, status: Option<MessageStatus>) -> Result<i64> {
        let row = match status {
            Some(status) => {
                sqlx::query("SELECT COUNT(*) as count FROM contact_messages WHERE status = ?")
                    .bind(status.as_str())
                    .fetch_one(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT COUNT(*) as count FROM contact_messages")
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .context("Failed to count contact messages")?;

        Ok(row.get("count"))
    }

    async fn update(&self, id: i64, input: &UpdateMessageInput) -> Result<ContactMessage> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Contact message not found"))?;

        let new_status = input.status.unwrap_or(existing.status);
        let new_notes = input.notes.clone().or(existing.notes.clone());

        sqlx::query("UPDATE contact_messages SET status = ?, notes = ? WHERE id = ?")
            .bind(new_status.as_str())
            .bind(&new_notes)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update contact message")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Contact message not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM contact_messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete contact message")?;

        Ok(())
    }
}

fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<ContactMessage> {
    let status_str: String = row.get("status");
    let status = MessageStatus::from_str(&status_str)
        .with_context(|| format!("Invalid message status in database: {}", status_str))?;

    Ok(ContactMessage {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        message: row.get("message"),
        status,
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxMessageRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxMessageRepository::new(pool)
    }

    fn input(name: &str) -> CreateMessageInput {
        CreateMessageInput {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            message: "We need a new website".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_starts_unread() {
        let repo = setup_test_repo().await;

        let created = repo.create(&input("Alice")).await.expect("create");
        assert!(created.id > 0);
        assert_eq!(created.status, MessageStatus::Unread);
        assert!(created.notes.is_none());
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let repo = setup_test_repo().await;

        let created = repo.create(&input("Alice")).await.expect("create");

        let updated = repo
            .update(
                created.id,
                &UpdateMessageInput {
                    status: Some(MessageStatus::Read),
                    notes: Some("Called back on Monday".to_string()),
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.status, MessageStatus::Read);
        assert_eq!(updated.notes.as_deref(), Some("Called back on Monday"));

        // Status-only update keeps the notes
        let updated = repo
            .update(
                created.id,
                &UpdateMessageInput {
                    status: Some(MessageStatus::Replied),
                    notes: None,
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.status, MessageStatus::Replied);
        assert_eq!(updated.notes.as_deref(), Some("Called back on Monday"));
    }

    #[tokio::test]
    async fn test_list_filtered_by_status() {
        let repo = setup_test_repo().await;

        let first = repo.create(&input("Alice")).await.expect("create");
        repo.create(&input("Bob")).await.expect("create");
        repo.update(
            first.id,
            &UpdateMessageInput {
                status: Some(MessageStatus::Archived),
                notes: None,
            },
        )
        .await
        .expect("update");

        let unread = repo
            .list(Some(MessageStatus::Unread), 0, 10)
            .await
            .expect("list");
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].name, "Bob");

        assert_eq!(repo.count(None).await.expect("count"), 2);
        assert_eq!(
            repo.count(Some(MessageStatus::Archived)).await.expect("count"),
            1
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = setup_test_repo().await;

        let created = repo.create(&input("Alice")).await.expect("create");
        repo.delete(created.id).await.expect("delete");
        assert!(repo.get_by_id(created.id).await.expect("get").is_none());
    }
}
