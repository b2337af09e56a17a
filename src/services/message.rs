//! Contact message service
//!
//! Public form submissions land here as Unread; console operators page
//! through them, move them through the triage states, and attach notes.

use crate::db::repositories::MessageRepository;
use crate::models::{
    ContactMessage, CreateMessageInput, ListParams, MessageStatus, PagedResult, UpdateMessageInput,
};
use anyhow::Context;
use std::sync::Arc;

const MAX_NAME_LEN: usize = 100;
const MAX_PHONE_LEN: usize = 20;
const MAX_MESSAGE_LEN: usize = 5000;
const MAX_NOTES_LEN: usize = 5000;

/// Error types for message service operations
#[derive(Debug, thiserror::Error)]
pub enum MessageServiceError {
    /// Message not found
    #[error("Message not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Contact message service
pub struct MessageService {
    repo: Arc<dyn MessageRepository>,
}

impl MessageService {
    /// Create a new message service
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self { repo }
    }

    /// Store a message submitted through the public contact form
    pub async fn submit(
        &self,
        input: CreateMessageInput,
    ) -> Result<ContactMessage, MessageServiceError> {
        if input.name.trim().is_empty() {
            return Err(MessageServiceError::ValidationError(
                "Name is required".to_string(),
            ));
        }
        if input.name.chars().count() > MAX_NAME_LEN {
            return Err(MessageServiceError::ValidationError(format!(
                "Name is too long (max {} characters)",
                MAX_NAME_LEN
            )));
        }
        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(MessageServiceError::ValidationError(
                "A valid email address is required".to_string(),
            ));
        }
        if let Some(phone) = &input.phone {
            if phone.chars().count() > MAX_PHONE_LEN {
                return Err(MessageServiceError::ValidationError(format!(
                    "Phone number is too long (max {} characters)",
                    MAX_PHONE_LEN
                )));
            }
        }
        if input.message.trim().is_empty() {
            return Err(MessageServiceError::ValidationError(
                "Message is required".to_string(),
            ));
        }
        if input.message.chars().count() > MAX_MESSAGE_LEN {
            return Err(MessageServiceError::ValidationError(format!(
                "Message is too long (max {} characters)",
                MAX_MESSAGE_LEN
            )));
        }

        let message = self
            .repo
            .create(&input)
            .await
            .context("Failed to store contact message")?;
        Ok(message)
    }

    /// List messages newest-first, optionally filtered by status
    pub async fn list(
        &self,
        status: Option<MessageStatus>,
        params: &ListParams,
    ) -> Result<PagedResult<ContactMessage>, MessageServiceError> {
        let items = self
            .repo
            .list(status, params.offset(), params.take())
            .await
            .context("Failed to list contact messages")?;
        let total = self
            .repo
            .count(status)
            .await
            .context("Failed to count contact messages")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Get message by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<ContactMessage>, MessageServiceError> {
        let message = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get contact message")?;
        Ok(message)
    }

    /// Update a message's status and notes
    pub async fn update(
        &self,
        id: i64,
        input: UpdateMessageInput,
    ) -> Result<ContactMessage, MessageServiceError> {
        if let Some(notes) = &input.notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                return Err(MessageServiceError::ValidationError(format!(
                    "Notes are too long (max {} characters)",
                    MAX_NOTES_LEN
                )));
            }
        }

        if self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get contact message")?
            .is_none()
        {
            return Err(MessageServiceError::NotFound(id.to_string()));
        }

        let message = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update contact message")?;
        Ok(message)
    }

    /// Delete a message
    pub async fn delete(&self, id: i64) -> Result<(), MessageServiceError> {
        if self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get contact message")?
            .is_none()
        {
            return Err(MessageServiceError::NotFound(id.to_string()));
        }

        self.repo
            .delete(id)
            .await
            .context("Failed to delete contact message")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxMessageRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_service() -> MessageService {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        MessageService::new(SqlxMessageRepository::boxed(pool))
    }

    fn input() -> CreateMessageInput {
        CreateMessageInput {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: None,
            message: "We need a rebrand".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_valid_message() {
        let service = setup_service().await;

        let message = service.submit(input()).await.expect("submit");
        assert_eq!(message.status, MessageStatus::Unread);
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_input() {
        let service = setup_service().await;

        let mut no_name = input();
        no_name.name = "  ".to_string();
        assert!(matches!(
            service.submit(no_name).await,
            Err(MessageServiceError::ValidationError(_))
        ));

        let mut bad_email = input();
        bad_email.email = "nope".to_string();
        assert!(matches!(
            service.submit(bad_email).await,
            Err(MessageServiceError::ValidationError(_))
        ));

        let mut long_message = input();
        long_message.message = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert!(matches!(
            service.submit(long_message).await,
            Err(MessageServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_lifecycle_and_pagination() {
        let service = setup_service().await;

        for _ in 0..3 {
            service.submit(input()).await.expect("submit");
        }

        let page = service
            .list(None, &ListParams::new(1, 2))
            .await
            .expect("list");
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages(), 2);

        let first = page.items[0].id;
        let updated = service
            .update(
                first,
                UpdateMessageInput {
                    status: Some(MessageStatus::Replied),
                    notes: Some("Sent a quote".to_string()),
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.status, MessageStatus::Replied);

        let replied = service
            .list(Some(MessageStatus::Replied), &ListParams::new(1, 10))
            .await
            .expect("list");
        assert_eq!(replied.total, 1);
    }

    #[tokio::test]
    async fn test_update_missing_message() {
        let service = setup_service().await;

        let result = service
            .update(
                404,
                UpdateMessageInput {
                    status: Some(MessageStatus::Read),
                    notes: None,
                },
            )
            .await;
        assert!(matches!(result, Err(MessageServiceError::NotFound(_))));
    }
}
