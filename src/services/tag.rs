//! Tag service
//!
//! CRUD over blog tags. Deleting a tag that is still attached to posts is
//! refused with a conflict.

use crate::db::repositories::{PostRepository, TagRepository};
use crate::models::{CreateTagInput, Tag, UpdateTagInput};
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

const MAX_NAME_LEN: usize = 50;

/// Error types for tag service operations
#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    /// Tag not found
    #[error("Tag not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate slug
    #[error("Tag slug already exists: {0}")]
    DuplicateSlug(String),

    /// Tag still attached to posts
    #[error("Tag is in use: {0}")]
    InUse(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Tag service
pub struct TagService {
    repo: Arc<dyn TagRepository>,
    post_repo: Arc<dyn PostRepository>,
}

impl TagService {
    /// Create a new tag service
    pub fn new(repo: Arc<dyn TagRepository>, post_repo: Arc<dyn PostRepository>) -> Self {
        Self { repo, post_repo }
    }

    /// List all tags with post counts
    pub async fn list(&self) -> Result<Vec<Tag>, TagServiceError> {
        let tags = self.repo.list().await.context("Failed to list tags")?;
        Ok(tags)
    }

    /// Get tag by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Tag>, TagServiceError> {
        let tag = self.repo.get_by_id(id).await.context("Failed to get tag")?;
        Ok(tag)
    }

    /// Create a new tag
    pub async fn create(&self, input: CreateTagInput) -> Result<Tag, TagServiceError> {
        validate_name(&input.name)?;
        validate_slug(&input.slug)?;

        if self
            .repo
            .exists_by_slug(&input.slug)
            .await
            .context("Failed to check slug")?
        {
            return Err(TagServiceError::DuplicateSlug(input.slug));
        }

        let tag = self
            .repo
            .create(&input)
            .await
            .context("Failed to create tag")?;
        Ok(tag)
    }

    /// Update a tag
    pub async fn update(&self, id: i64, input: UpdateTagInput) -> Result<Tag, TagServiceError> {
        if self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get tag")?
            .is_none()
        {
            return Err(TagServiceError::NotFound(id.to_string()));
        }

        if let Some(name) = &input.name {
            validate_name(name)?;
        }
        if let Some(slug) = &input.slug {
            validate_slug(slug)?;
            if self
                .repo
                .exists_by_slug_excluding(slug, id)
                .await
                .context("Failed to check slug")?
            {
                return Err(TagServiceError::DuplicateSlug(slug.clone()));
            }
        }

        let tag = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update tag")?;
        Ok(tag)
    }

    /// Delete a tag, refused while posts still carry it
    pub async fn delete(&self, id: i64) -> Result<(), TagServiceError> {
        let tag = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get tag")?
            .ok_or_else(|| TagServiceError::NotFound(id.to_string()))?;

        let posts = self
            .post_repo
            .count_by_tag(id)
            .await
            .context("Failed to count posts with tag")?;
        if posts > 0 {
            return Err(TagServiceError::InUse(format!(
                "Tag '{}' is attached to {} post(s)",
                tag.name, posts
            )));
        }

        self.repo.delete(id).await.context("Failed to delete tag")?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), TagServiceError> {
    if name.trim().is_empty() {
        return Err(TagServiceError::ValidationError(
            "Name is required".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(TagServiceError::ValidationError(format!(
            "Name is too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_slug(slug: &str) -> Result<(), TagServiceError> {
    if !SLUG_RE.is_match(slug) {
        return Err(TagServiceError::ValidationError(format!(
            "Slug must be lowercase letters, digits, and hyphens: {}",
            slug
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxPostRepository, SqlxTagRepository};
    use crate::db::{create_test_pool, migrations, DbPool};

    async fn setup_service() -> (DbPool, TagService) {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");

        let service = TagService::new(
            SqlxTagRepository::boxed(pool.clone()),
            SqlxPostRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    #[tokio::test]
    async fn test_create_and_duplicate() {
        let (_pool, service) = setup_service().await;

        service
            .create(CreateTagInput {
                slug: "growth".to_string(),
                name: "Growth".to_string(),
            })
            .await
            .expect("create");

        let result = service
            .create(CreateTagInput {
                slug: "growth".to_string(),
                name: "Growth Again".to_string(),
            })
            .await;
        assert!(matches!(result, Err(TagServiceError::DuplicateSlug(_))));
    }

    #[tokio::test]
    async fn test_delete_attached_tag_conflicts() {
        let (pool, service) = setup_service().await;

        let tag = service
            .create(CreateTagInput {
                slug: "growth".to_string(),
                name: "Growth".to_string(),
            })
            .await
            .expect("create");

        sqlx::query("INSERT INTO authors (name, email) VALUES ('A', 'a@example.com')")
            .execute(&pool)
            .await
            .expect("author");
        sqlx::query("INSERT INTO categories (slug, name) VALUES ('seo', 'SEO')")
            .execute(&pool)
            .await
            .expect("category");
        sqlx::query(
            "INSERT INTO posts (slug, title, excerpt, content, cover_image, read_time, author_id, category_id) VALUES ('p', 'P', 'E', 'C', 'I', '1 min read', 1, 1)",
        )
        .execute(&pool)
        .await
        .expect("post");
        sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES (1, ?)")
            .bind(tag.id)
            .execute(&pool)
            .await
            .expect("association");

        let result = service.delete(tag.id).await;
        assert!(matches!(result, Err(TagServiceError::InUse(_))));
        assert!(service.get_by_id(tag.id).await.expect("get").is_some());
    }

    #[tokio::test]
    async fn test_delete_unattached_tag() {
        let (_pool, service) = setup_service().await;

        let tag = service
            .create(CreateTagInput {
                slug: "orphan".to_string(),
                name: "Orphan".to_string(),
            })
            .await
            .expect("create");

        service.delete(tag.id).await.expect("delete");
        assert!(service.get_by_id(tag.id).await.expect("get").is_none());
    }
}
