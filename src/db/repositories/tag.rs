//! Tag repository

use crate::db::DbPool;
use crate::models::{CreateTagInput, Tag, UpdateTagInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, input: &CreateTagInput) -> Result<Tag>;

    /// Get tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Get tag by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

    /// Get tags attached to a post
    async fn get_by_post_id(&self, post_id: i64) -> Result<Vec<Tag>>;

    /// List all tags with their post counts, alphabetically
    async fn list(&self) -> Result<Vec<Tag>>;

    /// Update a tag
    async fn update(&self, id: i64, input: &UpdateTagInput) -> Result<Tag>;

    /// Delete a tag
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Check if a slug exists for a different tag (for updates)
    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: DbPool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, input: &CreateTagInput) -> Result<Tag> {
        let now = Utc::now();
        let result = sqlx::query("INSERT INTO tags (slug, name, created_at) VALUES (?, ?, ?)")
            .bind(&input.slug)
            .bind(&input.name)
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to create tag")?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            slug: input.slug.clone(),
            name: input.name.clone(),
            created_at: now,
            post_count: None,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, slug, name, created_at FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by ID")?;

        Ok(row.map(|r| row_to_tag(&r)))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, slug, name, created_at FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by slug")?;

        Ok(row.map(|r| row_to_tag(&r)))
    }

    async fn get_by_post_id(&self, post_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.slug, t.name, t.created_at
            FROM tags t
            INNER JOIN post_tags pt ON t.id = pt.tag_id
            WHERE pt.post_id = ?
            ORDER BY t.name ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get tags for post")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.slug, t.name, t.created_at,
                   (SELECT COUNT(*) FROM post_tags pt WHERE pt.tag_id = t.id) as post_count
            FROM tags t
            ORDER BY t.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list tags")?;

        Ok(rows
            .iter()
            .map(|row| {
                let mut tag = row_to_tag(row);
                tag.post_count = Some(row.get("post_count"));
                tag
            })
            .collect())
    }

    async fn update(&self, id: i64, input: &UpdateTagInput) -> Result<Tag> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Tag not found"))?;

        let new_slug = input.slug.as_ref().unwrap_or(&existing.slug);
        let new_name = input.name.as_ref().unwrap_or(&existing.name);

        sqlx::query("UPDATE tags SET slug = ?, name = ? WHERE id = ?")
            .bind(new_slug)
            .bind(new_name)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update tag")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Tag not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete tag")?;

        Ok(())
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check tag slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM tags WHERE slug = ? AND id != ?")
            .bind(slug)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check tag slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}

fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        post_count: None,
    }
}
