//! Post repository
//!
//! Database operations for blog posts.
//!
//! This module provides:
//! - `PostRepository` trait defining the interface for post data access
//! - `SqlxPostRepository` implementing the trait over SQLite
//!
//! List queries take a `PostFilter` describing the combined predicate
//! (visibility, category, search, featured); the same predicate drives both
//! the page fetch and the total count so pagination stays consistent.

use crate::db::DbPool;
use crate::models::{CreatePostInput, Post, PostFilter, UpdatePostInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite};
use std::sync::Arc;

const POST_COLUMNS: &str = "p.id, p.slug, p.title, p.excerpt, p.content, p.cover_image, \
     p.featured, p.published, p.published_at, p.read_time, p.views, \
     p.author_id, p.category_id, p.created_at, p.updated_at";

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post
    async fn create(&self, input: &CreatePostInput) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get post by slug, regardless of publish state
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// List posts matching the filter, newest publication first
    async fn list(&self, filter: &PostFilter, offset: i64, limit: i64) -> Result<Vec<Post>>;

    /// Count posts matching the filter (pre-pagination)
    async fn count(&self, filter: &PostFilter) -> Result<i64>;

    /// Update a post
    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Post>;

    /// Delete a post
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Check if a slug exists for a different post (for updates)
    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool>;

    /// Increment the view counter by one
    async fn increment_views(&self, id: i64) -> Result<()>;

    /// Replace the set of tags attached to a post
    async fn set_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()>;

    /// Get the IDs of tags attached to a post
    async fn tag_ids(&self, post_id: i64) -> Result<Vec<i64>>;

    /// Count posts in a category
    async fn count_by_category(&self, category_id: i64) -> Result<i64>;

    /// Count posts by an author
    async fn count_by_author(&self, author_id: i64) -> Result<i64>;

    /// Count posts carrying a tag
    async fn count_by_tag(&self, tag_id: i64) -> Result<i64>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DbPool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

/// Append the filter predicate as a WHERE clause.
///
/// `Visibility::Public` always forces `published = 1`; the remaining
/// conditions are ANDed in when present. An empty search term is a no-op
/// filter, not an empty-result filter.
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &PostFilter) {
    qb.push(" WHERE 1 = 1");

    if !filter.visibility.includes_drafts() {
        qb.push(" AND p.published = 1");
    }

    if let Some(category) = &filter.category {
        qb.push(" AND p.category_id IN (SELECT id FROM categories WHERE slug = ")
            .push_bind(category.clone())
            .push(")");
    }

    if let Some(featured) = filter.featured {
        qb.push(" AND p.featured = ").push_bind(featured);
    }

    if let Some(search) = &filter.search {
        if !search.is_empty() {
            let pattern = format!("%{}%", search.to_lowercase());
            qb.push(" AND (LOWER(p.title) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(p.excerpt) LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput) -> Result<Post> {
        let now = Utc::now();
        // published_at defaults to the publish time when publishing directly
        let published_at = input
            .published_at
            .or(if input.published { Some(now) } else { None });

        let result = sqlx::query(
            r#"
            INSERT INTO posts (slug, title, excerpt, content, cover_image, featured, published, published_at, read_time, author_id, category_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.slug)
        .bind(&input.title)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(&input.cover_image)
        .bind(input.featured)
        .bind(input.published)
        .bind(published_at)
        .bind(&input.read_time)
        .bind(input.author_id)
        .bind(input.category_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        let id = result.last_insert_rowid();

        if !input.tag_ids.is_empty() {
            self.set_tags(id, &input.tag_ids).await?;
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Post not found after insert"))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM posts p WHERE p.id = ?",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get post by ID")?;

        row.map(|r| row_to_post(&r)).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM posts p WHERE p.slug = ?",
            POST_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get post by slug")?;

        row.map(|r| row_to_post(&r)).transpose()
    }

    async fn list(&self, filter: &PostFilter, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM posts p", POST_COLUMNS));
        push_filter(&mut qb, filter);
        // Drafts carry no publication date and sort after all dated posts
        qb.push(" ORDER BY p.published_at DESC NULLS LAST, p.created_at DESC");
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list posts")?;

        rows.iter().map(row_to_post).collect()
    }

    async fn count(&self, filter: &PostFilter) -> Result<i64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) as count FROM posts p");
        push_filter(&mut qb, filter);

        let row = qb
            .build()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts")?;

        Ok(row.get("count"))
    }

    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Post> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Post not found"))?;

        let now = Utc::now();
        let new_slug = input.slug.as_ref().unwrap_or(&existing.slug);
        let new_title = input.title.as_ref().unwrap_or(&existing.title);
        let new_excerpt = input.excerpt.as_ref().unwrap_or(&existing.excerpt);
        let new_content = input.content.as_ref().unwrap_or(&existing.content);
        let new_cover_image = input.cover_image.as_ref().unwrap_or(&existing.cover_image);
        let new_featured = input.featured.unwrap_or(existing.featured);
        let new_published = input.published.unwrap_or(existing.published);
        let new_read_time = input.read_time.as_ref().unwrap_or(&existing.read_time);
        let new_author_id = input.author_id.unwrap_or(existing.author_id);
        let new_category_id = input.category_id.unwrap_or(existing.category_id);

        // published_at is written once on the first unpublished -> published
        // transition (unless supplied explicitly) and preserved afterwards,
        // including across unpublish/republish cycles
        let new_published_at = if let Some(explicit) = input.published_at {
            Some(explicit)
        } else if new_published && existing.published_at.is_none() {
            Some(now)
        } else {
            existing.published_at
        };

        sqlx::query(
            r#"
            UPDATE posts
            SET slug = ?, title = ?, excerpt = ?, content = ?, cover_image = ?, featured = ?, published = ?, published_at = ?, read_time = ?, author_id = ?, category_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(new_slug)
        .bind(new_title)
        .bind(new_excerpt)
        .bind(new_content)
        .bind(new_cover_image)
        .bind(new_featured)
        .bind(new_published)
        .bind(new_published_at)
        .bind(new_read_time)
        .bind(new_author_id)
        .bind(new_category_id)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;

        if let Some(tag_ids) = &input.tag_ids {
            self.set_tags(id, tag_ids).await?;
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        // post_tags rows are removed automatically via ON DELETE CASCADE
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;

        Ok(())
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check post slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ? AND id != ?")
            .bind(slug)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check post slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn increment_views(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE posts SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to increment view count")?;

        Ok(())
    }

    async fn set_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()> {
        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .context("Failed to clear post tags")?;

        for tag_id in tag_ids {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                .bind(post_id)
                .bind(tag_id)
                .execute(&self.pool)
                .await
                .context("Failed to attach tag to post")?;
        }

        Ok(())
    }

    async fn tag_ids(&self, post_id: i64) -> Result<Vec<i64>> {
        let rows = sqlx::query("SELECT tag_id FROM post_tags WHERE post_id = ? ORDER BY tag_id")
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to get post tags")?;

        Ok(rows.iter().map(|row| row.get("tag_id")).collect())
    }

    async fn count_by_category(&self, category_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE category_id = ?")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts by category")?;

        Ok(row.get("count"))
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts by author")?;

        Ok(row.get("count"))
    }

    async fn count_by_tag(&self, tag_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM post_tags WHERE tag_id = ?")
            .bind(tag_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts by tag")?;

        Ok(row.get("count"))
    }
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    Ok(Post {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        cover_image: row.get("cover_image"),
        featured: row.get("featured"),
        published: row.get("published"),
        published_at: row.get("published_at"),
        read_time: row.get("read_time"),
        views: row.get("views"),
        author_id: row.get("author_id"),
        category_id: row.get("category_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
