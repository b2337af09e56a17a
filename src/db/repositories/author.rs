//! Author repository

use crate::db::DbPool;
use crate::models::{Author, CreateAuthorInput, UpdateAuthorInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

/// Author repository trait
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Create a new author
    async fn create(&self, input: &CreateAuthorInput) -> Result<Author>;

    /// Get author by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Author>>;

    /// Get author by email
    async fn get_by_email(&self, email: &str) -> Result<Option<Author>>;

    /// List all authors with their post counts, alphabetically
    async fn list(&self) -> Result<Vec<Author>>;

    /// Update an author
    async fn update(&self, id: i64, input: &UpdateAuthorInput) -> Result<Author>;

    /// Delete an author
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if an email exists for a different author (for updates)
    async fn exists_by_email_excluding(&self, email: &str, exclude_id: i64) -> Result<bool>;
}

/// SQLx-based author repository implementation
pub struct SqlxAuthorRepository {
    pool: DbPool,
}

impl SqlxAuthorRepository {
    /// Create a new SQLx author repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn AuthorRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AuthorRepository for SqlxAuthorRepository {
    async fn create(&self, input: &CreateAuthorInput) -> Result<Author> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO authors (name, email, avatar, bio, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.avatar)
        .bind(&input.bio)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create author")?;

        Ok(Author {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            email: input.email.clone(),
            avatar: input.avatar.clone(),
            bio: input.bio.clone(),
            created_at: now,
            post_count: None,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Author>> {
        let row = sqlx::query(
            "SELECT id, name, email, avatar, bio, created_at FROM authors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get author by ID")?;

        Ok(row.map(|r| row_to_author(&r)))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Author>> {
        let row = sqlx::query(
            "SELECT id, name, email, avatar, bio, created_at FROM authors WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get author by email")?;

        Ok(row.map(|r| row_to_author(&r)))
    }

    async fn list(&self) -> Result<Vec<Author>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.name, a.email, a.avatar, a.bio, a.created_at,
                   (SELECT COUNT(*) FROM posts p WHERE p.author_id = a.id) as post_count
            FROM authors a
            ORDER BY a.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list authors")?;

        Ok(rows
            .iter()
            .map(|row| {
                let mut author = row_to_author(row);
                author.post_count = Some(row.get("post_count"));
                author
            })
            .collect())
    }

    async fn update(&self, id: i64, input: &UpdateAuthorInput) -> Result<Author> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Author not found"))?;

        let new_name = input.name.as_ref().unwrap_or(&existing.name);
        let new_email = input.email.as_ref().unwrap_or(&existing.email);
        let new_avatar = input.avatar.clone().or(existing.avatar.clone());
        let new_bio = input.bio.clone().or(existing.bio.clone());

        sqlx::query("UPDATE authors SET name = ?, email = ?, avatar = ?, bio = ? WHERE id = ?")
            .bind(new_name)
            .bind(new_email)
            .bind(&new_avatar)
            .bind(&new_bio)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update author")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Author not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete author")?;

        Ok(())
    }

    async fn exists_by_email_excluding(&self, email: &str, exclude_id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM authors WHERE email = ? AND id != ?")
            .bind(email)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check author email existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}

fn row_to_author(row: &sqlx::sqlite::SqliteRow) -> Author {
    Author {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        avatar: row.get("avatar"),
        bio: row.get("bio"),
        created_at: row.get("created_at"),
        post_count: None,
    }
}
