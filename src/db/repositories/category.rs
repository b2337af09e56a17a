//! Category repository

use crate::db::DbPool;
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List all categories with their post counts, alphabetically
    async fn list(&self) -> Result<Vec<Category>>;

    /// Update a category
    async fn update(&self, id: i64, input: &UpdateCategoryInput) -> Result<Category>;

    /// Delete a category
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Check if a slug exists for a different category (for updates)
    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: DbPool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO categories (slug, name, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create category")?;

        Ok(Category {
            id: result.last_insert_rowid(),
            slug: input.slug.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
            created_at: now,
            post_count: None,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, slug, name, description, created_at FROM categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get category by ID")?;

        Ok(row.map(|r| row_to_category(&r)))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, slug, name, description, created_at FROM categories WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get category by slug")?;

        Ok(row.map(|r| row_to_category(&r)))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.slug, c.name, c.description, c.created_at,
                   (SELECT COUNT(*) FROM posts p WHERE p.category_id = c.id) as post_count
            FROM categories c
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories")?;

        Ok(rows
            .iter()
            .map(|row| {
                let mut category = row_to_category(row);
                category.post_count = Some(row.get("post_count"));
                category
            })
            .collect())
    }

    async fn update(&self, id: i64, input: &UpdateCategoryInput) -> Result<Category> {
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Category not found"))?;

        let new_slug = input.slug.as_ref().unwrap_or(&existing.slug);
        let new_name = input.name.as_ref().unwrap_or(&existing.name);
        let new_description = input.description.clone().or(existing.description.clone());

        sqlx::query("UPDATE categories SET slug = ?, name = ?, description = ? WHERE id = ?")
            .bind(new_slug)
            .bind(new_name)
            .bind(&new_description)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update category")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Category not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;

        Ok(())
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check category slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: i64) -> Result<bool> {
        let row =
            sqlx::query("SELECT COUNT(*) as count FROM categories WHERE slug = ? AND id != ?")
                .bind(slug)
                .bind(exclude_id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to check category slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        post_count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxCategoryRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxCategoryRepository::new(pool)
    }

    fn input(slug: &str, name: &str) -> CreateCategoryInput {
        CreateCategoryInput {
            slug: slug.to_string(),
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = setup_test_repo().await;

        let created = repo.create(&input("seo", "SEO")).await.expect("create");
        assert!(created.id > 0);

        let by_slug = repo
            .get_by_slug("seo")
            .await
            .expect("get")
            .expect("present");
        assert_eq!(by_slug.name, "SEO");
    }

    #[tokio::test]
    async fn test_list_alphabetical_with_counts() {
        let repo = setup_test_repo().await;

        repo.create(&input("seo", "SEO")).await.expect("create");
        repo.create(&input("content", "Content Marketing"))
            .await
            .expect("create");

        let categories = repo.list().await.expect("list");
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Content Marketing");
        assert_eq!(categories[0].post_count, Some(0));
    }

    #[tokio::test]
    async fn test_update() {
        let repo = setup_test_repo().await;

        let created = repo.create(&input("seo", "SEO")).await.expect("create");
        let updated = repo
            .update(
                created.id,
                &UpdateCategoryInput {
                    name: Some("Search Engine Optimization".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");

        assert_eq!(updated.name, "Search Engine Optimization");
        assert_eq!(updated.slug, "seo");
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = setup_test_repo().await;

        let created = repo.create(&input("seo", "SEO")).await.expect("create");
        repo.delete(created.id).await.expect("delete");
        assert!(repo.get_by_id(created.id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_exists_by_slug() {
        let repo = setup_test_repo().await;

        let created = repo.create(&input("seo", "SEO")).await.expect("create");
        assert!(repo.exists_by_slug("seo").await.expect("check"));
        assert!(!repo.exists_by_slug("other").await.expect("check"));
        assert!(!repo
            .exists_by_slug_excluding("seo", created.id)
            .await
            .expect("check"));
    }
}
