//! Category service
//!
//! CRUD over blog categories with duplicate-slug conflicts and a
//! referential-integrity guard: a category that still has posts cannot be
//! deleted.

use crate::db::repositories::{CategoryRepository, PostRepository};
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

const MAX_NAME_LEN: usize = 100;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate slug
    #[error("Category slug already exists: {0}")]
    DuplicateSlug(String),

    /// Category still referenced by posts
    #[error("Category is in use: {0}")]
    InUse(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    post_repo: Arc<dyn PostRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>, post_repo: Arc<dyn PostRepository>) -> Self {
        Self { repo, post_repo }
    }

    /// List all categories with post counts
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        let categories = self.repo.list().await.context("Failed to list categories")?;
        Ok(categories)
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Category>, CategoryServiceError> {
        let category = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?;
        Ok(category)
    }

    /// Create a new category
    pub async fn create(
        &self,
        input: CreateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        validate_name(&input.name)?;
        validate_slug(&input.slug)?;

        if self
            .repo
            .exists_by_slug(&input.slug)
            .await
            .context("Failed to check slug")?
        {
            return Err(CategoryServiceError::DuplicateSlug(input.slug));
        }

        let category = self
            .repo
            .create(&input)
            .await
            .context("Failed to create category")?;
        Ok(category)
    }

    /// Update a category
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        if self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .is_none()
        {
            return Err(CategoryServiceError::NotFound(id.to_string()));
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
                return Err(CategoryServiceError::DuplicateSlug(slug.clone()));
            }
        }

        let category = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update category")?;
        Ok(category)
    }

    /// Delete a category.
    ///
    /// Refused while any post references it, so listings never point at a
    /// category that no longer exists.
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        let category = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| CategoryServiceError::NotFound(id.to_string()))?;

        let posts = self
            .post_repo
            .count_by_category(id)
            .await
            .context("Failed to count posts in category")?;
        if posts > 0 {
            return Err(CategoryServiceError::InUse(format!(
                "Category '{}' has {} post(s)",
                category.name, posts
            )));
        }

        self.repo
            .delete(id)
            .await
            .context("Failed to delete category")?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), CategoryServiceError> {
    if name.trim().is_empty() {
        return Err(CategoryServiceError::ValidationError(
            "Name is required".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CategoryServiceError::ValidationError(format!(
            "Name is too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_slug(slug: &str) -> Result<(), CategoryServiceError> {
    if !SLUG_RE.is_match(slug) {
        return Err(CategoryServiceError::ValidationError(format!(
            "Slug must be lowercase letters, digits, and hyphens: {}",
            slug
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxCategoryRepository, SqlxPostRepository};
    use crate::db::{create_test_pool, migrations, DbPool};

    async fn setup_service() -> (DbPool, CategoryService) {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");

        let service = CategoryService::new(
            SqlxCategoryRepository::boxed(pool.clone()),
            SqlxPostRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    fn input(slug: &str, name: &str) -> CreateCategoryInput {
        CreateCategoryInput {
            slug: slug.to_string(),
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_duplicate_slug() {
        let (_pool, service) = setup_service().await;

        service.create(input("seo", "SEO")).await.expect("create");
        let result = service.create(input("seo", "Other")).await;
        assert!(matches!(
            result,
            Err(CategoryServiceError::DuplicateSlug(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_slug() {
        let (_pool, service) = setup_service().await;

        let result = service.create(input("Bad Slug", "Bad")).await;
        assert!(matches!(
            result,
            Err(CategoryServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_referenced_category_conflicts() {
        let (pool, service) = setup_service().await;

        let category = service.create(input("seo", "SEO")).await.expect("create");

        sqlx::query("INSERT INTO authors (name, email) VALUES ('A', 'a@example.com')")
            .execute(&pool)
            .await
            .expect("author");
        sqlx::query(
            "INSERT INTO posts (slug, title, excerpt, content, cover_image, read_time, author_id, category_id) VALUES ('p', 'P', 'E', 'C', 'I', '1 min read', 1, ?)",
        )
        .bind(category.id)
        .execute(&pool)
        .await
        .expect("post");

        let result = service.delete(category.id).await;
        assert!(matches!(result, Err(CategoryServiceError::InUse(_))));

        // The category survives the refused delete
        assert!(service
            .get_by_id(category.id)
            .await
            .expect("get")
            .is_some());
    }

    #[tokio::test]
    async fn test_delete_unreferenced_category() {
        let (_pool, service) = setup_service().await;

        let category = service.create(input("seo", "SEO")).await.expect("create");
        service.delete(category.id).await.expect("delete");
        assert!(service.get_by_id(category.id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_category() {
        let (_pool, service) = setup_service().await;

        let result = service.delete(999).await;
        assert!(matches!(result, Err(CategoryServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_slug_conflict() {
        let (_pool, service) = setup_service().await;

        service.create(input("seo", "SEO")).await.expect("create");
        let other = service
            .create(input("content", "Content"))
            .await
            .expect("create");

        let result = service
            .update(
                other.id,
                UpdateCategoryInput {
                    slug: Some("seo".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(CategoryServiceError::DuplicateSlug(_))
        ));
    }
}
