//! Author service
//!
//! CRUD over blog authors with duplicate-email conflicts and a
//! referential-integrity guard on delete.

use crate::db::repositories::{AuthorRepository, PostRepository};
use crate::models::{Author, CreateAuthorInput, UpdateAuthorInput};
use anyhow::Context;
use std::sync::Arc;

const MAX_NAME_LEN: usize = 100;
const MAX_BIO_LEN: usize = 500;

/// Error types for author service operations
#[derive(Debug, thiserror::Error)]
pub enum AuthorServiceError {
    /// Author not found
    #[error("Author not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate email
    #[error("Author email already exists: {0}")]
    DuplicateEmail(String),

    /// Author still referenced by posts
    #[error("Author is in use: {0}")]
    InUse(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Author service
pub struct AuthorService {
    repo: Arc<dyn AuthorRepository>,
    post_repo: Arc<dyn PostRepository>,
}

impl AuthorService {
    /// Create a new author service
    pub fn new(repo: Arc<dyn AuthorRepository>, post_repo: Arc<dyn PostRepository>) -> Self {
        Self { repo, post_repo }
    }

    /// List all authors with post counts
    pub async fn list(&self) -> Result<Vec<Author>, AuthorServiceError> {
        let authors = self.repo.list().await.context("Failed to list authors")?;
        Ok(authors)
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Author>, AuthorServiceError> {
        let author = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get author")?;
        Ok(author)
    }

    /// Create a new author
    pub async fn create(&self, input: CreateAuthorInput) -> Result<Author, AuthorServiceError> {
        validate_name(&input.name)?;
        validate_email(&input.email)?;
        validate_bio(input.bio.as_deref())?;

        if self
            .repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(AuthorServiceError::DuplicateEmail(input.email));
        }

        let author = self
            .repo
            .create(&input)
            .await
            .context("Failed to create author")?;
        Ok(author)
    }

    /// Update an author
    pub async fn update(
        &self,
        id: i64,
        input: UpdateAuthorInput,
    ) -> Result<Author, AuthorServiceError> {
        if self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get author")?
            .is_none()
        {
            return Err(AuthorServiceError::NotFound(id.to_string()));
        }

        if let Some(name) = &input.name {
            validate_name(name)?;
        }
        validate_bio(input.bio.as_deref())?;
        if let Some(email) = &input.email {
            validate_email(email)?;
            if self
                .repo
                .exists_by_email_excluding(email, id)
                .await
                .context("Failed to check email")?
            {
                return Err(AuthorServiceError::DuplicateEmail(email.clone()));
            }
        }

        let author = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update author")?;
        Ok(author)
    }

    /// Delete an author, refused while posts still reference them
    pub async fn delete(&self, id: i64) -> Result<(), AuthorServiceError> {
        let author = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get author")?
            .ok_or_else(|| AuthorServiceError::NotFound(id.to_string()))?;

        let posts = self
            .post_repo
            .count_by_author(id)
            .await
            .context("Failed to count posts by author")?;
        if posts > 0 {
            return Err(AuthorServiceError::InUse(format!(
                "Author '{}' has {} post(s)",
                author.name, posts
            )));
        }

        self.repo
            .delete(id)
            .await
            .context("Failed to delete author")?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), AuthorServiceError> {
    if name.trim().is_empty() {
        return Err(AuthorServiceError::ValidationError(
            "Name is required".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AuthorServiceError::ValidationError(format!(
            "Name is too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AuthorServiceError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AuthorServiceError::ValidationError(
            "A valid email address is required".to_string(),
        ));
    }
    Ok(())
}

fn validate_bio(bio: Option<&str>) -> Result<(), AuthorServiceError> {
    if let Some(bio) = bio {
        if bio.chars().count() > MAX_BIO_LEN {
            return Err(AuthorServiceError::ValidationError(format!(
                "Bio is too long (max {} characters)",
                MAX_BIO_LEN
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxAuthorRepository, SqlxPostRepository};
    use crate::db::{create_test_pool, migrations, DbPool};

    async fn setup_service() -> (DbPool, AuthorService) {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");

        let service = AuthorService::new(
            SqlxAuthorRepository::boxed(pool.clone()),
            SqlxPostRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    fn input(email: &str) -> CreateAuthorInput {
        CreateAuthorInput {
            name: "Sarah Johnson".to_string(),
            email: email.to_string(),
            avatar: None,
            bio: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_duplicate_email() {
        let (_pool, service) = setup_service().await;

        service.create(input("sarah@example.com")).await.expect("create");
        let result = service.create(input("sarah@example.com")).await;
        assert!(matches!(result, Err(AuthorServiceError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_overlong_bio() {
        let (_pool, service) = setup_service().await;

        let mut bad = input("long@example.com");
        bad.bio = Some("x".repeat(MAX_BIO_LEN + 1));
        let result = service.create(bad).await;
        assert!(matches!(
            result,
            Err(AuthorServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_referenced_author_conflicts() {
        let (pool, service) = setup_service().await;

        let author = service.create(input("sarah@example.com")).await.expect("create");

        sqlx::query("INSERT INTO categories (slug, name) VALUES ('seo', 'SEO')")
            .execute(&pool)
            .await
            .expect("category");
        sqlx::query(
            "INSERT INTO posts (slug, title, excerpt, content, cover_image, read_time, author_id, category_id) VALUES ('p', 'P', 'E', 'C', 'I', '1 min read', ?, 1)",
        )
        .bind(author.id)
        .execute(&pool)
        .await
        .expect("post");

        let result = service.delete(author.id).await;
        assert!(matches!(result, Err(AuthorServiceError::InUse(_))));
        assert!(service.get_by_id(author.id).await.expect("get").is_some());
    }

    #[tokio::test]
    async fn test_delete_unreferenced_author() {
        let (_pool, service) = setup_service().await;

        let author = service.create(input("solo@example.com")).await.expect("create");
        service.delete(author.id).await.expect("delete");
        assert!(service.get_by_id(author.id).await.expect("get").is_none());
    }
}
