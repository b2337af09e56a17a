//! Post service
//!
//! Implements business logic for blog posts:
//! - List queries combining caller visibility with category / search /
//!   featured filters and pagination
//! - Single-post reads that hide drafts from anonymous callers and bump the
//!   view counter without blocking the response
//! - Create / update / delete with validation and duplicate-slug conflicts
//!
//! Concurrent edits to the same post are last-write-wins; the repository
//! applies whole-row updates with no version check.

use crate::db::repositories::{PostRepository, TagRepository};
use crate::models::{
    CreatePostInput, ListParams, PagedResult, Post, PostFilter, Tag, UpdatePostInput, Visibility,
};
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

const MAX_TITLE_LEN: usize = 200;
const MAX_EXCERPT_LEN: usize = 500;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate slug
    #[error("Post slug already exists: {0}")]
    DuplicateSlug(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Query parameters for post listings, before visibility is applied
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub page: u32,
    pub limit: u32,
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
}

impl PostQuery {
    fn params(&self) -> ListParams {
        ListParams::new(
            if self.page == 0 { 1 } else { self.page },
            if self.limit == 0 { 10 } else { self.limit },
        )
    }

    fn filter(&self, visibility: Visibility) -> PostFilter {
        PostFilter {
            visibility,
            category: self.category.clone(),
            search: self.search.clone(),
            featured: self.featured,
        }
    }
}

/// Post service for managing blog posts
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    tag_repo: Arc<dyn TagRepository>,
}

impl PostService {
    /// Create a new post service
    pub fn new(repo: Arc<dyn PostRepository>, tag_repo: Arc<dyn TagRepository>) -> Self {
        Self { repo, tag_repo }
    }

    /// List posts for the given caller visibility.
    ///
    /// Anonymous callers only ever receive published posts regardless of the
    /// other query parameters; the count in the returned envelope is taken
    /// under the same predicate as the page itself.
    pub async fn list(
        &self,
        query: &PostQuery,
        visibility: Visibility,
    ) -> Result<PagedResult<Post>, PostServiceError> {
        let params = query.params();
        let filter = query.filter(visibility);

        let items = self
            .repo
            .list(&filter, params.offset(), params.take())
            .await
            .context("Failed to list posts")?;
        let total = self
            .repo
            .count(&filter)
            .await
            .context("Failed to count posts")?;

        Ok(PagedResult::new(items, total, &params))
    }

    /// Get a single post by slug.
    ///
    /// Unpublished posts are reported as absent to anonymous callers so their
    /// existence never leaks. Every successful fetch dispatches a detached
    /// view-count increment; a failed increment is logged and never affects
    /// the read.
    pub async fn get_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<Post>, PostServiceError> {
        let post = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post by slug")?;

        let post = match post {
            Some(post) if post.published || visibility.includes_drafts() => post,
            _ => return Ok(None),
        };

        // Best-effort counter: the response does not wait for the write and
        // concurrent fetches may undercount
        let repo = self.repo.clone();
        let post_id = post.id;
        tokio::spawn(async move {
            if let Err(e) = repo.increment_views(post_id).await {
                tracing::warn!("Failed to increment view count for post {}: {}", post_id, e);
            }
        });

        Ok(Some(post))
    }

    /// Get a single post by ID, regardless of publish state
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>, PostServiceError> {
        let post = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get post by ID")?;
        Ok(post)
    }

    /// Tags attached to a post
    pub async fn tags_for(&self, post_id: i64) -> Result<Vec<Tag>, PostServiceError> {
        let tags = self
            .tag_repo
            .get_by_post_id(post_id)
            .await
            .context("Failed to get post tags")?;
        Ok(tags)
    }

    /// Create a new post
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostServiceError> {
        self.validate_create(&input)?;

        if self
            .repo
            .exists_by_slug(&input.slug)
            .await
            .context("Failed to check slug")?
        {
            return Err(PostServiceError::DuplicateSlug(input.slug));
        }

        let post = self
            .repo
            .create(&input)
            .await
            .context("Failed to create post")?;

        Ok(post)
    }

    /// Update a post found by its slug
    pub async fn update_by_slug(
        &self,
        slug: &str,
        input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        let existing = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post by slug")?
            .ok_or_else(|| PostServiceError::NotFound(slug.to_string()))?;

        self.validate_update(&input)?;

        if let Some(new_slug) = &input.slug {
            if self
                .repo
                .exists_by_slug_excluding(new_slug, existing.id)
                .await
                .context("Failed to check slug")?
            {
                return Err(PostServiceError::DuplicateSlug(new_slug.clone()));
            }
        }

        let post = self
            .repo
            .update(existing.id, &input)
            .await
            .context("Failed to update post")?;

        Ok(post)
    }

    /// Delete a post found by its slug
    pub async fn delete_by_slug(&self, slug: &str) -> Result<(), PostServiceError> {
        let existing = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post by slug")?
            .ok_or_else(|| PostServiceError::NotFound(slug.to_string()))?;

        self.repo
            .delete(existing.id)
            .await
            .context("Failed to delete post")?;

        Ok(())
    }

    fn validate_create(&self, input: &CreatePostInput) -> Result<(), PostServiceError> {
        validate_slug(&input.slug)?;
        validate_title(&input.title)?;
        validate_excerpt(&input.excerpt)?;
        if input.content.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Content is required".to_string(),
            ));
        }
        if input.cover_image.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Cover image is required".to_string(),
            ));
        }
        if input.read_time.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Read time is required".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_update(&self, input: &UpdatePostInput) -> Result<(), PostServiceError> {
        if let Some(slug) = &input.slug {
            validate_slug(slug)?;
        }
        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        if let Some(excerpt) = &input.excerpt {
            validate_excerpt(excerpt)?;
        }
        if let Some(content) = &input.content {
            if content.trim().is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Content cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn validate_slug(slug: &str) -> Result<(), PostServiceError> {
    if !SLUG_RE.is_match(slug) {
        return Err(PostServiceError::ValidationError(format!(
            "Slug must be lowercase letters, digits, and hyphens: {}",
            slug
        )));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), PostServiceError> {
    if title.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Title is required".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(PostServiceError::ValidationError(format!(
            "Title is too long (max {} characters)",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

fn validate_excerpt(excerpt: &str) -> Result<(), PostServiceError> {
    if excerpt.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Excerpt is required".to_string(),
        ));
    }
    if excerpt.chars().count() > MAX_EXCERPT_LEN {
        return Err(PostServiceError::ValidationError(format!(
            "Excerpt is too long (max {} characters)",
            MAX_EXCERPT_LEN
        )));
    }
    Ok(())
}
