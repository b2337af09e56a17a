//! Blog post API endpoints
//!
//! Handles HTTP requests for blog posts:
//! - GET /api/blog - List posts with filtering and pagination
//! - GET /api/blog/{slug} - Get a post by slug
//! - POST /api/blog - Create a post
//! - PUT /api/blog/{slug} - Update a post
//! - DELETE /api/blog/{slug} - Delete a post
//!
//! Reads run under the caller's visibility: anonymous requests only ever
//! observe published posts, authenticated console requests see drafts too.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin, MaybeAdmin};
use crate::models::{Author, Category, CreatePostInput, Post, Tag, UpdatePostInput, Visibility};
use crate::services::post::{PostQuery, PostServiceError};

/// Query parameters for listing posts
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Category slug
    pub category: Option<String>,
    /// Case-insensitive substring search over title and excerpt
    pub search: Option<String>,
    /// Featured flag
    pub featured: Option<bool>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// Pagination envelope reported alongside every list
#[derive(Debug, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

/// Response for a post list
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub pagination: Pagination,
}

/// Response for a single post
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: String,
    pub featured: bool,
    pub published: bool,
    pub published_at: Option<String>,
    pub read_time: String,
    pub views: i64,
    pub author_id: i64,
    pub category_id: i64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryInfo>,
    #[serde(default)]
    pub tags: Vec<TagInfo>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthorInfo {
    pub id: i64,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CategoryInfo {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TagInfo {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            excerpt: post.excerpt,
            content: post.content,
            cover_image: post.cover_image,
            featured: post.featured,
            published: post.published,
            published_at: post.published_at.map(|dt| dt.to_rfc3339()),
            read_time: post.read_time,
            views: post.views,
            author_id: post.author_id,
            category_id: post.category_id,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
            author: None,
            category: None,
            tags: Vec::new(),
        }
    }
}

impl PostResponse {
    fn with_author(mut self, author: Option<Author>) -> Self {
        self.author = author.map(|a| AuthorInfo {
            id: a.id,
            name: a.name,
            avatar: a.avatar,
            bio: a.bio,
        });
        self
    }

    fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category.map(|c| CategoryInfo {
            id: c.id,
            slug: c.slug,
            name: c.name,
        });
        self
    }

    fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags
            .into_iter()
            .map(|t| TagInfo {
                id: t.id,
                slug: t.slug,
                name: t.name,
            })
            .collect();
        self
    }
}

impl From<PostServiceError> for ApiError {
    fn from(e: PostServiceError) -> Self {
        match e {
            PostServiceError::NotFound(slug) => {
                ApiError::not_found(format!("Post not found: {}", slug))
            }
            PostServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            PostServiceError::DuplicateSlug(slug) => ApiError::with_details(
                "CONFLICT",
                format!("Post slug already exists: {}", slug),
                serde_json::json!({ "field": "slug", "value": slug }),
            ),
            PostServiceError::InternalError(e) => ApiError::internal_error(e),
        }
    }
}

/// Build the public post routes (optional auth widens visibility)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/{slug}", get(get_post))
}

/// Build the protected post routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_post))
        .route("/{slug}", put(update_post))
        .route("/{slug}", delete(delete_post))
}

/// GET /api/blog - List posts with filtering and pagination
async fn list_posts(
    State(state): State<AppState>,
    caller: MaybeAdmin,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let visibility = Visibility::from_admin(caller.is_admin());
    let post_query = PostQuery {
        page: query.page,
        limit: query.limit,
        category: query.category,
        search: query.search,
        featured: query.featured,
    };

    let result = state.posts.list(&post_query, visibility).await?;

    let pagination = Pagination {
        page: result.page,
        limit: result.limit,
        total: result.total,
        total_pages: result.total_pages(),
    };

    let mut posts = Vec::with_capacity(result.len());
    for post in result.items {
        posts.push(expand(&state, post).await?);
    }

    Ok(Json(PostListResponse { posts, pagination }))
}

/// GET /api/blog/{slug} - Get a post by slug
///
/// Unpublished posts answer 404 to anonymous callers; a successful fetch
/// bumps the view counter in the background.
async fn get_post(
    State(state): State<AppState>,
    caller: MaybeAdmin,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let visibility = Visibility::from_admin(caller.is_admin());

    let post = state
        .posts
        .get_by_slug(&slug, visibility)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post not found: {}", slug)))?;

    let post = expand(&state, post).await?;
    Ok(Json(serde_json::json!({ "post": post })))
}

/// POST /api/blog - Create a post
async fn create_post(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<CreatePostInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let post = state.posts.create(body).await?;
    let post = expand(&state, post).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "post": post })),
    ))
}

/// PUT /api/blog/{slug} - Update a post
async fn update_post(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
    Json(body): Json<UpdatePostInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let post = state.posts.update_by_slug(&slug, body).await?;
    let post = expand(&state, post).await?;
    Ok(Json(serde_json::json!({ "post": post })))
}

/// DELETE /api/blog/{slug} - Delete a post
async fn delete_post(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.posts.delete_by_slug(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Attach author, category, and tag info to a post response
async fn expand(state: &AppState, post: Post) -> Result<PostResponse, ApiError> {
    let author = state
        .authors
        .get_by_id(post.author_id)
        .await
        .map_err(|e| ApiError::internal_error(e))?;
    let category = state
        .categories
        .get_by_id(post.category_id)
        .await
        .map_err(|e| ApiError::internal_error(e))?;
    let tags = state.posts.tags_for(post.id).await?;

    let response: PostResponse = post.into();
    Ok(response
        .with_author(author)
        .with_category(category)
        .with_tags(tags))
}
