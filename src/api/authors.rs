//! Author API endpoints
//!
//! - GET /api/blog/authors - List authors with post counts (public)
//! - POST /api/blog/authors - Create author
//! - PUT /api/blog/authors/{id} - Update author
//! - DELETE /api/blog/authors/{id} - Delete author (409 while posts still
//!   reference them)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin};
use crate::models::{Author, CreateAuthorInput, UpdateAuthorInput};
use crate::services::author::AuthorServiceError;

impl From<AuthorServiceError> for ApiError {
    fn from(e: AuthorServiceError) -> Self {
        match e {
            AuthorServiceError::NotFound(id) => {
                ApiError::not_found(format!("Author not found: {}", id))
            }
            AuthorServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            AuthorServiceError::DuplicateEmail(email) => ApiError::with_details(
                "CONFLICT",
                format!("Author email already exists: {}", email),
                serde_json::json!({ "field": "email", "value": email }),
            ),
            AuthorServiceError::InUse(msg) => ApiError::conflict(msg),
            AuthorServiceError::InternalError(e) => ApiError::internal_error(e),
        }
    }
}

/// Build the public author routes
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_authors))
}

/// Build the protected author routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_author))
        .route("/{id}", put(update_author))
        .route("/{id}", delete(delete_author))
}

/// GET /api/blog/authors - List all authors
async fn list_authors(State(state): State<AppState>) -> Result<Json<Vec<Author>>, ApiError> {
    let authors = state.authors.list().await?;
    Ok(Json(authors))
}

/// POST /api/blog/authors - Create an author
async fn create_author(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<CreateAuthorInput>,
) -> Result<(StatusCode, Json<Author>), ApiError> {
    let author = state.authors.create(body).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// PUT /api/blog/authors/{id} - Update an author
async fn update_author(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateAuthorInput>,
) -> Result<Json<Author>, ApiError> {
    let author = state.authors.update(id, body).await?;
    Ok(Json(author))
}

/// DELETE /api/blog/authors/{id} - Delete an author
async fn delete_author(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.authors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
