//! Tag API endpoints
//!
//! - GET /api/blog/tags - List tags with post counts (public)
//! - POST /api/blog/tags - Create tag
//! - PUT /api/blog/tags/{id} - Update tag
//! - DELETE /api/blog/tags/{id} - Delete tag (409 while attached to posts)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin};
use crate::models::{CreateTagInput, Tag, UpdateTagInput};
use crate::services::tag::TagServiceError;

impl From<TagServiceError> for ApiError {
    fn from(e: TagServiceError) -> Self {
        match e {
            TagServiceError::NotFound(id) => ApiError::not_found(format!("Tag not found: {}", id)),
            TagServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            TagServiceError::DuplicateSlug(slug) => ApiError::with_details(
                "CONFLICT",
                format!("Tag slug already exists: {}", slug),
                serde_json::json!({ "field": "slug", "value": slug }),
            ),
            TagServiceError::InUse(msg) => ApiError::conflict(msg),
            TagServiceError::InternalError(e) => ApiError::internal_error(e),
        }
    }
}

/// Build the public tag routes
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_tags))
}

/// Build the protected tag routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_tag))
        .route("/{id}", put(update_tag))
        .route("/{id}", delete(delete_tag))
}

/// GET /api/blog/tags - List all tags
async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = state.tags.list().await?;
    Ok(Json(tags))
}

/// POST /api/blog/tags - Create a tag
async fn create_tag(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<CreateTagInput>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let tag = state.tags.create(body).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// PUT /api/blog/tags/{id} - Update a tag
async fn update_tag(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTagInput>,
) -> Result<Json<Tag>, ApiError> {
    let tag = state.tags.update(id, body).await?;
    Ok(Json(tag))
}

/// DELETE /api/blog/tags/{id} - Delete a tag
async fn delete_tag(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.tags.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::db::{create_test_pool, migrations, seed};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    async fn test_server() -> TestServer {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        seed::run_seed(&pool).await.expect("seed");

        let config = crate::config::Config::default();
        let state = api::build_state(pool, &config);
        TestServer::new(api::build_router(state, &config.server.cors_origin))
            .expect("test server")
    }

    async fn admin_token(server: &TestServer) -> String {
        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "admin@example.com", "password": "admin123" }))
            .await;
        response.json::<Value>()["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let server = test_server().await;
        let token = admin_token(&server).await;

        let response = server
            .post("/api/blog/tags")
            .authorization_bearer(&token)
            .json(&json!({ "name": "Growth", "slug": "growth" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let id = response.json::<Value>()["id"].as_i64().unwrap();

        let response = server.get("/api/blog/tags").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["post_count"], 0);

        let response = server
            .put(&format!("/api/blog/tags/{}", id))
            .authorization_bearer(&token)
            .json(&json!({ "name": "Growth Hacking" }))
            .await;
        response.assert_status_ok();

        let response = server
            .delete(&format!("/api/blog/tags/{}", id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_invalid_slug_is_400() {
        let server = test_server().await;
        let token = admin_token(&server).await;

        let response = server
            .post("/api/blog/tags")
            .authorization_bearer(&token)
            .json(&json!({ "name": "Bad", "slug": "Bad Slug!" }))
            .await;
        response.assert_status_bad_request();
    }
}
