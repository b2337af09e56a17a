//! Category API endpoints
//!
//! - GET /api/blog/categories - List categories with post counts (public)
//! - POST /api/blog/categories - Create category
//! - PUT /api/blog/categories/{id} - Update category
//! - DELETE /api/blog/categories/{id} - Delete category (409 while posts
//!   still reference it)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin};
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use crate::services::category::CategoryServiceError;

impl From<CategoryServiceError> for ApiError {
    fn from(e: CategoryServiceError) -> Self {
        match e {
            CategoryServiceError::NotFound(id) => {
                ApiError::not_found(format!("Category not found: {}", id))
            }
            CategoryServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            CategoryServiceError::DuplicateSlug(slug) => ApiError::with_details(
                "CONFLICT",
                format!("Category slug already exists: {}", slug),
                serde_json::json!({ "field": "slug", "value": slug }),
            ),
            CategoryServiceError::InUse(msg) => ApiError::conflict(msg),
            CategoryServiceError::InternalError(e) => ApiError::internal_error(e),
        }
    }
}

/// Build the public category routes
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_categories))
}

/// Build the protected category routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_category))
        .route("/{id}", put(update_category))
        .route("/{id}", delete(delete_category))
}

/// GET /api/blog/categories - List all categories
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.categories.list().await?;
    Ok(Json(categories))
}

/// POST /api/blog/categories - Create a category
async fn create_category(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<CreateCategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.categories.create(body).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/blog/categories/{id} - Update a category
async fn update_category(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCategoryInput>,
) -> Result<Json<Category>, ApiError> {
    let category = state.categories.update(id, body).await?;
    Ok(Json(category))
}

/// DELETE /api/blog/categories/{id} - Delete a category
async fn delete_category(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::db::{create_test_pool, migrations, seed, DbPool};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    async fn test_server() -> (TestServer, DbPool) {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        seed::run_seed(&pool).await.expect("seed");

        let config = crate::config::Config::default();
        let state = api::build_state(pool.clone(), &config);
        let server = TestServer::new(api::build_router(state, &config.server.cors_origin))
            .expect("test server");
        (server, pool)
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
    async fn test_list_is_public_mutation_is_not() {
        let (server, _pool) = test_server().await;

        server.get("/api/blog/categories").await.assert_status_ok();

        let response = server
            .post("/api/blog/categories")
            .json(&json!({ "name": "SEO", "slug": "seo" }))
            .await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let (server, _pool) = test_server().await;
        let token = admin_token(&server).await;

        let response = server
            .post("/api/blog/categories")
            .authorization_bearer(&token)
            .json(&json!({ "name": "SEO", "slug": "seo" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let id = response.json::<Value>()["id"].as_i64().unwrap();

        let response = server
            .put(&format!("/api/blog/categories/{}", id))
            .authorization_bearer(&token)
            .json(&json!({ "description": "Search engine optimization" }))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>()["description"],
            "Search engine optimization"
        );

        let response = server
            .delete(&format!("/api/blog/categories/{}", id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_delete_referenced_category_is_409() {
        let (server, pool) = test_server().await;
        let token = admin_token(&server).await;

        let response = server
            .post("/api/blog/categories")
            .authorization_bearer(&token)
            .json(&json!({ "name": "SEO", "slug": "seo" }))
            .await;
        let id = response.json::<Value>()["id"].as_i64().unwrap();

        sqlx::query("INSERT INTO authors (name, email) VALUES ('A', 'a@example.com')")
            .execute(&pool)
            .await
            .expect("author");
        sqlx::query(
            "INSERT INTO posts (slug, title, excerpt, content, cover_image, read_time, author_id, category_id) VALUES ('p', 'P', 'E', 'C', 'I', '1 min read', 1, ?)",
        )
        .bind(id)
        .execute(&pool)
        .await
        .expect("post");

        let response = server
            .delete(&format!("/api/blog/categories/{}", id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_409() {
        let (server, _pool) = test_server().await;
        let token = admin_token(&server).await;

        server
            .post("/api/blog/categories")
            .authorization_bearer(&token)
            .json(&json!({ "name": "SEO", "slug": "seo" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/blog/categories")
            .authorization_bearer(&token)
            .json(&json!({ "name": "Other", "slug": "seo" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }
}
