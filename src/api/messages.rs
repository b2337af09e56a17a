//! Contact message API endpoints
//!
//! - POST /api/contact - Submit a message (public)
//! - GET /api/contact - List messages with status filter and pagination
//! - GET /api/contact/{id} - Get a single message
//! - PUT /api/contact/{id} - Update status and notes
//! - DELETE /api/contact/{id} - Delete a message

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin};
use crate::api::posts::Pagination;
use crate::models::{
    ContactMessage, CreateMessageInput, ListParams, MessageStatus, UpdateMessageInput,
};
use crate::services::message::MessageServiceError;

impl From<MessageServiceError> for ApiError {
    fn from(e: MessageServiceError) -> Self {
        match e {
            MessageServiceError::NotFound(id) => {
                ApiError::not_found(format!("Message not found: {}", id))
            }
            MessageServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            MessageServiceError::InternalError(e) => ApiError::internal_error(e),
        }
    }
}

/// Query parameters for listing messages
#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Triage status filter, e.g. UNREAD
    pub status: Option<MessageStatus>,
}

fn default_page() -> u32 {
    1
}

// Console inbox pages are larger than blog pages
fn default_limit() -> u32 {
    20
}

/// Build the public contact routes
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", post(submit_message))
}

/// Build the protected contact routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_messages))
        .route("/{id}", get(get_message))
        .route("/{id}", put(update_message))
        .route("/{id}", delete(delete_message))
}

/// POST /api/contact - Submit a contact form message
async fn submit_message(
    State(state): State<AppState>,
    Json(body): Json<CreateMessageInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let message = state.messages.submit(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Message sent successfully",
            "id": message.id,
        })),
    ))
}

/// GET /api/contact - List messages for the console inbox
async fn list_messages(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let params = ListParams::new(query.page, query.limit);
    let result = state.messages.list(query.status, &params).await?;

    let pagination = Pagination {
        page: result.page,
        limit: result.limit,
        total: result.total,
        total_pages: result.total_pages(),
    };

    Ok(Json(serde_json::json!({
        "messages": result.items,
        "pagination": pagination,
    })))
}

/// GET /api/contact/{id} - Get a single message
async fn get_message(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<Json<ContactMessage>, ApiError> {
    let message = state
        .messages
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Message not found: {}", id)))?;
    Ok(Json(message))
}

/// PUT /api/contact/{id} - Update status and notes
async fn update_message(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateMessageInput>,
) -> Result<Json<ContactMessage>, ApiError> {
    let message = state.messages.update(id, body).await?;
    Ok(Json(message))
}

/// DELETE /api/contact/{id} - Delete a message
async fn delete_message(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.messages.delete(id).await?;
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
    async fn test_public_submit_admin_triage() {
        let server = test_server().await;

        // Anyone can submit
        let response = server
            .post("/api/contact")
            .json(&json!({
                "name": "Alice",
                "email": "alice@example.com",
                "message": "We need a rebrand",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let id = response.json::<Value>()["id"].as_i64().unwrap();

        // The inbox is not public
        server.get("/api/contact").await.assert_status_unauthorized();

        // The console reads and triages
        let token = admin_token(&server).await;
        let response = server
            .get("/api/contact")
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["status"], "UNREAD");
        assert_eq!(body["pagination"]["total"], 1);

        let response = server
            .put(&format!("/api/contact/{}", id))
            .authorization_bearer(&token)
            .json(&json!({ "status": "REPLIED", "notes": "Quoted $10k" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "REPLIED");
        assert_eq!(body["notes"], "Quoted $10k");

        // Status filter
        let response = server
            .get("/api/contact")
            .authorization_bearer(&token)
            .add_query_param("status", "UNREAD")
            .await;
        let body: Value = response.json();
        assert_eq!(body["messages"].as_array().unwrap().len(), 0);

        // Delete
        let response = server
            .delete(&format!("/api/contact/{}", id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_submit_invalid_message_is_400() {
        let server = test_server().await;

        let response = server
            .post("/api/contact")
            .json(&json!({
                "name": "",
                "email": "not-an-email",
                "message": "",
            }))
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_get_missing_message_is_404() {
        let server = test_server().await;
        let token = admin_token(&server).await;

        let response = server
            .get("/api/contact/999")
            .authorization_bearer(&token)
            .await;
        response.assert_status_not_found();
    }
}
