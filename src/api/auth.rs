//! Authentication API endpoints
//!
//! Handles HTTP requests for console authentication:
//! - POST /api/auth/login - Exchange credentials for a session token
//! - GET /api/auth/verify - Validate a token and return its identity
//! - POST /api/auth/register - Create an account (super admins only)
//! - POST /api/auth/logout - Clear the auth cookie (tokens are stateless;
//!   the server keeps no session to destroy)

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{
    auth_cookie, authorize, clear_auth_cookie, ApiError, AppState, AuthenticatedAdmin,
};
use crate::models::{AdminAccount, AdminRole, CreateAccountInput};
use crate::services::account::AccountServiceError;

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    /// Defaults to EDITOR when absent
    #[serde(default)]
    pub role: Option<AdminRole>,
}

/// Response for successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AccountResponse,
}

/// Account info returned to clients; never includes the password hash
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
}

impl From<AdminAccount> for AccountResponse {
    fn from(account: AdminAccount) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            role: account.role.to_string(),
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

impl From<AccountServiceError> for ApiError {
    fn from(e: AccountServiceError) -> Self {
        match e {
            AccountServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
            AccountServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            AccountServiceError::WeakPassword(errors) => ApiError::with_details(
                "VALIDATION_ERROR",
                "Password validation failed",
                serde_json::json!({ "errors": errors }),
            ),
            AccountServiceError::AccountExists(msg) => ApiError::conflict(msg),
            AccountServiceError::InternalError(e) => ApiError::internal_error(e),
        }
    }
}

/// Build the public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Build the protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/verify", get(verify))
        .route("/register", post(register))
}

/// POST /api/auth/login - Exchange credentials for a session token
///
/// The token is returned in the body for API clients and set as an httpOnly
/// cookie for the browser console.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (account, token) = state.accounts.login(&body.email, &body.password).await?;

    let max_age = state.auth_config.token_ttl_hours * 60 * 60;
    let cookie = auth_cookie(&state.auth_config.cookie_name, &token, max_age);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::internal_error(format!("Invalid cookie value: {}", e)))?,
    );

    Ok((
        headers,
        Json(LoginResponse {
            token,
            user: account.into(),
        }),
    ))
}

/// GET /api/auth/verify - Return the identity carried by a valid token
///
/// The claims were already verified by the auth middleware; this endpoint
/// just echoes them back so clients can restore a session.
async fn verify(admin: AuthenticatedAdmin) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "user": {
            "id": admin.0.sub,
            "email": admin.0.email,
            "role": admin.0.role,
        }
    }))
}

/// POST /api/auth/register - Create a new admin account
///
/// Passing the gate proves authentication; the super-admin requirement is a
/// policy check on top of it.
async fn register(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&admin.0, "auth.register")?;

    let input = CreateAccountInput {
        email: body.email,
        name: body.name,
        password: body.password,
        role: body.role.unwrap_or_default(),
    };

    let account = state.accounts.register(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "user": AccountResponse::from(account) })),
    ))
}

/// POST /api/auth/logout - Clear the auth cookie
///
/// Stateless tokens cannot be revoked server-side; the client discards the
/// token and the cookie is expired.
async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&clear_auth_cookie(&state.auth_config.cookie_name)) {
        headers.insert(header::SET_COOKIE, value);
    }

    (
        headers,
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
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

    async fn login_token(server: &TestServer) -> String {
        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "admin@example.com", "password": "admin123" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["token"].as_str().expect("token in body").to_string()
    }

    #[tokio::test]
    async fn test_login_with_seeded_credentials() {
        let server = test_server().await;

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "admin@example.com", "password": "admin123" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(!body["token"].as_str().unwrap().is_empty());
        assert_eq!(body["user"]["email"], "admin@example.com");
        assert_eq!(body["user"]["role"], "SUPER_ADMIN");
        // The password hash never leaves the server
        assert!(body["user"].get("password_hash").is_none());

        let set_cookie = response
            .headers()
            .get("set-cookie")
            .expect("cookie set")
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("auth-token="));
        assert!(set_cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_401() {
        let server = test_server().await;

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "admin@example.com", "password": "wrong" }))
            .await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_verify_roundtrip_and_tamper() {
        let server = test_server().await;
        let token = login_token(&server).await;

        let response = server
            .get("/api/auth/verify")
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["user"]["email"], "admin@example.com");
        assert_eq!(body["user"]["role"], "SUPER_ADMIN");

        // Alter the last character of the token
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        let response = server
            .get("/api/auth/verify")
            .authorization_bearer(&tampered)
            .await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_verify_without_token_is_401() {
        let server = test_server().await;

        let response = server.get("/api/auth/verify").await;
        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_register_requires_super_admin() {
        let server = test_server().await;
        let token = login_token(&server).await;

        // Super admin creates an editor
        let response = server
            .post("/api/auth/register")
            .authorization_bearer(&token)
            .json(&json!({
                "email": "editor@example.com",
                "name": "Editor",
                "password": "Sup3rSecret",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["user"]["role"], "EDITOR");

        // The editor cannot register accounts
        let editor_login = server
            .post("/api/auth/login")
            .json(&json!({ "email": "editor@example.com", "password": "Sup3rSecret" }))
            .await;
        editor_login.assert_status_ok();
        let editor_token = editor_login.json::<Value>()["token"]
            .as_str()
            .unwrap()
            .to_string();

        let response = server
            .post("/api/auth/register")
            .authorization_bearer(&editor_token)
            .json(&json!({
                "email": "another@example.com",
                "name": "Another",
                "password": "Sup3rSecret",
            }))
            .await;
        response.assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_409() {
        let server = test_server().await;
        let token = login_token(&server).await;

        let response = server
            .post("/api/auth/register")
            .authorization_bearer(&token)
            .json(&json!({
                "email": "admin@example.com",
                "name": "Clone",
                "password": "Sup3rSecret",
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_weak_password_is_400_with_errors() {
        let server = test_server().await;
        let token = login_token(&server).await;

        let response = server
            .post("/api/auth/register")
            .authorization_bearer(&token)
            .json(&json!({
                "email": "weak@example.com",
                "name": "Weak",
                "password": "short",
            }))
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["details"]["errors"].as_array().unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_register_unauthenticated_is_401() {
        let server = test_server().await;

        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "email": "nobody@example.com",
                "name": "Nobody",
                "password": "Sup3rSecret",
            }))
            .await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let server = test_server().await;

        let response = server.post("/api/auth/logout").await;
        response.assert_status_ok();
        let set_cookie = response
            .headers()
            .get("set-cookie")
            .expect("cookie cleared")
            .to_str()
            .unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
