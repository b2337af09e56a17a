//! API middleware
//!
//! Contains the request-level access gate:
//! - Token extraction from the `Authorization` header or the auth cookie
//! - `require_auth` / `optional_auth` for the JSON API
//! - `admin_page_gate` for browser navigation to the console, which
//!   redirects to the login page instead of answering 401
//! - The declarative role policy consulted by handlers that need more than
//!   authentication
//!
//! A request moves through exactly one gate decision: allow, redirect, or
//! reject. Denials never run handler logic and are final for that request.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::DbPool;
use crate::models::AdminRole;
use crate::services::{
    AccountService, AuthorService, CategoryService, Claims, MessageService, PostService,
    SectionService, TagService, TokenService,
};

/// Path of the console login page; always reachable so the redirect on
/// denial cannot loop
pub const LOGIN_PAGE: &str = "/admin/login";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub auth_config: Arc<AuthConfig>,
    pub tokens: Arc<TokenService>,
    pub accounts: Arc<AccountService>,
    pub posts: Arc<PostService>,
    pub categories: Arc<CategoryService>,
    pub tags: Arc<TagService>,
    pub authors: Arc<AuthorService>,
    pub messages: Arc<MessageService>,
    pub sections: Arc<SectionService>,
}

/// Authenticated admin identity extracted from a verified token
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin(pub Claims);

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedAdmin>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Possibly-authenticated caller for public content routes.
///
/// Resolves to the claims attached by [`optional_auth`], or `None` for an
/// anonymous request; never rejects.
#[derive(Debug, Clone)]
pub struct MaybeAdmin(pub Option<Claims>);

impl MaybeAdmin {
    /// Whether the caller may see unpublished content
    pub fn is_admin(&self) -> bool {
        self.0.is_some()
    }
}

impl<S> axum::extract::FromRequestParts<S> for MaybeAdmin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAdmin(
            parts
                .extensions
                .get::<AuthenticatedAdmin>()
                .map(|admin| admin.0.clone()),
        ))
    }
}

// ============================================================================
// Error envelope
// ============================================================================

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    /// Internal error: the detail is logged server-side, the client only
    /// sees a generic message
    pub fn internal_error(detail: impl std::fmt::Display) -> Self {
        tracing::error!("Internal error: {}", detail);
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

// ============================================================================
// Role policy
// ============================================================================

/// An operation that needs more than bare authentication
#[derive(Debug, Clone, Copy)]
pub struct RoutePolicy {
    /// Operation key checked by the owning handler
    pub operation: &'static str,
    /// Minimum role required
    pub required: AdminRole,
}

/// Every role-gated operation in one place. Handlers call
/// [`authorize`] with their operation key instead of comparing roles
/// inline.
pub const ROUTE_POLICIES: &[RoutePolicy] = &[RoutePolicy {
    operation: "auth.register",
    required: AdminRole::SuperAdmin,
}];

fn role_rank(role: AdminRole) -> u8 {
    match role {
        AdminRole::Editor => 0,
        AdminRole::SuperAdmin => 1,
    }
}

/// Minimum role required for an operation, if any
pub fn required_role(operation: &str) -> Option<AdminRole> {
    ROUTE_POLICIES
        .iter()
        .find(|p| p.operation == operation)
        .map(|p| p.required)
}

/// Check the caller's role against the policy table.
///
/// Operations absent from the table only require authentication.
pub fn authorize(claims: &Claims, operation: &str) -> Result<(), ApiError> {
    match required_role(operation) {
        Some(required) if role_rank(claims.role) < role_rank(required) => Err(ApiError::forbidden(
            format!("{} role required", required),
        )),
        _ => Ok(()),
    }
}

// ============================================================================
// Token extraction and cookies
// ============================================================================

/// Extract a session token from the `Authorization` header (preferred) or
/// the auth cookie
pub fn extract_token(headers: &axum::http::HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Some(token) = TokenService::extract_bearer(auth_header.to_str().ok()) {
            return Some(token.to_string());
        }
    }

    let prefix = format!("{}=", cookie_name);
    if let Some(cookie_header) = headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                if let Some(token) = cookie.trim().strip_prefix(&prefix) {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Build the Set-Cookie value that stores a session token
pub fn auth_cookie(cookie_name: &str, token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cookie_name, token, max_age_secs
    )
}

/// Build the Set-Cookie value that expires the auth cookie
pub fn clear_auth_cookie(cookie_name: &str) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        cookie_name
    )
}

// ============================================================================
// Gate middleware
// ============================================================================

/// Authentication middleware for the JSON API.
///
/// Missing or unverifiable tokens answer 401 without running the handler;
/// valid tokens attach the decoded claims for downstream authorization.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers(), &state.auth_config.cookie_name)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let claims = state
        .tokens
        .verify(&token)
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    request.extensions_mut().insert(AuthenticatedAdmin(claims));
    Ok(next.run(request).await)
}

/// Optional authentication middleware for public content routes.
///
/// Attaches claims when a valid token is present and proceeds anonymously
/// otherwise; never rejects. Content handlers derive their visibility from
/// whether claims are attached.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(request.headers(), &state.auth_config.cookie_name) {
        if let Some(claims) = state.tokens.verify(&token) {
            request.extensions_mut().insert(AuthenticatedAdmin(claims));
        }
    }
    next.run(request).await
}

/// Browser gate for the `/admin` console pages.
///
/// The login page passes unconditionally so the redirect cannot loop. A
/// missing token redirects to the login page; an unverifiable token also
/// expires the stale cookie on the way out.
pub async fn admin_page_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == LOGIN_PAGE {
        return next.run(request).await;
    }

    let cookie_name = &state.auth_config.cookie_name;
    let token = match extract_token(request.headers(), cookie_name) {
        Some(token) => token,
        None => return redirect_to_login(None),
    };

    match state.tokens.verify(&token) {
        Some(claims) => {
            request.extensions_mut().insert(AuthenticatedAdmin(claims));
            next.run(request).await
        }
        None => redirect_to_login(Some(clear_auth_cookie(cookie_name))),
    }
}

fn redirect_to_login(set_cookie: Option<String>) -> Response {
    let mut builder = Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(header::LOCATION, LOGIN_PAGE);
    if let Some(cookie) = set_cookie {
        builder = builder.header(header::SET_COOKIE, cookie);
    }
    builder
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

// ============================================================================
// Tests
// ============================================================================
