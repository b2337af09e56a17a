//! API layer - HTTP handlers and routing
//!
//! Routers are composed per access tier:
//! - public: auth login/logout, contact submit, marketing sections, health
//! - public content: blog reads under `optional_auth`, so the same routes
//!   widen to drafts for authenticated callers
//! - protected: everything that mutates, under `require_auth`
//! - console pages: `/admin` behind the browser gate that redirects to the
//!   login page instead of answering 401

pub mod auth;
pub mod authors;
pub mod categories;
pub mod messages;
pub mod middleware;
pub mod posts;
pub mod sections;
pub mod tags;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware as axum_middleware,
    response::Html,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::repositories::{
    SqlxAccountRepository, SqlxAuthorRepository, SqlxCategoryRepository, SqlxMessageRepository,
    SqlxPostRepository, SqlxSectionRepository, SqlxTagRepository,
};
use crate::db::DbPool;
use crate::services::{
    AccountService, AuthorService, CategoryService, MessageService, PostService, SectionService,
    TagService, TokenService,
};

pub use middleware::{ApiError, AppState, AuthenticatedAdmin, MaybeAdmin};

/// Wire repositories and services into the shared application state
pub fn build_state(pool: DbPool, config: &Config) -> AppState {
    let tokens = Arc::new(TokenService::new(&config.auth));

    let account_repo = SqlxAccountRepository::boxed(pool.clone());
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let author_repo = SqlxAuthorRepository::boxed(pool.clone());
    let message_repo = SqlxMessageRepository::boxed(pool.clone());
    let section_repo = SqlxSectionRepository::boxed(pool.clone());

    AppState {
        pool,
        auth_config: Arc::new(config.auth.clone()),
        tokens: tokens.clone(),
        accounts: Arc::new(AccountService::new(
            account_repo,
            tokens,
            config.auth.password_policy.clone(),
        )),
        posts: Arc::new(PostService::new(post_repo.clone(), tag_repo.clone())),
        categories: Arc::new(CategoryService::new(category_repo, post_repo.clone())),
        tags: Arc::new(TagService::new(tag_repo, post_repo.clone())),
        authors: Arc::new(AuthorService::new(author_repo, post_repo)),
        messages: Arc::new(MessageService::new(message_repo)),
        sections: Arc::new(SectionService::new(section_repo)),
    }
}

/// Build the `/api` router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Blog reads; optional auth widens visibility to drafts
    let public_blog = Router::new()
        .nest("/categories", categories::public_router())
        .nest("/tags", tags::public_router())
        .nest("/authors", authors::public_router())
        .merge(posts::public_router());

    let public_content = Router::new()
        .nest("/blog", public_blog)
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ));

    // Mutations and the console inbox
    let protected_blog = Router::new()
        .nest("/categories", categories::protected_router())
        .nest("/tags", tags::protected_router())
        .nest("/authors", authors::protected_router())
        .merge(posts::protected_router());

    let protected = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/blog", protected_blog)
        .nest("/contact", messages::protected_router())
        .merge(sections::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // No gate at all
    let public = Router::new()
        .nest("/auth", auth::public_router())
        .nest("/contact", messages::public_router())
        .merge(sections::public_router())
        .route("/health", get(health));

    Router::new()
        .merge(public)
        .merge(public_content)
        .merge(protected)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    // CORS with credentials so the console can use the auth cookie
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    // Console pages behind the browser gate
    let admin_pages = Router::new()
        .route("/admin", get(admin_shell))
        .route("/admin/login", get(login_page))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::admin_page_gate,
        ));

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .merge(admin_pages)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /api/health - Liveness plus a database ping
async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    crate::db::pool::ping(&state.pool)
        .await
        .map_err(ApiError::internal_error)?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "database": "connected",
    })))
}

/// GET /admin - Console shell, only reachable through the gate.
///
/// The console frontend is deployed separately; this shell exists so the
/// gate has a browser surface to protect.
async fn admin_shell(admin: AuthenticatedAdmin) -> Html<String> {
    Html(format!(
        "<!doctype html><title>Marquee Console</title><p>Signed in as {}</p>",
        admin.0.email
    ))
}

/// GET /admin/login - Login page, always reachable
async fn login_page() -> Html<&'static str> {
    Html("<!doctype html><title>Marquee Console - Sign in</title>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations, seed};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    async fn test_server() -> TestServer {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        seed::run_seed(&pool).await.expect("seed");

        let config = Config::default();
        let state = build_state(pool, &config);
        TestServer::new(build_router(state, &config.server.cors_origin)).expect("test server")
    }

    async fn admin_token(server: &TestServer) -> String {
        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "admin@example.com", "password": "admin123" }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let server = test_server().await;

        let response = server.get("/api/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "ok");
    }

    #[tokio::test]
    async fn test_admin_page_redirects_anonymous_to_login() {
        let server = test_server().await;

        let response = server.get("/admin").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin/login"
        );
    }

    #[tokio::test]
    async fn test_login_page_always_reachable() {
        let server = test_server().await;

        let response = server.get("/admin/login").await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_admin_page_with_valid_cookie() {
        let server = test_server().await;
        let token = admin_token(&server).await;

        let response = server
            .get("/admin")
            .add_header(
                header::COOKIE,
                HeaderValue::from_str(&format!("auth-token={}", token)).unwrap(),
            )
            .await;
        response.assert_status_ok();
        assert!(response.text().contains("admin@example.com"));
    }

    #[tokio::test]
    async fn test_admin_page_with_garbage_cookie_clears_it() {
        let server = test_server().await;

        let response = server
            .get("/admin")
            .add_header(
                header::COOKIE,
                HeaderValue::from_static("auth-token=garbage"),
            )
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin/login"
        );
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("stale cookie cleared")
            .to_str()
            .unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_unknown_api_route_is_404() {
        let server = test_server().await;

        let response = server.get("/api/nope").await;
        response.assert_status_not_found();
    }
}
