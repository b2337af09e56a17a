//! Marketing section API endpoints
//!
//! Public reads for the marketing pages, authenticated mutations for the
//! console:
//! - /api/services - Service offerings
//! - /api/team - Team members
//! - /api/portfolio - Portfolio projects
//! - /api/about - About-page blocks (list + update only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedAdmin};
use crate::models::section::{
    AboutBlock, PortfolioProject, PortfolioProjectInput, Service, ServiceInput, TeamMember,
    TeamMemberInput, UpdateAboutBlockInput,
};
use crate::services::section::SectionServiceError;

impl From<SectionServiceError> for ApiError {
    fn from(e: SectionServiceError) -> Self {
        match e {
            SectionServiceError::NotFound(what) => {
                ApiError::not_found(format!("Not found: {}", what))
            }
            SectionServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            SectionServiceError::InternalError(e) => ApiError::internal_error(e),
        }
    }
}

/// Build the public section routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services))
        .route("/team", get(list_team))
        .route("/portfolio", get(list_portfolio))
        .route("/about", get(list_about))
}

/// Build the protected section routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/services", post(create_service))
        .route("/services/{id}", put(update_service))
        .route("/services/{id}", delete(delete_service))
        .route("/team", post(create_team_member))
        .route("/team/{id}", put(update_team_member))
        .route("/team/{id}", delete(delete_team_member))
        .route("/portfolio", post(create_project))
        .route("/portfolio/{id}", put(update_project))
        .route("/portfolio/{id}", delete(delete_project))
        .route("/about/{id}", put(update_about_block))
}

async fn list_services(State(state): State<AppState>) -> Result<Json<Vec<Service>>, ApiError> {
    Ok(Json(state.sections.list_services().await?))
}

async fn create_service(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<ServiceInput>,
) -> Result<(StatusCode, Json<Service>), ApiError> {
    let service = state.sections.create_service(body).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

async fn update_service(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<ServiceInput>,
) -> Result<Json<Service>, ApiError> {
    Ok(Json(state.sections.update_service(id, body).await?))
}

async fn delete_service(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.sections.delete_service(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_team(State(state): State<AppState>) -> Result<Json<Vec<TeamMember>>, ApiError> {
    Ok(Json(state.sections.list_team_members().await?))
}

async fn create_team_member(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<TeamMemberInput>,
) -> Result<(StatusCode, Json<TeamMember>), ApiError> {
    let member = state.sections.create_team_member(body).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

async fn update_team_member(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<TeamMemberInput>,
) -> Result<Json<TeamMember>, ApiError> {
    Ok(Json(state.sections.update_team_member(id, body).await?))
}

async fn delete_team_member(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.sections.delete_team_member(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_portfolio(
    State(state): State<AppState>,
) -> Result<Json<Vec<PortfolioProject>>, ApiError> {
    Ok(Json(state.sections.list_projects().await?))
}

async fn create_project(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<PortfolioProjectInput>,
) -> Result<(StatusCode, Json<PortfolioProject>), ApiError> {
    let project = state.sections.create_project(body).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn update_project(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<PortfolioProjectInput>,
) -> Result<Json<PortfolioProject>, ApiError> {
    Ok(Json(state.sections.update_project(id, body).await?))
}

async fn delete_project(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.sections.delete_project(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_about(State(state): State<AppState>) -> Result<Json<Vec<AboutBlock>>, ApiError> {
    Ok(Json(state.sections.list_about_blocks().await?))
}

async fn update_about_block(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<i64>,
    Json(body): Json<UpdateAboutBlockInput>,
) -> Result<Json<AboutBlock>, ApiError> {
    Ok(Json(state.sections.update_about_block(id, body).await?))
}
