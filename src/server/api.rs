//! Route handlers
//!
//! Every handler runs with a [`RequestContext`]: the session id from
//! `x-session-id` and the authenticated user from `x-user-id`, if any.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::auth::{AuthExchange, safe_redirect};
use super::response::{ApiError, ApiResponse, ApiResult};
use crate::blueprint::{BlueprintGenerator, codec};
use crate::chart::{RadarChart, SurfaceSize};
use crate::config::ChartConfig;
use crate::constants::generation::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
use crate::constants::network::{SESSION_HEADER, USER_HEADER};
use crate::storage::{
    DeleteOutcome, MemorySession, ProjectRepository, SaveOutcome, SessionRegistry, SharedRemote,
    SharedSession,
};
use crate::types::{Blueprint, Idea, SessionId, TaskStatus, UserId};
use crate::views::{IdeaCard, ProjectView, TaskBoard, dashboard};

// =============================================================================
// State
// =============================================================================

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<BlueprintGenerator>,
    pub remote: SharedRemote,
    pub sessions: Arc<SessionRegistry>,
    pub auth: Arc<dyn AuthExchange>,
    pub chart: ChartConfig,
    pub default_redirect: String,
}

impl AppState {
    /// Repository over the request's session, creating the session if needed.
    fn repository(&self, session: &SessionId) -> ProjectRepository {
        ProjectRepository::new(self.sessions.get_or_create(session), Arc::clone(&self.remote))
    }

    /// Repository over the request's session if it is live, else over a
    /// throwaway empty one. Never registers a session.
    fn existing_repository(&self, session: &SessionId) -> ProjectRepository {
        let session = self
            .sessions
            .get(session)
            .map(|live| live as SharedSession)
            .unwrap_or_else(|| Arc::new(MemorySession::new()) as SharedSession);
        ProjectRepository::new(session, Arc::clone(&self.remote))
    }

    fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::from_config(&self.chart)
    }
}

/// Session and actor of a request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session: SessionId,
    pub actor: Option<UserId>,
}

impl RequestContext {
    pub fn actor(&self) -> Option<&UserId> {
        self.actor.as_ref()
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = header_value(parts, SESSION_HEADER)
            .map(SessionId::new)
            .ok_or_else(|| ApiError::bad_request(format!("Missing {} header", SESSION_HEADER)))?;
        let actor = header_value(parts, USER_HEADER).map(UserId::new);
        Ok(Self { session, actor })
    }
}

// =============================================================================
// Generation
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn required(value: Option<&str>, field: &str, max_chars: usize) -> Result<String, ApiError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(ApiError::bad_request("Title and description are required"));
    }
    if value.chars().count() > max_chars {
        return Err(ApiError::bad_request(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(value.to_string())
}

/// `POST /api/generate`
pub async fn generate(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Blueprint> {
    let title = required(request.title.as_deref(), "Title", MAX_TITLE_CHARS)?;
    let description = required(
        request.description.as_deref(),
        "Description",
        MAX_DESCRIPTION_CHARS,
    )?;

    let generated = state.generator.generate(&title, &description).await;
    let mut blueprint = generated.blueprint;

    let idea = Idea::new(title, description)
        .with_score(blueprint.validation.score)
        .owned_by(ctx.actor.clone());
    blueprint.idea_id = idea.id.clone();

    let mut warnings = Vec::new();
    if let Err(e) = state.repository(&ctx.session).stage_project(&idea, blueprint.clone()) {
        warn!("Failed to stage generated project in session: {}", e);
        warnings.push(format!("Project not kept in session: {}", e));
    }

    Ok(ApiResponse::success(blueprint)
        .with_warnings(warnings)
        .with_source(generated.source))
}

// =============================================================================
// Projects
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub idea: Option<Idea>,
    #[serde(default)]
    pub blueprint: Option<Value>,
}

/// `POST /api/ideas`: save the given project, or the session's current one
pub async fn save_idea(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Bytes,
) -> ApiResult<SaveOutcome> {
    let repo = state.repository(&ctx.session);
    let request: SaveRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SaveRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?
    };

    let idea = match request.idea {
        Some(idea) => idea,
        None => repo
            .session()
            .current_idea()?
            .ok_or_else(|| ApiError::bad_request("No project to save"))?,
    };
    let blueprint = match request.blueprint {
        Some(value) => codec::decode(value)?,
        None => repo
            .session()
            .current_blueprint()?
            .filter(|b| b.idea_id == idea.id)
            .ok_or_else(|| ApiError::bad_request("No blueprint to save"))?,
    };

    let outcome = repo.save_project(ctx.actor(), idea, blueprint).await?;
    let warnings = outcome.warnings.clone();
    Ok(ApiResponse::success(outcome).with_warnings(warnings))
}

/// `GET /api/ideas`
pub async fn list_ideas(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> ApiResult<Vec<IdeaCard>> {
    let ideas = state
        .existing_repository(&ctx.session)
        .list_ideas(ctx.actor())
        .await?;
    Ok(ApiResponse::success(dashboard(&ideas)))
}

/// `GET /api/ideas/{id}`
pub async fn get_idea(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<ProjectView> {
    let project = state
        .existing_repository(&ctx.session)
        .load_project(ctx.actor(), &id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Idea not found: {}", id)))?;
    Ok(ApiResponse::success(ProjectView::from_project(
        project,
        state.surface_size(),
    )))
}

/// `DELETE /api/ideas/{id}`
pub async fn delete_idea(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<DeleteOutcome> {
    let outcome = state
        .existing_repository(&ctx.session)
        .delete_project(ctx.actor(), &id)
        .await?;
    Ok(ApiResponse::success(outcome))
}

async fn load_blueprint(
    state: &AppState,
    ctx: &RequestContext,
    id: &str,
) -> Result<Blueprint, ApiError> {
    state
        .existing_repository(&ctx.session)
        .load_project(ctx.actor(), id)
        .await?
        .and_then(|p| p.blueprint)
        .ok_or_else(|| ApiError::not_found(format!("Blueprint not found: {}", id)))
}

/// `GET /api/ideas/{id}/tasks`
pub async fn list_tasks(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> ApiResult<TaskBoard> {
    let blueprint = load_blueprint(&state, &ctx, &id).await?;
    Ok(ApiResponse::success(TaskBoard::from_blueprint(&blueprint)))
}

#[derive(Debug, Deserialize)]
pub struct TaskUpdate {
    pub status: String,
}

/// `PATCH /api/ideas/{id}/tasks/{task_id}`
pub async fn update_task(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((id, task_id)): Path<(String, String)>,
    Json(update): Json<TaskUpdate>,
) -> ApiResult<TaskBoard> {
    let status: TaskStatus = update.status.parse().map_err(ApiError::bad_request)?;
    let blueprint = state
        .existing_repository(&ctx.session)
        .update_task_status(ctx.actor(), &id, &task_id, status)
        .await?;
    info!("Task {} set to {}", task_id, status);
    Ok(ApiResponse::success(TaskBoard::from_blueprint(&blueprint)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub dpr: Option<f64>,
    /// Pillar to highlight, as if hovered in the legend
    pub active: Option<String>,
}

/// `GET /api/ideas/{id}/chart.svg`
pub async fn chart_svg(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Response, ApiError> {
    let pillars: BTreeMap<String, f64> = load_blueprint(&state, &ctx, &id)
        .await?
        .validation
        .pillars;

    let size = SurfaceSize::new(
        query.width.unwrap_or(state.chart.width),
        query.height.unwrap_or(state.chart.height),
        query.dpr.unwrap_or(state.chart.device_pixel_ratio),
    );
    let mut chart = RadarChart::new(&pillars, size).with_activation_radius(state.chart.activation_radius);
    if let Some(name) = query.active.as_deref() {
        chart.legend_enter(name);
    }

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("image/svg+xml"))],
        chart.to_svg(),
    )
        .into_response())
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    #[serde(alias = "next", alias = "redirect_to")]
    pub redirect: Option<String>,
}

/// `GET /api/auth/callback`
pub async fn auth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    if let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) {
        state.auth.exchange_code(code).await?;
    }
    let target = safe_redirect(query.redirect.as_deref(), &state.default_redirect);
    Ok(Redirect::to(&target))
}

pub async fn health() -> &'static str {
    "ok"
}
