//! Task endpoints: publishing, claiming and confirming offers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use casework_core::error::CoreError;
use casework_core::status::TaskStatus;
use casework_core::task::ConfirmAction;
use casework_core::types::DbId;
use casework_db::models::task::{CreateTask, Task, TaskListQuery};
use casework_db::repositories::{AssignmentRepo, TaskRepo};
use casework_engine::publishing::Publisher;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::{own_lawyer, parse_status};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireLawyer;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ClaimRequest {
    /// Admins may name the lawyer; lawyers always claim for themselves.
    #[serde(default)]
    pub preferred_lawyer_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub action: ConfirmAction,
    #[serde(default)]
    pub reason: Option<String>,
    /// Admins only; defaults to the current assignee.
    #[serde(default)]
    pub lawyer_id: Option<DbId>,
}

/// Admins publish on behalf of the system without a quota.
fn publisher(auth: &AuthUser) -> Publisher {
    Publisher {
        user_id: auth.user_id,
        metered: !auth.is_admin(),
    }
}

async fn find_task(state: &AppState, id: DbId) -> AppResult<Task> {
    TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Task", id }.into())
}

/// The lawyer an action is taken for: the caller's own profile, or for an
/// admin the named lawyer, falling back to the task's assignee.
async fn acting_lawyer(
    state: &AppState,
    auth: &AuthUser,
    task_id: DbId,
    requested: Option<DbId>,
) -> AppResult<DbId> {
    if !auth.is_admin() {
        return Ok(own_lawyer(&state.pool, auth).await?.id);
    }
    if let Some(lawyer_id) = requested {
        return Ok(lawyer_id);
    }
    find_task(state, task_id)
        .await?
        .assigned_lawyer_id
        .ok_or_else(|| CoreError::InvalidState(format!("task {task_id} has no assignee")).into())
}

/// POST /api/v1/tasks
pub async fn create_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> AppResult<impl IntoResponse> {
    let task = state.engine.publisher.create(&input, publisher(&auth)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// GET /api/v1/tasks
pub async fn list_tasks(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TaskListQuery>,
) -> AppResult<impl IntoResponse> {
    let status = parse_status(params.status.as_deref(), TaskStatus::parse)?;
    let tasks = TaskRepo::list(&state.pool, status, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/tasks/{id}
pub async fn get_task(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let task = find_task(&state, id).await?;
    Ok(Json(DataResponse { data: task }))
}

/// POST /api/v1/tasks/{id}/publish
pub async fn publish_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let task = state.engine.publisher.publish(id, publisher(&auth)).await?;
    Ok(Json(DataResponse { data: task }))
}

/// POST /api/v1/tasks/{id}/cancel
pub async fn cancel_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let task = state.engine.publisher.cancel(id, publisher(&auth)).await?;
    Ok(Json(DataResponse { data: task }))
}

/// POST /api/v1/tasks/{id}/claim
///
/// The body is optional.
///
/// 409 `TASK_UNAVAILABLE` when another claim won, 429 `QUOTA_EXHAUSTED`
/// when the named lawyer is out of claims today, 404 `NO_ELIGIBLE_LAWYER`
/// when no candidate can take it.
pub async fn claim_task(
    RequireLawyer(auth): RequireLawyer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<ClaimRequest>>,
) -> AppResult<impl IntoResponse> {
    let input = input.map(|Json(body)| body).unwrap_or_default();
    let preferred = if auth.is_admin() {
        input.preferred_lawyer_id
    } else {
        let own = own_lawyer(&state.pool, &auth).await?;
        if input.preferred_lawyer_id.is_some_and(|requested| requested != own.id) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Lawyers may only claim for themselves".into(),
            )));
        }
        Some(own.id)
    };

    let outcome = state
        .engine
        .scheduler
        .claim(id, preferred, Some(auth.user_id))
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/tasks/{id}/confirm
pub async fn confirm_task(
    RequireLawyer(auth): RequireLawyer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ConfirmRequest>,
) -> AppResult<impl IntoResponse> {
    let lawyer_id = acting_lawyer(&state, &auth, id, input.lawyer_id).await?;
    let outcome = state
        .engine
        .confirmation
        .confirm(id, lawyer_id, input.action, input.reason.as_deref(), Some(auth.user_id))
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/tasks/{id}/complete
pub async fn complete_task(
    RequireLawyer(auth): RequireLawyer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let lawyer_id = acting_lawyer(&state, &auth, id, None).await?;
    let task = state
        .engine
        .confirmation
        .complete(id, lawyer_id, Some(auth.user_id))
        .await?;
    Ok(Json(DataResponse { data: task }))
}

/// GET /api/v1/tasks/{id}/assignments
pub async fn list_assignments(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_task(&state, id).await?;
    let assignments = AssignmentRepo::list_for_task(&state.pool, id).await?;
    Ok(Json(DataResponse { data: assignments }))
}
