//! Lawyer profiles, workload snapshots and claim quota.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use casework_core::error::CoreError;
use casework_core::quota::{validate_daily_limit, ActorKind};
use casework_core::task::validate_required_skills;
use casework_core::types::DbId;
use casework_db::models::lawyer::{CreateLawyer, Lawyer};
use casework_db::repositories::LawyerRepo;
use casework_engine::quota;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_new_lawyer(input: &CreateLawyer) -> Result<(), CoreError> {
    if input.display_name.trim().is_empty() {
        return Err(CoreError::Validation("Display name must not be empty".into()));
    }
    validate_required_skills(&input.specialties)?;
    if input.regions.iter().any(|r| r.trim().is_empty()) {
        return Err(CoreError::Validation("Regions must not contain empty names".into()));
    }
    if input.max_concurrent_tasks.is_some_and(|max| max < 1) {
        return Err(CoreError::Validation(
            "max_concurrent_tasks must be at least 1".into(),
        ));
    }
    if let Some(limit) = input.daily_claim_limit {
        validate_daily_limit(limit)?;
    }
    Ok(())
}

async fn find_lawyer(state: &AppState, id: DbId) -> AppResult<Lawyer> {
    LawyerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Lawyer", id }.into())
}

/// POST /api/v1/lawyers
pub async fn create_lawyer(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateLawyer>,
) -> AppResult<impl IntoResponse> {
    validate_new_lawyer(&input)?;
    let lawyer = LawyerRepo::create(&state.pool, &input).await?;

    tracing::info!(
        lawyer_id = lawyer.id,
        user_id = lawyer.user_id,
        admin_id = admin.user_id,
        "Lawyer registered",
    );
    state.engine.workload.refresh_quietly(lawyer.id).await;
    Ok((StatusCode::CREATED, Json(DataResponse { data: lawyer })))
}

/// GET /api/v1/lawyers/{id}/workload
pub async fn get_workload(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_lawyer(&state, id).await?;
    let workload = state.engine.workload.get(id).await?;
    Ok(Json(DataResponse { data: workload }))
}

/// POST /api/v1/lawyers/{id}/workload/refresh
pub async fn refresh_workload(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_lawyer(&state, id).await?;
    let workload = state.engine.workload.refresh(id).await?;
    Ok(Json(DataResponse { data: workload }))
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// PUT /api/v1/lawyers/{id}/active
pub async fn set_active(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetActiveRequest>,
) -> AppResult<impl IntoResponse> {
    let lawyer = LawyerRepo::set_active(&state.pool, id, input.is_active)
        .await?
        .ok_or(CoreError::NotFound { entity: "Lawyer", id })?;

    tracing::info!(
        lawyer_id = id,
        is_active = input.is_active,
        admin_id = admin.user_id,
        "Lawyer activity changed",
    );
    state.engine.workload.refresh_quietly(id).await;
    Ok(Json(DataResponse { data: lawyer }))
}

/// GET /api/v1/lawyers/{id}/quota
pub async fn get_quota(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let lawyer = find_lawyer(&state, id).await?;
    let default_max = state.engine.config.lawyer_limit(lawyer.daily_claim_limit);
    let status = quota::today(&state.pool, ActorKind::Lawyer, id, default_max).await?;
    Ok(Json(DataResponse { data: status }))
}
