//! Document review endpoints.
//!
//! Lawyers read and act only on review tasks assigned to them; admins on
//! any. Other roles have no access.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use casework_core::error::CoreError;
use casework_core::status::ReviewStatus;
use casework_core::types::DbId;
use casework_db::models::review::{CreateReviewTask, DocumentReviewTask, ReviewTaskListQuery};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::{own_lawyer, parse_status};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireLawyer;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub new_status: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModifyContentRequest {
    pub content: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignatureRequest {
    pub signature: serde_json::Value,
}

async fn ensure_lawyer_owns(state: &AppState, auth: &AuthUser, lawyer_id: DbId) -> AppResult<()> {
    if auth.is_admin() {
        return Ok(());
    }
    let own = own_lawyer(&state.pool, auth).await?;
    if own.id != lawyer_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Review task is assigned to another lawyer".into(),
        )));
    }
    Ok(())
}

async fn find_accessible(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<DocumentReviewTask> {
    let review = state.engine.reviews.find(id).await?;
    ensure_lawyer_owns(state, auth, review.lawyer_id).await?;
    Ok(review)
}

/// POST /api/v1/review-tasks
pub async fn create_review(
    RequireLawyer(auth): RequireLawyer,
    State(state): State<AppState>,
    Json(input): Json<CreateReviewTask>,
) -> AppResult<impl IntoResponse> {
    ensure_lawyer_owns(&state, &auth, input.lawyer_id).await?;
    let review = state.engine.reviews.create(auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

/// GET /api/v1/review-tasks
///
/// A lawyer's listing is always scoped to their own reviews.
pub async fn list_reviews(
    RequireLawyer(auth): RequireLawyer,
    State(state): State<AppState>,
    Query(params): Query<ReviewTaskListQuery>,
) -> AppResult<impl IntoResponse> {
    let status = parse_status(params.status.as_deref(), ReviewStatus::parse)?;
    let lawyer_id = if auth.is_admin() {
        params.lawyer_id
    } else {
        let own = own_lawyer(&state.pool, &auth).await?;
        if params.lawyer_id.is_some_and(|requested| requested != own.id) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Lawyers may only list their own review tasks".into(),
            )));
        }
        Some(own.id)
    };
    let reviews = state
        .engine
        .reviews
        .list(lawyer_id, status, params.limit, params.offset)
        .await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// GET /api/v1/review-tasks/{id}
pub async fn get_review(
    RequireLawyer(auth): RequireLawyer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let review = find_accessible(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: review }))
}

/// POST /api/v1/review-tasks/{id}/transition
///
/// 422 `ILLEGAL_TRANSITION` with `details: { from, to }` for an edge not
/// in the workflow, 400 `MISSING_COMMENT` for a modification request
/// without a comment.
pub async fn transition_review(
    RequireLawyer(auth): RequireLawyer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<TransitionRequest>,
) -> AppResult<impl IntoResponse> {
    let to = ReviewStatus::parse(&input.new_status).ok_or_else(|| {
        AppError::BadRequest(format!("Unknown review status '{}'", input.new_status))
    })?;
    find_accessible(&state, &auth, id).await?;

    let review = state
        .engine
        .reviews
        .transition(id, to, auth.user_id, input.comment.as_deref())
        .await?;
    Ok(Json(DataResponse { data: review }))
}

/// PUT /api/v1/review-tasks/{id}/content
pub async fn modify_content(
    RequireLawyer(auth): RequireLawyer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ModifyContentRequest>,
) -> AppResult<impl IntoResponse> {
    find_accessible(&state, &auth, id).await?;
    let review = state
        .engine
        .reviews
        .modify_content(id, auth.user_id, &input.content, input.comment.as_deref())
        .await?;
    Ok(Json(DataResponse { data: review }))
}

/// POST /api/v1/review-tasks/{id}/signature
pub async fn attach_signature(
    RequireLawyer(auth): RequireLawyer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SignatureRequest>,
) -> AppResult<impl IntoResponse> {
    find_accessible(&state, &auth, id).await?;
    let review = state
        .engine
        .reviews
        .attach_signature(id, auth.user_id, &input.signature)
        .await?;
    Ok(Json(DataResponse { data: review }))
}

/// GET /api/v1/review-tasks/{id}/logs
pub async fn list_logs(
    RequireLawyer(auth): RequireLawyer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_accessible(&state, &auth, id).await?;
    let logs = state.engine.reviews.logs(id).await?;
    Ok(Json(DataResponse { data: logs }))
}
