use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use casework_core::quota::ActorKind;
use casework_engine::quota;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/me/publish-quota
pub async fn my_publish_quota(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let status = quota::today(
        &state.pool,
        ActorKind::User,
        auth.user_id,
        state.engine.config.user_daily_publish_limit,
    )
    .await?;
    Ok(Json(DataResponse { data: status }))
}
