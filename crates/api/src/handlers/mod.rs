//! Request handlers, one module per resource.

pub mod lawyer;
pub mod review;
pub mod task;
pub mod user;

use casework_core::error::CoreError;
use casework_db::models::lawyer::Lawyer;
use casework_db::repositories::LawyerRepo;
use casework_db::DbPool;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

/// The lawyer profile belonging to the caller.
pub(crate) async fn own_lawyer(pool: &DbPool, auth: &AuthUser) -> AppResult<Lawyer> {
    LawyerRepo::find_by_user_id(pool, auth.user_id)
        .await?
        .ok_or_else(|| {
            CoreError::Forbidden(format!("user {} has no lawyer profile", auth.user_id)).into()
        })
}

/// Reject an unknown status label with 400 rather than an empty list.
pub(crate) fn parse_status<S>(
    label: Option<&str>,
    parse: impl Fn(&str) -> Option<S>,
) -> AppResult<Option<S>> {
    match label {
        None => Ok(None),
        Some(label) => parse(label)
            .map(Some)
            .ok_or_else(|| crate::error::AppError::BadRequest(format!("Unknown status '{label}'"))),
    }
}
