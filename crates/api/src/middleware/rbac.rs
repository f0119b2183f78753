//! Role gates layered over [`AuthUser`]. Failing a gate is 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use casework_core::error::CoreError;
use casework_core::roles::{ROLE_ADMIN, ROLE_LAWYER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Operators: lawyer registration, forced refreshes, acting for any lawyer.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Claim, confirm and review actions: `lawyer` or `admin`.
pub struct RequireLawyer(pub AuthUser);

impl FromRequestParts<AppState> for RequireLawyer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN && user.role != ROLE_LAWYER {
            return Err(AppError::Core(CoreError::Forbidden(
                "Lawyer or Admin role required".into(),
            )));
        }
        Ok(RequireLawyer(user))
    }
}
