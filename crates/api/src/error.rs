use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use casework_core::error::CoreError;
use casework_engine::EngineError;
use serde_json::{json, Value};

/// Handler error. Renders as `{ "error", "code", "details"? }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(core) => AppError::Core(core),
            EngineError::Database(db) => AppError::Database(db),
        }
    }
}

/// Status, stable code, message and optional structured details.
type Rendered = (StatusCode, &'static str, String, Option<Value>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> Rendered {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
            None,
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
        CoreError::TaskUnavailable(_) => {
            (StatusCode::CONFLICT, "TASK_UNAVAILABLE", err.to_string(), None)
        }
        CoreError::QuotaExhausted { kind, actor_id, max } => (
            StatusCode::TOO_MANY_REQUESTS,
            "QUOTA_EXHAUSTED",
            err.to_string(),
            Some(json!({ "kind": kind, "actor_id": actor_id, "max": max })),
        ),
        CoreError::NoEligibleLawyer(_) => {
            (StatusCode::NOT_FOUND, "NO_ELIGIBLE_LAWYER", err.to_string(), None)
        }
        CoreError::InvalidState(msg) => {
            tracing::warn!(reason = %msg, "Rejected action for current state");
            (StatusCode::CONFLICT, "INVALID_STATE", msg.clone(), None)
        }
        CoreError::NotAssignee { .. } => (StatusCode::FORBIDDEN, "NOT_ASSIGNEE", err.to_string(), None),
        CoreError::IllegalTransition { from, to } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "ILLEGAL_TRANSITION",
            err.to_string(),
            Some(json!({ "from": from, "to": to })),
        ),
        CoreError::MissingComment(_) => {
            (StatusCode::BAD_REQUEST, "MISSING_COMMENT", err.to_string(), None)
        }
    }
}

/// - `RowNotFound` is 404.
/// - Unique violations on `uq_*` constraints are 409.
/// - Anything else is logged and sanitised to 500.
fn classify_sqlx_error(err: &sqlx::Error) -> Rendered {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
            None,
        ),
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                        None,
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

fn internal() -> Rendered {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
        None,
    )
}
