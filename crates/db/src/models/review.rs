//! Document review task and log entities, plus DTOs.

use casework_core::status::StatusId;
use casework_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `document_review_tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentReviewTask {
    pub id: DbId,
    pub task_number: String,
    pub task_id: Option<DbId>,
    pub case_id: Option<DbId>,
    pub order_id: Option<DbId>,
    pub lawyer_id: DbId,
    pub creator_id: DbId,
    pub document_type: String,
    pub original_content: String,
    pub current_content: String,
    pub final_content: Option<String>,
    pub status_id: StatusId,
    pub priority: i16,
    pub deadline: Option<Timestamp>,
    pub requires_signature: bool,
    pub auto_approve: bool,
    pub signature: Option<serde_json::Value>,
    pub signed_at: Option<Timestamp>,
    pub reviewed_at: Option<Timestamp>,
    pub authorized_at: Option<Timestamp>,
    pub sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/review-tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewTask {
    pub task_id: Option<DbId>,
    pub case_id: Option<DbId>,
    pub order_id: Option<DbId>,
    pub lawyer_id: DbId,
    pub document_type: String,
    pub content: String,
    pub priority: Option<i16>,
    pub deadline: Option<Timestamp>,
    #[serde(default)]
    pub requires_signature: bool,
    #[serde(default)]
    pub auto_approve: bool,
}

/// Query parameters for `GET /api/v1/review-tasks`.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewTaskListQuery {
    pub lawyer_id: Option<DbId>,
    /// Status label, e.g. `in_review`.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A row from the append-only `document_review_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentReviewLog {
    pub id: DbId,
    pub review_task_id: DbId,
    pub old_status_id: StatusId,
    pub new_status_id: StatusId,
    pub actor_user_id: DbId,
    pub comment: Option<String>,
    pub content_diff: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// Input for one log insert.
#[derive(Debug, Clone)]
pub struct NewReviewLog<'a> {
    pub review_task_id: DbId,
    pub old_status_id: StatusId,
    pub new_status_id: StatusId,
    pub actor_user_id: DbId,
    pub comment: Option<&'a str>,
    pub content_diff: Option<serde_json::Value>,
}
