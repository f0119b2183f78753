//! Task entity and request DTOs.

use casework_core::status::StatusId;
use casework_core::task::{TaskType, Urgency};
use casework_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub task_type: String,
    pub title: String,
    pub description: Option<String>,
    pub target_info: serde_json::Value,
    pub amount_cents: i64,
    pub urgency: String,
    pub status_id: StatusId,
    pub region: Option<String>,
    pub required_skills: Json<Vec<String>>,
    pub source_case_id: Option<DbId>,
    pub creator_user_id: Option<DbId>,
    pub assigned_lawyer_id: Option<DbId>,
    pub published_at: Option<Timestamp>,
    pub claimed_at: Option<Timestamp>,
    pub accepted_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub task_type: TaskType,
    pub title: String,
    pub description: Option<String>,
    pub target_info: Option<serde_json::Value>,
    pub amount_cents: Option<i64>,
    pub urgency: Option<Urgency>,
    pub region: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub source_case_id: Option<DbId>,
    /// Publish immediately after creation. Defaults to `true`.
    pub publish: Option<bool>,
}

/// Query parameters for `GET /api/v1/tasks`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    /// Status label, e.g. `published`.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
