use casework_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `lawyer_workloads` projection.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
pub struct LawyerWorkload {
    pub lawyer_id: DbId,
    pub active_cases: i32,
    pub pending_reviews: i32,
    pub daily_capacity: i32,
    pub weekly_capacity: i32,
    /// Mean seconds from review creation to `reviewed_at`.
    pub average_review_time: Option<f64>,
    pub approval_rate: f64,
    pub is_available: bool,
    pub max_concurrent_tasks: i32,
    pub current_workload_score: f64,
    pub specialties: Json<Vec<String>>,
    pub computed_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Raw counts aggregated from `tasks` and `document_review_tasks`.
#[derive(Debug, Clone, Copy, Default, FromRow, PartialEq)]
pub struct WorkloadCounts {
    pub active_cases: i64,
    pub pending_reviews: i64,
    /// Reviews that reached approved, authorized or sent.
    pub approved_reviews: i64,
    pub rejected_reviews: i64,
    pub average_review_time: Option<f64>,
}

/// Values written by the workload tracker.
#[derive(Debug, Clone)]
pub struct UpsertWorkload {
    pub lawyer_id: DbId,
    pub active_cases: i32,
    pub pending_reviews: i32,
    pub daily_capacity: i32,
    pub weekly_capacity: i32,
    pub average_review_time: Option<f64>,
    pub approval_rate: f64,
    pub is_available: bool,
    pub max_concurrent_tasks: i32,
    pub current_workload_score: f64,
    pub specialties: Vec<String>,
}
