//! Lawyer profile entity and DTOs.

use casework_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `lawyers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lawyer {
    pub id: DbId,
    pub user_id: DbId,
    pub display_name: String,
    pub specialties: Json<Vec<String>>,
    /// Regions served. Empty means nationwide.
    pub regions: Json<Vec<String>>,
    pub max_concurrent_tasks: i32,
    /// Per-lawyer override of the configured daily claim limit.
    pub daily_claim_limit: Option<i32>,
    pub is_active: bool,
    pub last_assignment_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/lawyers`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLawyer {
    pub user_id: DbId,
    pub display_name: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    pub max_concurrent_tasks: Option<i32>,
    pub daily_claim_limit: Option<i32>,
}

/// A candidate row joined with its (possibly missing) workload projection.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub lawyer_id: DbId,
    pub specialties: Json<Vec<String>>,
    pub daily_claim_limit: Option<i32>,
    pub last_assignment_at: Option<Timestamp>,
    pub current_workload_score: Option<f64>,
    pub approval_rate: Option<f64>,
}
