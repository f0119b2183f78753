//! Repository for the `lawyer_workloads` projection and the aggregate
//! queries that feed it.

use casework_core::review::PENDING_REVIEW_STATUSES;
use casework_core::status::{ReviewStatus, StatusId};
use casework_core::task::HELD_STATUSES;
use casework_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::workload::{LawyerWorkload, UpsertWorkload, WorkloadCounts};

const COLUMNS: &str = "\
    lawyer_id, active_cases, pending_reviews, daily_capacity, weekly_capacity, \
    average_review_time, approval_rate, is_available, max_concurrent_tasks, \
    current_workload_score, specialties, computed_at, updated_at";

pub struct WorkloadRepo;

impl WorkloadRepo {
    /// Aggregate the raw counts for one lawyer from tasks and reviews.
    pub async fn compute_counts(pool: &PgPool, lawyer_id: DbId) -> Result<WorkloadCounts, sqlx::Error> {
        let held: Vec<StatusId> = HELD_STATUSES.iter().map(|s| s.id()).collect();
        let pending: Vec<StatusId> = PENDING_REVIEW_STATUSES.iter().map(|s| s.id()).collect();
        let approved: Vec<StatusId> = [
            ReviewStatus::Approved,
            ReviewStatus::Authorized,
            ReviewStatus::Sent,
        ]
        .iter()
        .map(|s| s.id())
        .collect();

        sqlx::query_as::<_, WorkloadCounts>(
            "SELECT \
                (SELECT COUNT(*) FROM tasks \
                  WHERE assigned_lawyer_id = $1 AND status_id = ANY($2)) AS active_cases, \
                (SELECT COUNT(*) FROM document_review_tasks \
                  WHERE lawyer_id = $1 AND status_id = ANY($3)) AS pending_reviews, \
                (SELECT COUNT(*) FROM document_review_tasks \
                  WHERE lawyer_id = $1 AND status_id = ANY($4)) AS approved_reviews, \
                (SELECT COUNT(*) FROM document_review_tasks \
                  WHERE lawyer_id = $1 AND status_id = $5) AS rejected_reviews, \
                (SELECT AVG(EXTRACT(EPOCH FROM reviewed_at - created_at))::FLOAT8 \
                   FROM document_review_tasks \
                  WHERE lawyer_id = $1 AND reviewed_at IS NOT NULL) AS average_review_time",
        )
        .bind(lawyer_id)
        .bind(&held)
        .bind(&pending)
        .bind(&approved)
        .bind(ReviewStatus::Rejected.id())
        .fetch_one(pool)
        .await
    }

    /// Insert or replace the projection row for a lawyer.
    pub async fn upsert(pool: &PgPool, input: &UpsertWorkload) -> Result<LawyerWorkload, sqlx::Error> {
        let query = format!(
            "INSERT INTO lawyer_workloads \
                (lawyer_id, active_cases, pending_reviews, daily_capacity, weekly_capacity, \
                 average_review_time, approval_rate, is_available, max_concurrent_tasks, \
                 current_workload_score, specialties, computed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW()) \
             ON CONFLICT (lawyer_id) DO UPDATE SET \
                active_cases = EXCLUDED.active_cases, \
                pending_reviews = EXCLUDED.pending_reviews, \
                daily_capacity = EXCLUDED.daily_capacity, \
                weekly_capacity = EXCLUDED.weekly_capacity, \
                average_review_time = EXCLUDED.average_review_time, \
                approval_rate = EXCLUDED.approval_rate, \
                is_available = EXCLUDED.is_available, \
                max_concurrent_tasks = EXCLUDED.max_concurrent_tasks, \
                current_workload_score = EXCLUDED.current_workload_score, \
                specialties = EXCLUDED.specialties, \
                computed_at = EXCLUDED.computed_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LawyerWorkload>(&query)
            .bind(input.lawyer_id)
            .bind(input.active_cases)
            .bind(input.pending_reviews)
            .bind(input.daily_capacity)
            .bind(input.weekly_capacity)
            .bind(input.average_review_time)
            .bind(input.approval_rate)
            .bind(input.is_available)
            .bind(input.max_concurrent_tasks)
            .bind(input.current_workload_score)
            .bind(Json(&input.specialties))
            .fetch_one(pool)
            .await
    }

    pub async fn find(pool: &PgPool, lawyer_id: DbId) -> Result<Option<LawyerWorkload>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lawyer_workloads WHERE lawyer_id = $1");
        sqlx::query_as::<_, LawyerWorkload>(&query)
            .bind(lawyer_id)
            .fetch_optional(pool)
            .await
    }
}
