//! Repository for the `lawyers` table and candidate selection.

use casework_core::scoring::DEFAULT_MAX_CONCURRENT_TASKS;
use casework_core::task::TaskType;
use casework_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::lawyer::{CandidateRow, CreateLawyer, Lawyer};

const COLUMNS: &str = "\
    id, user_id, display_name, specialties, regions, max_concurrent_tasks, \
    daily_claim_limit, is_active, last_assignment_at, created_at, updated_at";

pub struct LawyerRepo;

impl LawyerRepo {
    pub async fn create(pool: &PgPool, input: &CreateLawyer) -> Result<Lawyer, sqlx::Error> {
        let query = format!(
            "INSERT INTO lawyers \
                (user_id, display_name, specialties, regions, max_concurrent_tasks, daily_claim_limit) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lawyer>(&query)
            .bind(input.user_id)
            .bind(&input.display_name)
            .bind(Json(&input.specialties))
            .bind(Json(&input.regions))
            .bind(
                input
                    .max_concurrent_tasks
                    .unwrap_or(DEFAULT_MAX_CONCURRENT_TASKS),
            )
            .bind(input.daily_claim_limit)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lawyer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lawyers WHERE id = $1");
        sqlx::query_as::<_, Lawyer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the lawyer profile of an authenticated user.
    pub async fn find_by_user_id(pool: &PgPool, user_id: DbId) -> Result<Option<Lawyer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lawyers WHERE user_id = $1");
        sqlx::query_as::<_, Lawyer>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// IDs of every lawyer, for the periodic workload refresh.
    pub async fn list_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM lawyers ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Eligible lawyers for a task, joined with their workload projection.
    ///
    /// Filters: active profile, specialty covers `task_type`, region served
    /// (an empty region list serves everywhere), workload marks them
    /// available (no workload row yet counts as available). With `only` set,
    /// the result is restricted to that lawyer.
    pub async fn list_candidates(
        pool: &PgPool,
        task_type: TaskType,
        region: Option<&str>,
        only: Option<DbId>,
    ) -> Result<Vec<CandidateRow>, sqlx::Error> {
        sqlx::query_as::<_, CandidateRow>(
            "SELECT l.id AS lawyer_id, l.specialties, l.daily_claim_limit, l.last_assignment_at, \
                    w.current_workload_score, w.approval_rate \
             FROM lawyers l \
             LEFT JOIN lawyer_workloads w ON w.lawyer_id = l.id \
             WHERE l.is_active \
               AND l.specialties @> jsonb_build_array($1::TEXT) \
               AND ($2::TEXT IS NULL OR l.regions = '[]'::jsonb \
                    OR l.regions @> jsonb_build_array($2::TEXT)) \
               AND COALESCE(w.is_available, TRUE) \
               AND ($3::BIGINT IS NULL OR l.id = $3) \
             ORDER BY l.id",
        )
        .bind(task_type.as_str())
        .bind(region)
        .bind(only)
        .fetch_all(pool)
        .await
    }

    /// Stamp the fairness tie-break after a successful claim.
    pub async fn touch_last_assignment(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE lawyers SET last_assignment_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Activate or deactivate a profile. Inactive lawyers drop out of the
    /// candidate set; offers they already hold are unaffected.
    pub async fn set_active(pool: &PgPool, id: DbId, is_active: bool) -> Result<Option<Lawyer>, sqlx::Error> {
        let query = format!(
            "UPDATE lawyers SET is_active = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lawyer>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }
}
