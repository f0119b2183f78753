//! Repository for the `task_assignments` table.

use casework_core::task::AssignmentResolution;
use casework_core::types::DbId;
use sqlx::PgPool;

use crate::models::assignment::Assignment;

const COLUMNS: &str = "\
    id, task_id, lawyer_id, offered_at, resolved_at, resolution, reason, created_at";

pub struct AssignmentRepo;

impl AssignmentRepo {
    /// Record a new offer. The partial unique index `uq_task_assignments_open`
    /// rejects a second open offer for the same task.
    pub async fn open(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        task_id: DbId,
        lawyer_id: DbId,
    ) -> Result<Assignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_assignments (task_id, lawyer_id) VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(task_id)
            .bind(lawyer_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Close the open offer held by `lawyer_id`. Returns `None` when there is
    /// no such open offer.
    pub async fn resolve(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        task_id: DbId,
        lawyer_id: DbId,
        resolution: AssignmentResolution,
        reason: Option<&str>,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "UPDATE task_assignments \
             SET resolved_at = NOW(), resolution = $3, reason = $4 \
             WHERE task_id = $1 AND lawyer_id = $2 AND resolved_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(task_id)
            .bind(lawyer_id)
            .bind(resolution.as_str())
            .bind(reason)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Full offer history of a task, oldest first.
    pub async fn list_for_task(pool: &PgPool, task_id: DbId) -> Result<Vec<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM task_assignments WHERE task_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }
}
