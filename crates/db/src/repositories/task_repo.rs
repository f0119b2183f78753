//! Repository for the `tasks` table.
//!
//! Every status change is a single `UPDATE ... WHERE status_id = <expected>`;
//! a `None` return means another caller got there first.

use casework_core::status::{StatusId, TaskStatus};
use casework_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::task::{CreateTask, Task};

use super::page;

/// Column list for `tasks` queries.
const COLUMNS: &str = "\
    id, task_type, title, description, target_info, amount_cents, urgency, \
    status_id, region, required_skills, source_case_id, creator_user_id, \
    assigned_lawyer_id, published_at, claimed_at, accepted_at, completed_at, \
    cancelled_at, created_at, updated_at";

pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task in `pending` status.
    pub async fn create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        creator_user_id: Option<DbId>,
        input: &CreateTask,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks \
                (task_type, title, description, target_info, amount_cents, urgency, \
                 status_id, region, required_skills, source_case_id, creator_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(input.task_type.as_str())
            .bind(&input.title)
            .bind(&input.description)
            .bind(
                input
                    .target_info
                    .clone()
                    .unwrap_or_else(|| serde_json::json!({})),
            )
            .bind(input.amount_cents.unwrap_or(0))
            .bind(input.urgency.unwrap_or_default().as_str())
            .bind(TaskStatus::Pending.id())
            .bind(&input.region)
            .bind(Json(input.required_skills.clone().unwrap_or_default()))
            .bind(input.source_case_id)
            .bind(creator_user_id)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock and read a task inside a transaction.
    pub async fn find_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List tasks, newest first, optionally filtered by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<TaskStatus>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let (limit, offset) = page(limit, offset);
        let query = format!(
            "SELECT {COLUMNS} FROM tasks \
             WHERE ($1::SMALLINT IS NULL OR status_id = $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(status.map(StatusId::from))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// `pending -> published`.
    pub async fn publish(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET status_id = $2, published_at = NOW() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(TaskStatus::Published.id())
            .bind(TaskStatus::Pending.id())
            .fetch_optional(&mut **tx)
            .await
    }

    /// `pending | published -> cancelled`.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET status_id = $2, cancelled_at = NOW() \
             WHERE id = $1 AND status_id IN ($3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(TaskStatus::Cancelled.id())
            .bind(TaskStatus::Pending.id())
            .bind(TaskStatus::Published.id())
            .fetch_optional(pool)
            .await
    }

    /// `published -> claimed`, stamping the assignee.
    pub async fn mark_claimed(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        lawyer_id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks \
             SET status_id = $3, assigned_lawyer_id = $2, claimed_at = NOW(), accepted_at = NULL \
             WHERE id = $1 AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(lawyer_id)
            .bind(TaskStatus::Claimed.id())
            .bind(TaskStatus::Published.id())
            .fetch_optional(&mut **tx)
            .await
    }

    /// `claimed -> accepted`, only for the current assignee.
    pub async fn accept(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        lawyer_id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET status_id = $3, accepted_at = NOW() \
             WHERE id = $1 AND assigned_lawyer_id = $2 AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(lawyer_id)
            .bind(TaskStatus::Accepted.id())
            .bind(TaskStatus::Claimed.id())
            .fetch_optional(&mut **tx)
            .await
    }

    /// `claimed -> published`, clearing the assignee.
    ///
    /// `claimed_at` is left in place so the caller can refund the quota of
    /// the claim's day.
    pub async fn release(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        lawyer_id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET status_id = $3, assigned_lawyer_id = NULL \
             WHERE id = $1 AND assigned_lawyer_id = $2 AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(lawyer_id)
            .bind(TaskStatus::Published.id())
            .bind(TaskStatus::Claimed.id())
            .fetch_optional(&mut **tx)
            .await
    }

    /// `accepted -> completed`. With `lawyer_id` set, only that assignee may
    /// complete the task.
    pub async fn complete(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        lawyer_id: Option<DbId>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET status_id = $3, completed_at = NOW() \
             WHERE id = $1 AND ($2::BIGINT IS NULL OR assigned_lawyer_id = $2) \
               AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(lawyer_id)
            .bind(TaskStatus::Completed.id())
            .bind(TaskStatus::Accepted.id())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Claimed tasks whose offer was made before `cutoff`, oldest first.
    pub async fn list_stale_claims(
        pool: &PgPool,
        cutoff: Timestamp,
        limit: i64,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks \
             WHERE status_id = $1 AND claimed_at < $2 \
             ORDER BY claimed_at ASC \
             LIMIT $3"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(TaskStatus::Claimed.id())
            .bind(cutoff)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
