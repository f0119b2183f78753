//! Repository for the `document_review_tasks` table.
//!
//! Status changes are conditional on the status the caller validated
//! against, so a concurrent change makes the update return `None`.

use casework_core::review::{holds_final_content, DEFAULT_PRIORITY};
use casework_core::status::{ReviewStatus, StatusId};
use casework_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{CreateReviewTask, DocumentReviewTask};

use super::page;

/// Column list for `document_review_tasks` queries.
const COLUMNS: &str = "\
    id, task_number, task_id, case_id, order_id, lawyer_id, creator_id, \
    document_type, original_content, current_content, final_content, status_id, \
    priority, deadline, requires_signature, auto_approve, signature, signed_at, \
    reviewed_at, authorized_at, sent_at, created_at, updated_at";

pub struct ReviewTaskRepo;

impl ReviewTaskRepo {
    /// Insert a review task in `pending`. `current_content` starts as a copy
    /// of the original.
    pub async fn create(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        creator_id: DbId,
        input: &CreateReviewTask,
    ) -> Result<DocumentReviewTask, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_review_tasks \
                (task_id, case_id, order_id, lawyer_id, creator_id, document_type, \
                 original_content, current_content, status_id, priority, deadline, \
                 requires_signature, auto_approve) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentReviewTask>(&query)
            .bind(input.task_id)
            .bind(input.case_id)
            .bind(input.order_id)
            .bind(input.lawyer_id)
            .bind(creator_id)
            .bind(&input.document_type)
            .bind(&input.content)
            .bind(ReviewStatus::Pending.id())
            .bind(input.priority.unwrap_or(DEFAULT_PRIORITY))
            .bind(input.deadline)
            .bind(input.requires_signature)
            .bind(input.auto_approve)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DocumentReviewTask>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM document_review_tasks WHERE id = $1");
        sqlx::query_as::<_, DocumentReviewTask>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List review tasks, most urgent first.
    pub async fn list(
        pool: &PgPool,
        lawyer_id: Option<DbId>,
        status: Option<ReviewStatus>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<DocumentReviewTask>, sqlx::Error> {
        let (limit, offset) = page(limit, offset);
        let query = format!(
            "SELECT {COLUMNS} FROM document_review_tasks \
             WHERE ($1::BIGINT IS NULL OR lawyer_id = $1) \
               AND ($2::SMALLINT IS NULL OR status_id = $2) \
             ORDER BY priority DESC, deadline ASC NULLS LAST, id ASC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, DocumentReviewTask>(&query)
            .bind(lawyer_id)
            .bind(status.map(StatusId::from))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Move `from -> to` if the row is still in `from`.
    ///
    /// The first status that holds `final_content` freezes `current_content`
    /// into it, a holding status keeps it, and any other target clears it.
    /// `approved`, `authorized` and `sent` stamp their timestamps.
    pub async fn transition(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        from: ReviewStatus,
        to: ReviewStatus,
    ) -> Result<Option<DocumentReviewTask>, sqlx::Error> {
        let freeze = holds_final_content(to) && !holds_final_content(from);
        let keep = holds_final_content(to) && holds_final_content(from);

        let query = format!(
            "UPDATE document_review_tasks SET \
                status_id = $3, \
                final_content = CASE \
                    WHEN $4 THEN current_content \
                    WHEN $5 THEN final_content \
                    ELSE NULL END, \
                reviewed_at = CASE WHEN $3 = $6 THEN NOW() ELSE reviewed_at END, \
                authorized_at = CASE WHEN $3 = $7 THEN NOW() ELSE authorized_at END, \
                sent_at = CASE WHEN $3 = $8 THEN NOW() ELSE sent_at END \
             WHERE id = $1 AND status_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentReviewTask>(&query)
            .bind(id)
            .bind(from.id())
            .bind(to.id())
            .bind(freeze)
            .bind(keep)
            .bind(ReviewStatus::Approved.id())
            .bind(ReviewStatus::Authorized.id())
            .bind(ReviewStatus::Sent.id())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Replace the working copy and move `modification_requested -> modified`.
    pub async fn modify_content(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        content: &str,
    ) -> Result<Option<DocumentReviewTask>, sqlx::Error> {
        let query = format!(
            "UPDATE document_review_tasks SET current_content = $2, status_id = $3 \
             WHERE id = $1 AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentReviewTask>(&query)
            .bind(id)
            .bind(content)
            .bind(ReviewStatus::Modified.id())
            .bind(ReviewStatus::ModificationRequested.id())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Store a signature while the row is in one of `allowed`.
    pub async fn attach_signature(
        pool: &PgPool,
        id: DbId,
        signature: &serde_json::Value,
        allowed: &[ReviewStatus],
    ) -> Result<Option<DocumentReviewTask>, sqlx::Error> {
        let allowed: Vec<StatusId> = allowed.iter().map(|s| s.id()).collect();
        let query = format!(
            "UPDATE document_review_tasks SET signature = $2, signed_at = NOW() \
             WHERE id = $1 AND status_id = ANY($3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentReviewTask>(&query)
            .bind(id)
            .bind(signature)
            .bind(&allowed)
            .fetch_optional(pool)
            .await
    }
}
