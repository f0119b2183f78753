//! Repository for the append-only `document_review_logs` table.
//!
//! Insert and read only. The table's trigger rejects UPDATE and DELETE.

use casework_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{DocumentReviewLog, NewReviewLog};

const COLUMNS: &str = "\
    id, review_task_id, old_status_id, new_status_id, actor_user_id, comment, \
    content_diff, created_at";

pub struct ReviewLogRepo;

impl ReviewLogRepo {
    pub async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry: &NewReviewLog<'_>,
    ) -> Result<DocumentReviewLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_review_logs \
                (review_task_id, old_status_id, new_status_id, actor_user_id, comment, content_diff) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentReviewLog>(&query)
            .bind(entry.review_task_id)
            .bind(entry.old_status_id)
            .bind(entry.new_status_id)
            .bind(entry.actor_user_id)
            .bind(entry.comment)
            .bind(&entry.content_diff)
            .fetch_one(&mut **tx)
            .await
    }

    /// History of one review task, in the order transitions happened.
    pub async fn list_for_review(
        pool: &PgPool,
        review_task_id: DbId,
    ) -> Result<Vec<DocumentReviewLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM document_review_logs \
             WHERE review_task_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, DocumentReviewLog>(&query)
            .bind(review_task_id)
            .fetch_all(pool)
            .await
    }
}
