//! Integration tests for document review storage: conditional transitions,
//! the `final_content` constraint, and the append-only log.

use assert_matches::assert_matches;
use casework_core::status::ReviewStatus;
use casework_db::models::lawyer::CreateLawyer;
use casework_db::models::review::{CreateReviewTask, DocumentReviewTask, NewReviewLog};
use casework_db::repositories::{LawyerRepo, ReviewLogRepo, ReviewTaskRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_review(pool: &PgPool) -> DocumentReviewTask {
    let lawyer = LawyerRepo::create(
        pool,
        &CreateLawyer {
            user_id: 500,
            display_name: "Reviewer".to_string(),
            specialties: vec!["lawyer_letter".to_string()],
            regions: vec![],
            max_concurrent_tasks: None,
            daily_claim_limit: None,
        },
    )
    .await
    .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let review = ReviewTaskRepo::create(
        &mut tx,
        1,
        &CreateReviewTask {
            task_id: None,
            case_id: Some(9),
            order_id: None,
            lawyer_id: lawyer.id,
            document_type: "lawyer_letter".to_string(),
            content: "Dear debtor,\nPlease pay.".to_string(),
            priority: None,
            deadline: None,
            requires_signature: false,
            auto_approve: false,
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
    review
}

async fn step(pool: &PgPool, id: i64, from: ReviewStatus, to: ReviewStatus) -> Option<DocumentReviewTask> {
    let mut tx = pool.begin().await.unwrap();
    let row = ReviewTaskRepo::transition(&mut tx, id, from, to).await.unwrap();
    tx.commit().await.unwrap();
    row
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_generates_task_number(pool: PgPool) {
    let review = new_review(&pool).await;
    assert!(review.task_number.starts_with("DR-"));
    assert_eq!(review.task_number.len(), "DR-20260301-000001".len());
    assert_eq!(review.status_id, ReviewStatus::Pending.id());
    assert_eq!(review.priority, 3);
    assert_eq!(review.current_content, review.original_content);
    assert!(review.final_content.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_final_content_follows_status(pool: PgPool) {
    use ReviewStatus::*;
    let review = new_review(&pool).await;

    step(&pool, review.id, Pending, InReview).await.unwrap();
    let approved = step(&pool, review.id, InReview, Approved).await.unwrap();
    assert!(approved.reviewed_at.is_some());
    assert!(approved.final_content.is_none());

    let authorized = step(&pool, review.id, Approved, Authorized).await.unwrap();
    assert_eq!(authorized.final_content.as_deref(), Some(review.current_content.as_str()));
    assert!(authorized.authorized_at.is_some());

    let sent = step(&pool, review.id, Authorized, Sent).await.unwrap();
    assert_eq!(sent.final_content, authorized.final_content);
    assert!(sent.sent_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_clears_final_content(pool: PgPool) {
    use ReviewStatus::*;
    let review = new_review(&pool).await;
    step(&pool, review.id, Pending, InReview).await.unwrap();
    step(&pool, review.id, InReview, Approved).await.unwrap();
    step(&pool, review.id, Approved, Authorized).await.unwrap();

    let cancelled = step(&pool, review.id, Authorized, Cancelled).await.unwrap();
    assert!(cancelled.final_content.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stale_transition_returns_none(pool: PgPool) {
    use ReviewStatus::*;
    let review = new_review(&pool).await;
    step(&pool, review.id, Pending, InReview).await.unwrap();

    assert!(step(&pool, review.id, Pending, InReview).await.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_modify_content_only_when_requested(pool: PgPool) {
    use ReviewStatus::*;
    let review = new_review(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    assert!(ReviewTaskRepo::modify_content(&mut tx, review.id, "edited")
        .await
        .unwrap()
        .is_none());
    tx.commit().await.unwrap();

    step(&pool, review.id, Pending, InReview).await.unwrap();
    step(&pool, review.id, InReview, ModificationRequested).await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    let modified = ReviewTaskRepo::modify_content(&mut tx, review.id, "edited")
        .await
        .unwrap()
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(modified.status_id, Modified.id());
    assert_eq!(modified.current_content, "edited");
    assert_eq!(modified.original_content, review.original_content);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_original_content_is_immutable(pool: PgPool) {
    let review = new_review(&pool).await;
    let result = sqlx::query("UPDATE document_review_tasks SET original_content = 'x' WHERE id = $1")
        .bind(review.id)
        .execute(&pool)
        .await;
    assert_matches!(result, Err(sqlx::Error::Database(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signature_respects_allowed_statuses(pool: PgPool) {
    let review = new_review(&pool).await;
    let signature = serde_json::json!({"signer_name": "A. Lawyer"});

    let signed = ReviewTaskRepo::attach_signature(&pool, review.id, &signature, &[ReviewStatus::Pending])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(signed.signature, Some(signature.clone()));
    assert!(signed.signed_at.is_some());

    assert!(ReviewTaskRepo::attach_signature(&pool, review.id, &signature, &[ReviewStatus::Approved])
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logs_are_append_only(pool: PgPool) {
    let review = new_review(&pool).await;

    let mut tx = pool.begin().await.unwrap();
    let log = ReviewLogRepo::insert(
        &mut tx,
        &NewReviewLog {
            review_task_id: review.id,
            old_status_id: ReviewStatus::Pending.id(),
            new_status_id: ReviewStatus::InReview.id(),
            actor_user_id: 1,
            comment: Some("starting"),
            content_diff: None,
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let update = sqlx::query("UPDATE document_review_logs SET comment = 'x' WHERE id = $1")
        .bind(log.id)
        .execute(&pool)
        .await;
    assert_matches!(update, Err(sqlx::Error::Database(_)));

    let delete = sqlx::query("DELETE FROM document_review_logs WHERE id = $1")
        .bind(log.id)
        .execute(&pool)
        .await;
    assert_matches!(delete, Err(sqlx::Error::Database(_)));

    let history = ReviewLogRepo::list_for_review(&pool, review.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].comment.as_deref(), Some("starting"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_lawyer_and_status(pool: PgPool) {
    let review = new_review(&pool).await;
    step(&pool, review.id, ReviewStatus::Pending, ReviewStatus::InReview)
        .await
        .unwrap();

    let in_review = ReviewTaskRepo::list(&pool, Some(review.lawyer_id), Some(ReviewStatus::InReview), None, None)
        .await
        .unwrap();
    assert_eq!(in_review.len(), 1);

    let pending = ReviewTaskRepo::list(&pool, None, Some(ReviewStatus::Pending), None, None)
        .await
        .unwrap();
    assert!(pending.is_empty());
}
