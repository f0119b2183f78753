//! Integration tests for the daily quota ledger.

use casework_core::quota::ActorKind;
use casework_db::models::lawyer::CreateLawyer;
use casework_db::repositories::{LawyerRepo, QuotaRepo};
use chrono::NaiveDate;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

async fn new_lawyer(pool: &PgPool, user_id: i64) -> i64 {
    LawyerRepo::create(
        pool,
        &CreateLawyer {
            user_id,
            display_name: format!("Lawyer {user_id}"),
            specialties: vec!["debt_collection".to_string()],
            regions: vec![],
            max_concurrent_tasks: None,
            daily_claim_limit: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn consume(pool: &PgPool, kind: ActorKind, actor: i64, date: NaiveDate, max: i32) -> bool {
    let mut tx = pool.begin().await.unwrap();
    let outcome = QuotaRepo::try_consume(&mut tx, kind, actor, date, max)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    outcome.ok
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_consume_until_exhausted(pool: PgPool) {
    let lawyer = new_lawyer(&pool, 100).await;

    let mut tx = pool.begin().await.unwrap();
    let first = QuotaRepo::try_consume(&mut tx, ActorKind::Lawyer, lawyer, day(1), 2)
        .await
        .unwrap();
    let second = QuotaRepo::try_consume(&mut tx, ActorKind::Lawyer, lawyer, day(1), 2)
        .await
        .unwrap();
    let third = QuotaRepo::try_consume(&mut tx, ActorKind::Lawyer, lawyer, day(1), 2)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert!(first.ok);
    assert_eq!(first.remaining, 1);
    assert!(second.ok);
    assert_eq!(second.remaining, 0);
    assert!(!third.ok);
    assert_eq!(third.remaining, 0);

    let row = QuotaRepo::find(&pool, ActorKind::Lawyer, lawyer, day(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.used, 2);
    assert_eq!(row.max_daily_limit, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_date_starts_fresh_row(pool: PgPool) {
    let lawyer = new_lawyer(&pool, 101).await;
    assert!(consume(&pool, ActorKind::Lawyer, lawyer, day(1), 1).await);
    assert!(!consume(&pool, ActorKind::Lawyer, lawyer, day(1), 1).await);
    assert!(consume(&pool, ActorKind::Lawyer, lawyer, day(2), 1).await);

    let rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lawyer_daily_limits WHERE lawyer_id = $1")
        .bind(lawyer)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows.0, 2, "yesterday's row is kept as history");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_release_is_bounded_at_zero(pool: PgPool) {
    let lawyer = new_lawyer(&pool, 102).await;
    assert!(consume(&pool, ActorKind::Lawyer, lawyer, day(1), 3).await);

    let mut tx = pool.begin().await.unwrap();
    assert!(QuotaRepo::release(&mut tx, ActorKind::Lawyer, lawyer, day(1)).await.unwrap());
    assert!(!QuotaRepo::release(&mut tx, ActorKind::Lawyer, lawyer, day(1)).await.unwrap());
    assert!(!QuotaRepo::release(&mut tx, ActorKind::Lawyer, lawyer, day(9)).await.unwrap());
    tx.commit().await.unwrap();

    let row = QuotaRepo::find(&pool, ActorKind::Lawyer, lawyer, day(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.used, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rolled_back_consume_leaves_no_trace(pool: PgPool) {
    let lawyer = new_lawyer(&pool, 103).await;

    let mut tx = pool.begin().await.unwrap();
    let outcome = QuotaRepo::try_consume(&mut tx, ActorKind::Lawyer, lawyer, day(1), 1)
        .await
        .unwrap();
    assert!(outcome.ok);
    tx.rollback().await.unwrap();

    assert!(QuotaRepo::find(&pool, ActorKind::Lawyer, lawyer, day(1))
        .await
        .unwrap()
        .is_none());
    assert!(consume(&pool, ActorKind::Lawyer, lawyer, day(1), 1).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_publish_ledger_is_separate(pool: PgPool) {
    // Same numeric id in both ledgers must not share a counter.
    let lawyer = new_lawyer(&pool, 104).await;
    assert!(consume(&pool, ActorKind::Lawyer, lawyer, day(1), 1).await);
    assert!(consume(&pool, ActorKind::User, lawyer, day(1), 1).await);
    assert!(!consume(&pool, ActorKind::User, lawyer, day(1), 1).await);

    let row = QuotaRepo::find(&pool, ActorKind::User, lawyer, day(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.used, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_consumes_never_exceed_max(pool: PgPool) {
    let lawyer = new_lawyer(&pool, 105).await;
    let max = 3;

    let attempts = (0..12).map(|_| consume(&pool, ActorKind::Lawyer, lawyer, day(1), max));
    let results = futures::future::join_all(attempts).await;

    assert_eq!(results.iter().filter(|ok| **ok).count(), max as usize);
    let row = QuotaRepo::find(&pool, ActorKind::Lawyer, lawyer, day(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.used, max);
}
