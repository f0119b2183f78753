//! Task creation, publishing and cancellation with the publish quota.

mod common;

use assert_matches::assert_matches;
use casework_core::error::CoreError;
use casework_core::quota::ActorKind;
use casework_core::status::TaskStatus;
use casework_db::repositories::TaskRepo;
use casework_engine::{quota, EngineConfig, EngineError};
use common::{build_engine, client, new_task, operator, seed_lawyer, test_config};
use sqlx::PgPool;

fn limited(publish_limit: i32) -> EngineConfig {
    EngineConfig {
        user_daily_publish_limit: publish_limit,
        ..test_config()
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publish_quota_is_enforced(pool: PgPool) {
    let (engine, _) = build_engine(&pool, limited(2));

    engine.publisher.create(&new_task("one"), client(50)).await.unwrap();
    engine.publisher.create(&new_task("two"), client(50)).await.unwrap();
    let err = engine.publisher.create(&new_task("three"), client(50)).await.unwrap_err();

    assert_matches!(
        err,
        EngineError::Core(CoreError::QuotaExhausted { kind: ActorKind::User, actor_id: 50, max: 2 })
    );
    // The refused task was rolled back with the quota check.
    let all = TaskRepo::list(&pool, None, None, None).await.unwrap();
    assert_eq!(all.len(), 2);

    // Other users and operators are unaffected.
    engine.publisher.create(&new_task("four"), client(51)).await.unwrap();
    engine.publisher.create(&new_task("five"), operator()).await.unwrap();

    let status = quota::today(&pool, ActorKind::User, 50, 2).await.unwrap();
    assert_eq!((status.used, status.remaining), (2, 0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_draft_publish_and_cancel(pool: PgPool) {
    let (engine, _) = build_engine(&pool, limited(1));

    let mut draft = new_task("draft");
    draft.publish = Some(false);
    let task = engine.publisher.create(&draft, client(60)).await.unwrap();
    assert_eq!(task.status_id, TaskStatus::Pending.id());
    assert!(quota::today(&pool, ActorKind::User, 60, 1).await.unwrap().used == 0);

    let err = engine.publisher.publish(task.id, client(61)).await.unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Forbidden(_)));

    let published = engine.publisher.publish(task.id, client(60)).await.unwrap();
    assert_eq!(published.status_id, TaskStatus::Published.id());
    assert!(published.published_at.is_some());

    let err = engine.publisher.publish(task.id, client(60)).await.unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::InvalidState(_)));

    let cancelled = engine.publisher.cancel(task.id, client(60)).await.unwrap();
    assert_eq!(cancelled.status_id, TaskStatus::Cancelled.id());
    assert!(cancelled.cancelled_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cannot_cancel_claimed_task(pool: PgPool) {
    let (engine, _) = build_engine(&pool, test_config());
    seed_lawyer(&pool, 70, None).await;
    let task = engine.publisher.create(&new_task("t"), operator()).await.unwrap();
    engine.scheduler.claim(task.id, None, None).await.unwrap();

    let err = engine.publisher.cancel(task.id, operator()).await.unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::InvalidState(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_rejects_blank_title(pool: PgPool) {
    let (engine, _) = build_engine(&pool, test_config());
    let err = engine.publisher.create(&new_task("   "), operator()).await.unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Validation(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ingested_case_has_no_creator(pool: PgPool) {
    let (engine, _) = build_engine(&pool, test_config());

    let mut ingested = new_task("ingested from case 900");
    ingested.source_case_id = Some(900);
    let system_task = engine.publisher.create(&ingested, operator()).await.unwrap();
    assert_eq!(system_task.creator_user_id, None);
    assert_eq!(system_task.source_case_id, Some(900));

    // Operator-authored tasks without a source case keep their author.
    let authored = engine.publisher.create(&new_task("authored"), operator()).await.unwrap();
    assert_eq!(authored.creator_user_id, Some(common::OPERATOR_USER_ID));

    // A metered client referencing a case is still the creator.
    let mut referenced = new_task("client case");
    referenced.source_case_id = Some(901);
    let task = engine.publisher.create(&referenced, client(70)).await.unwrap();
    assert_eq!(task.creator_user_id, Some(70));

    // Ownerless tasks are out of reach for metered users.
    let err = engine.publisher.cancel(system_task.id, client(70)).await.unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Forbidden(_)));
}
