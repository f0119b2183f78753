//! HTTP tests for task publishing, claiming and confirmation.

mod common;

use axum::http::StatusCode;
use casework_engine::EngineConfig;
use common::{
    admin_token, body_json, build_test_app, build_test_app_with, get_auth, post_auth,
    post_json_auth, publish_task, put_json_auth, register_lawyer, token,
};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lawyer_claims_and_accepts(pool: PgPool) {
    let lawyer_id = register_lawyer(&pool, 500, None).await;
    let task_id = publish_task(&pool, "Collect overdue invoice").await;
    let lawyer = token(500, "lawyer");

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{task_id}/claim"),
        &lawyer,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["task"]["assigned_lawyer_id"], lawyer_id);
    assert_eq!(json["data"]["assignment"]["lawyer_id"], lawyer_id);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{task_id}/confirm"),
        &lawyer,
        serde_json::json!({"action": "accept"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["assignment"]["resolution"], "accepted");

    let response = post_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{task_id}/complete"),
        &lawyer,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/v1/tasks/{task_id}/assignments"),
        &lawyer,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_claim_without_body(pool: PgPool) {
    let lawyer_id = register_lawyer(&pool, 510, None).await;
    let task_id = publish_task(&pool, "Claim with an empty request").await;

    let response = post_auth(
        build_test_app(pool),
        &format!("/api/v1/tasks/{task_id}/claim"),
        &token(510, "lawyer"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["task"]["assigned_lawyer_id"], lawyer_id);
    assert_eq!(json["data"]["assignment"]["lawyer_id"], lawyer_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_claim_is_task_unavailable(pool: PgPool) {
    register_lawyer(&pool, 501, None).await;
    register_lawyer(&pool, 502, None).await;
    let task_id = publish_task(&pool, "T").await;
    let uri = format!("/api/v1/tasks/{task_id}/claim");

    let first = post_json_auth(build_test_app(pool.clone()), &uri, &token(501, "lawyer"), serde_json::json!({})).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = post_json_auth(build_test_app(pool), &uri, &token(502, "lawyer"), serde_json::json!({})).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["code"], "TASK_UNAVAILABLE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_claim_over_quota_is_429(pool: PgPool) {
    register_lawyer(&pool, 503, Some(1)).await;
    let first = publish_task(&pool, "A").await;
    let second = publish_task(&pool, "B").await;
    let lawyer = token(503, "lawyer");

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{first}/claim"),
        &lawyer,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{second}/claim"),
        &lawyer,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert_eq!(json["code"], "QUOTA_EXHAUSTED");
    assert_eq!(json["details"]["max"], 1);

    let response = get_auth(build_test_app(pool), "/api/v1/tasks?status=published", &lawyer).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_dispatch_without_candidates_is_404(pool: PgPool) {
    let task_id = publish_task(&pool, "Nobody home").await;

    let response = post_json_auth(
        build_test_app(pool),
        &format!("/api/v1/tasks/{task_id}/claim"),
        &admin_token(),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NO_ELIGIBLE_LAWYER");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_confirm_by_non_assignee_is_403(pool: PgPool) {
    register_lawyer(&pool, 504, None).await;
    register_lawyer(&pool, 505, None).await;
    let task_id = publish_task(&pool, "T").await;

    post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{task_id}/claim"),
        &token(504, "lawyer"),
        serde_json::json!({}),
    )
    .await;

    let response = post_json_auth(
        build_test_app(pool),
        &format!("/api/v1/tasks/{task_id}/confirm"),
        &token(505, "lawyer"),
        serde_json::json!({"action": "accept"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "NOT_ASSIGNEE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_repeated_reject_is_invalid_state(pool: PgPool) {
    let lawyer_id = register_lawyer(&pool, 506, None).await;
    let task_id = publish_task(&pool, "T").await;
    let lawyer = token(506, "lawyer");
    let uri = format!("/api/v1/tasks/{task_id}/confirm");

    post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{task_id}/claim"),
        &lawyer,
        serde_json::json!({}),
    )
    .await;
    let reject = serde_json::json!({"action": "reject", "reason": "too busy"});

    let first = post_json_auth(build_test_app(pool.clone()), &uri, &lawyer, reject.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await["data"]["task"]["status_id"], 2);

    let second = post_json_auth(build_test_app(pool.clone()), &uri, &lawyer, reject).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["code"], "INVALID_STATE");

    // The rejected claim was refunded.
    let quota = get_auth(
        build_test_app(pool),
        &format!("/api/v1/lawyers/{lawyer_id}/quota"),
        &lawyer,
    )
    .await;
    assert_eq!(body_json(quota).await["data"]["used"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_client_publish_quota(pool: PgPool) {
    let config = EngineConfig {
        user_daily_publish_limit: 1,
        ..EngineConfig::default()
    };
    let client = token(80, "client");
    let body = serde_json::json!({"task_type": "contract_review", "title": "Review NDA"});

    let first = post_json_auth(build_test_app_with(pool.clone(), config.clone()), "/api/v1/tasks", &client, body.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json_auth(build_test_app_with(pool.clone(), config), "/api/v1/tasks", &client, body).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(second).await["details"]["kind"], "user");

    let quota = get_auth(build_test_app(pool), "/api/v1/users/me/publish-quota", &client).await;
    let json = body_json(quota).await;
    assert_eq!(json["data"]["used"], 1);
    assert_eq!(json["data"]["remaining"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_client_cannot_claim(pool: PgPool) {
    let task_id = publish_task(&pool, "T").await;
    let response = post_json_auth(
        build_test_app(pool),
        &format!("/api/v1/tasks/{task_id}/claim"),
        &token(90, "client"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_status_filter_is_400(pool: PgPool) {
    let response = get_auth(build_test_app(pool), "/api/v1/tasks?status=lost", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_lawyer_profile_is_409(pool: PgPool) {
    register_lawyer(&pool, 600, None).await;
    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/lawyers",
        &admin_token(),
        serde_json::json!({"user_id": 600, "display_name": "Again"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lawyer_quota_and_workload(pool: PgPool) {
    let lawyer_id = register_lawyer(&pool, 700, Some(4)).await;
    let task_id = publish_task(&pool, "T").await;
    let lawyer = token(700, "lawyer");
    post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{task_id}/claim"),
        &lawyer,
        serde_json::json!({}),
    )
    .await;

    let quota = get_auth(build_test_app(pool.clone()), &format!("/api/v1/lawyers/{lawyer_id}/quota"), &lawyer).await;
    let json = body_json(quota).await;
    assert_eq!(json["data"]["used"], 1);
    assert_eq!(json["data"]["max"], 4);

    let refreshed = post_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/lawyers/{lawyer_id}/workload/refresh"),
        &admin_token(),
    )
    .await;
    assert_eq!(refreshed.status(), StatusCode::OK);
    assert_eq!(body_json(refreshed).await["data"]["active_cases"], 1);

    let forbidden = post_auth(
        build_test_app(pool),
        &format!("/api/v1/lawyers/{lawyer_id}/workload/refresh"),
        &lawyer,
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivated_lawyer_is_not_eligible(pool: PgPool) {
    let lawyer_id = register_lawyer(&pool, 560, None).await;
    let task_id = publish_task(&pool, "Held back while inactive").await;
    let active_uri = format!("/api/v1/lawyers/{lawyer_id}/active");

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &active_uri,
        &token(560, "lawyer"),
        serde_json::json!({"is_active": false}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &active_uri,
        &admin_token(),
        serde_json::json!({"is_active": false}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_active"], false);

    let claim_uri = format!("/api/v1/tasks/{task_id}/claim");
    let response = post_auth(build_test_app(pool.clone()), &claim_uri, &token(560, "lawyer")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NO_ELIGIBLE_LAWYER");

    put_json_auth(
        build_test_app(pool.clone()),
        &active_uri,
        &admin_token(),
        serde_json::json!({"is_active": true}),
    )
    .await;
    let response = post_auth(build_test_app(pool), &claim_uri, &token(560, "lawyer")).await;
    assert_eq!(response.status(), StatusCode::OK);
}
