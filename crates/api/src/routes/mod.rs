pub mod health;
pub mod lawyer;
pub mod review;
pub mod task;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /tasks                                 create, list
/// /tasks/{id}                            get
/// /tasks/{id}/publish                    pending -> published (POST)
/// /tasks/{id}/cancel                     -> cancelled (POST)
/// /tasks/{id}/claim                      claim for a lawyer (POST)
/// /tasks/{id}/confirm                    accept / reject the offer (POST)
/// /tasks/{id}/complete                   accepted -> completed (POST)
/// /tasks/{id}/assignments                offer history
///
/// /review-tasks                          create, list
/// /review-tasks/{id}                     get
/// /review-tasks/{id}/transition          move through the workflow (POST)
/// /review-tasks/{id}/content             replace content (PUT)
/// /review-tasks/{id}/signature           attach signature (POST)
/// /review-tasks/{id}/logs                audit history
///
/// /lawyers                               register (admin)
/// /lawyers/{id}/workload                 snapshot
/// /lawyers/{id}/workload/refresh         recompute (admin, POST)
/// /lawyers/{id}/quota                    today's claim quota
///
/// /users/me/publish-quota                caller's publish quota
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/tasks", task::router())
        .nest("/review-tasks", review::router())
        .nest("/lawyers", lawyer::router())
        .nest("/users", user::router())
}
