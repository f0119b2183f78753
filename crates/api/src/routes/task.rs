use axum::routing::{get, post};
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// ```text
/// POST   /                    create_task
/// GET    /                    list_tasks
/// GET    /{id}                get_task
/// POST   /{id}/publish        publish_task
/// POST   /{id}/cancel         cancel_task
/// POST   /{id}/claim          claim_task
/// POST   /{id}/confirm        confirm_task
/// POST   /{id}/complete       complete_task
/// GET    /{id}/assignments    list_assignments
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(task::list_tasks).post(task::create_task))
        .route("/{id}", get(task::get_task))
        .route("/{id}/publish", post(task::publish_task))
        .route("/{id}/cancel", post(task::cancel_task))
        .route("/{id}/claim", post(task::claim_task))
        .route("/{id}/confirm", post(task::confirm_task))
        .route("/{id}/complete", post(task::complete_task))
        .route("/{id}/assignments", get(task::list_assignments))
}
