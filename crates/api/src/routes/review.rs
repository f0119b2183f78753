use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::review;
use crate::state::AppState;

/// ```text
/// POST   /                    create_review
/// GET    /                    list_reviews
/// GET    /{id}                get_review
/// POST   /{id}/transition     transition_review
/// PUT    /{id}/content        modify_content
/// POST   /{id}/signature      attach_signature
/// GET    /{id}/logs           list_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(review::list_reviews).post(review::create_review))
        .route("/{id}", get(review::get_review))
        .route("/{id}/transition", post(review::transition_review))
        .route("/{id}/content", put(review::modify_content))
        .route("/{id}/signature", post(review::attach_signature))
        .route("/{id}/logs", get(review::list_logs))
}
