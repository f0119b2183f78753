use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::lawyer;
use crate::state::AppState;

/// ```text
/// POST   /                        create_lawyer (admin)
/// PUT    /{id}/active             set_active (admin)
/// GET    /{id}/workload           get_workload
/// POST   /{id}/workload/refresh   refresh_workload (admin)
/// GET    /{id}/quota              get_quota
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(lawyer::create_lawyer))
        .route("/{id}/active", put(lawyer::set_active))
        .route("/{id}/workload", get(lawyer::get_workload))
        .route("/{id}/workload/refresh", post(lawyer::refresh_workload))
        .route("/{id}/quota", get(lawyer::get_quota))
}
