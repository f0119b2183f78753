use axum::routing::get;
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/me/publish-quota", get(user::my_publish_quota))
}
