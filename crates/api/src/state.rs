use std::sync::Arc;

use casework_engine::Engine;
use casework_events::EventBus;

use crate::config::ServerConfig;

/// Shared state handed to every handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: casework_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub engine: Arc<Engine>,
    pub event_bus: Arc<EventBus>,
}
