use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use casework_api::background::BackgroundTasks;
use casework_api::config::ServerConfig;
use casework_api::router::build_app_router;
use casework_api::state::AppState;
use casework_engine::{Engine, EngineConfig};
use casework_events::EventBus;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "casework_api=debug,casework_engine=debug,casework_events=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let engine_config = EngineConfig::from_env().expect("Invalid engine configuration");
    tracing::info!(
        host = %config.host,
        port = config.port,
        lawyer_daily_limit = engine_config.lawyer_daily_limit,
        user_daily_publish_limit = engine_config.user_daily_publish_limit,
        offer_timeout_secs = engine_config.offer_timeout.as_secs(),
        "Loaded configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = casework_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    casework_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    casework_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    // --- Engine and background tasks ---
    let event_bus = Arc::new(EventBus::default());
    let engine = Arc::new(Engine::new(pool.clone(), engine_config, Arc::clone(&event_bus)));
    let background = BackgroundTasks::start(Arc::clone(&engine), &event_bus);

    // --- Router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine,
        event_bus,
    };
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped accepting connections, stopping background tasks");
    background
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;
    tracing::info!("Graceful shutdown complete");
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
