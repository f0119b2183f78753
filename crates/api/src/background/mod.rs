//! Long-running tasks spawned next to the HTTP server.
//!
//! All of them stop on a shared [`CancellationToken`].

use std::sync::Arc;
use std::time::Duration;

use casework_engine::Engine;
use casework_events::{EventBus, EventLogger};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct BackgroundTasks {
    cancel: CancellationToken,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl BackgroundTasks {
    /// Spawn the offer timeout sweep, the periodic workload refresh and the
    /// event logger.
    pub fn start(engine: Arc<Engine>, events: &EventBus) -> Self {
        let cancel = CancellationToken::new();
        let mut handles = Vec::new();

        let sweep_engine = Arc::clone(&engine);
        let sweep_cancel = cancel.clone();
        handles.push((
            "offer_timeout",
            tokio::spawn(async move {
                sweep_engine.confirmation.run_offer_sweep(sweep_cancel).await;
            }),
        ));

        let refresh_cancel = cancel.clone();
        handles.push((
            "workload_refresh",
            tokio::spawn(async move {
                engine.workload.run(refresh_cancel).await;
            }),
        ));

        handles.push((
            "event_logger",
            tokio::spawn(EventLogger::run(events.subscribe(), cancel.clone())),
        ));

        tracing::info!(count = handles.len(), "Background tasks started");
        Self { cancel, handles }
    }

    /// Cancel every task and wait up to `timeout` for each to finish.
    pub async fn shutdown(self, timeout: Duration) {
        self.cancel.cancel();
        for (name, handle) in self.handles {
            match tokio::time::timeout(timeout, handle).await {
                Ok(Ok(())) => tracing::info!(task = name, "Background task stopped"),
                Ok(Err(e)) => tracing::error!(task = name, error = %e, "Background task panicked"),
                Err(_) => tracing::warn!(task = name, "Background task did not stop in time"),
            }
        }
    }
}
