//! Background subscriber that writes every event to the log.
//!
//! `review.document_sent` is logged at `info` with the fields the dispatch
//! collaborator needs; everything else at `debug`.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::PlatformEvent;
use crate::event_types;

pub struct EventLogger;

impl EventLogger {
    /// Run until the bus closes or `cancel` fires.
    pub async fn run(mut receiver: broadcast::Receiver<PlatformEvent>, cancel: CancellationToken) {
        tracing::info!("Event logger started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Event logger stopping");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => Self::record(&event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Event logger lagged behind the bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, event logger shutting down");
                        break;
                    }
                },
            }
        }
    }

    fn record(event: &PlatformEvent) {
        if event.event_type == event_types::REVIEW_DOCUMENT_SENT {
            tracing::info!(
                review_task_id = ?event.source_entity_id,
                task_number = %event.payload["task_number"],
                case_id = %event.payload["case_id"],
                "Document ready for dispatch"
            );
        } else {
            tracing::debug!(
                event_type = %event.event_type,
                entity_type = ?event.source_entity_type,
                entity_id = ?event.source_entity_id,
                actor_user_id = ?event.actor_user_id,
                payload = %event.payload,
                "Domain event"
            );
        }
    }
}
