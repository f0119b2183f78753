//! In-process domain events for the claim and review engine.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the event envelope.
//! - [`event_types`]: names of every event the engine publishes.
//! - [`EventLogger`]: background subscriber that records each event through
//!   `tracing`, and the hand-off point for the external dispatch collaborator.

pub mod bus;
pub mod event_types;
pub mod logger;

pub use bus::{EventBus, PlatformEvent};
pub use logger::EventLogger;
