//! Domain types, state machines, and pure business rules for the task claim
//! and document review engine.
//!
//! This crate has zero internal dependencies so it can be shared by the
//! repository layer, the engine, and the HTTP API alike.

pub mod diff;
pub mod error;
pub mod quota;
pub mod review;
pub mod roles;
pub mod scoring;
pub mod status;
pub mod task;
pub mod types;
