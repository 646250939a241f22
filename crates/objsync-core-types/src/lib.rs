//! Core types shared across objsync facilities
//!
//! This crate provides the canonical field keys and event names used by
//! both the error facility and the change-log sinks, so every emitter and
//! every consumer of a structured log event agree on its shape.

pub mod schema;

pub use schema::{EVENT_CREATED, EVENT_END_ERROR, EVENT_UPDATED};
