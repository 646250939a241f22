//! Structured logging facility for objsync
//!
//! This module provides:
//! - Single initialization point via `init(profile)`
//! - The `ChangeLog` sink trait and its `tracing`-backed default
//! - Structured logging macros (`log_record_updated!`, `log_record_created!`,
//!   `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use objsync_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```

pub mod change_log;
pub mod init;
pub mod macros;
pub mod test_capture;

pub use change_log::{ChangeLog, NoopChangeLog, TracingChangeLog, DEFAULT_CHANGE_LOG};
pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
