//! Conditional update and upsert.
//!
//! [`Updater::apply`] diffs a request against a record, applies the dirty
//! fields in memory, logs one change event and persists only when at
//! least one field changed. [`UpsertUpdater::apply_or_create`] puts a
//! find-or-create in front of it.

pub mod options;
pub mod request;
pub mod updater;
pub mod upsert;

pub use options::{UpdateFields, UpdateOptions};
pub use request::UpdateRequest;
pub use updater::Updater;
pub use upsert::{UpsertOutcome, UpsertUpdater};
