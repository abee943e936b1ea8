//! Snapshot diff engine.
//!
//! Computes the set of field paths that changed between two consecutive
//! snapshots of a streamed object.
//!
//! ## Entry point
//!
//! ```
//! use objstream_core::diff::compute_changes;
//! use serde_json::json;
//!
//! let prev = json!({ "user": { "name": "A" } });
//! let next = json!({ "user": { "name": "B" } });
//! let changes = compute_changes(Some(&prev), &next);
//! assert!(changes.contains_str("user"));
//! assert!(changes.contains_str("user.name"));
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce identical change sets.
//! - **Ancestor marking**: when a nested member changes, every enclosing
//!   object path is marked as well.
//! - **Additions and modifications only**: keys removed between snapshots
//!   are not reported.
//! - **Arrays are atomic**: an array is compared as a whole at its own path;
//!   element paths are only produced when the whole subtree is new.

pub mod engine;

pub use engine::{collect_all_paths, compute_changes};
