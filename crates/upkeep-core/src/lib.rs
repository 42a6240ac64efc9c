//! Update orchestration engine for Upkeep.
//!
//! This crate contains the update logic shared by the interactive and
//! unattended front-ends:
//! - Version identifier parsing and release ordering.
//! - The persisted version record and its atomic updates.
//! - Remote release manifest fetching.
//! - Pre-update backup snapshots.
//! - The end-to-end check → confirm → backup → install → commit engine.

pub mod backup;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod store;
pub mod version;

/// Update run entry point, its configuration, outcome, and the injected
/// confirmation/report capability.
pub use engine::{UpdateConfig, UpdateOutcome, UpdateReporter, run_update};
/// The error taxonomy of an update run.
pub use error::UpdateError;
/// Release manifest wire types and fetch helper.
pub use manifest::{FileEntry, Manifest};
/// Persisted version record.
pub use store::VersionRecord;
/// Version grammar, ordering, and string comparison helper.
pub use version::{Channel, Version, VersionParseError, compare};
