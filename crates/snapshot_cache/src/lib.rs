//! # Snapshot Cache
//!
//! This crate stores the serialized listing snapshot between runs.
//! It exposes a small blob-store trait with an S3 implementation for
//! production and an in-memory implementation for tests and local runs.

/// Blob store trait and its implementations.
pub mod store;
/// Error types for cache access.
pub mod types;

pub use store::{MemorySnapshotStore, S3SnapshotStore, SnapshotStore};
pub use types::CacheError;
