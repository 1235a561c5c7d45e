//! Two-tier caching for parsed telemetry tables.
//!
//! The persistent tier is SQLite with async access via tokio-rusqlite.
//! It supports:
//!
//! - Parsed results keyed by resource name, last write wins
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//!
//! The ephemeral tier is a one-shot cache-bust flag held in session-scoped
//! storage; arming it makes the next load bypass the persistent tier.

pub mod bust;
pub mod connection;
pub mod handle;
pub mod migrations;
pub mod parsed;

pub use crate::Error;

pub use bust::BustFlag;
pub use connection::CacheDb;
pub use handle::SharedCache;
pub use parsed::{EntryMeta, ParsedTable};
