//! Core types and shared functionality for pitwall.
//!
//! This crate provides:
//! - The two-tier cache: a session-scoped bust flag and a SQLite-backed
//!   store of parsed tables
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{BustFlag, CacheDb, EntryMeta, ParsedTable, SharedCache};
pub use config::AppConfig;
pub use error::Error;
