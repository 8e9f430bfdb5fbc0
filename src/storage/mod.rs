//! Storage Layer - SQLite-backed persistence
//!
//! A single database file holds one table:
//! - todo(_id, name, notes, priority, status)

pub mod schema;
pub mod sqlite;

pub use sqlite::{Access, SqliteStore, StoreHandle};
