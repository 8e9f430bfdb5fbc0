//! # SimpleTodo - URI-addressed to-do item store
//!
//! A single SQLite table of to-do items, reached through content URIs.
//!
//! SimpleTodo provides:
//! - A contract naming the table, its columns and value domains
//! - A lazily-opened SQLite store with schema versioning
//! - A CRUD dispatcher resolving `todo` / `todo/<id>` URIs, with validation
//! - A change-notification bus that writes publish to and cursors subscribe to

pub mod contract;
pub mod uri;
pub mod values;
pub mod cursor;
pub mod changes;
pub mod storage;
pub mod provider;
pub mod item;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use uri::{ContentUri, UriMatch};
pub use values::ContentValues;
pub use cursor::Cursor;
pub use changes::{ChangeBus, ChangeObserver, ObserverId, Subscription};
pub use storage::SqliteStore;
pub use provider::TodoProvider;
pub use item::{ItemFields, TodoItem};
pub use contract::{Priority, Status};

/// Result type alias for SimpleTodo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for SimpleTodo operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected request: bad identifier, unsupported operation or invalid field
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal state that should be unreachable
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Database version {found} is newer than supported version {supported}")]
    Downgrade { found: u32, supported: u32 },

    #[error("Store handle is read-only")]
    ReadOnly,
}

impl Error {
    /// Whether this is a caller mistake rather than a storage or internal fault
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_) | Error::InvalidUri(_))
    }
}
