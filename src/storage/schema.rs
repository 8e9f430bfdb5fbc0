//! Database schema definitions

/// Name of the database file
pub const DATABASE_NAME: &str = "simpletodo.db";

/// Schema version stored in `PRAGMA user_version`. Bump together with a
/// step in [`upgrade_statements`] whenever the schema changes.
pub const DATABASE_VERSION: u32 = 1;

/// SQL to create the todo table
pub const CREATE_TODO_TABLE: &str = r#"
CREATE TABLE todo (
    _id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    notes TEXT,
    priority INTEGER NOT NULL DEFAULT 0,
    status INTEGER NOT NULL DEFAULT 0
)
"#;

/// Statements run when the database is created for the first time
pub fn create_statements() -> Vec<&'static str> {
    vec![CREATE_TODO_TABLE]
}

/// Statements that move a database from `from` to `from + 1`.
///
/// Nothing exists beyond version 1 yet.
pub fn upgrade_statements(_from: u32) -> Vec<&'static str> {
    Vec::new()
}
