//! SQLite storage implementation

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use rusqlite::{Connection, params_from_iter, types::Value};
use crate::{Result, Error};
use crate::cursor::Cursor;
use crate::values::ContentValues;
use super::schema;

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq)]
enum StoreLocation {
    Memory,
    File(PathBuf),
}

/// What a [`StoreHandle`] may do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// SQLite-backed storage for the todo table.
///
/// Construction does not touch disk. The connection is opened, and the schema
/// created or upgraded, on the first call to [`SqliteStore::open_for_read`]
/// or [`SqliteStore::open_for_write`]. Both hand out views of the same
/// connection.
pub struct SqliteStore {
    location: StoreLocation,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Store backed by a database file (created on first open)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_location(StoreLocation::File(path.into()))
    }

    /// Store backed by a private in-memory database (for testing)
    pub fn in_memory() -> Self {
        Self::with_location(StoreLocation::Memory)
    }

    fn with_location(location: StoreLocation) -> Self {
        Self {
            location,
            conn: Mutex::new(None),
        }
    }

    /// Whether the underlying connection has been opened yet
    pub fn is_open(&self) -> bool {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Handle usable for queries
    pub fn open_for_read(&self) -> Result<StoreHandle<'_>> {
        self.with_conn(|_| Ok(()))?;
        Ok(StoreHandle { store: self, access: Access::Read })
    }

    /// Handle usable for queries and writes
    pub fn open_for_write(&self) -> Result<StoreHandle<'_>> {
        self.with_conn(|_| Ok(()))?;
        Ok(StoreHandle { store: self, access: Access::Write })
    }

    /// Close the connection. The next open reopens it.
    ///
    /// An in-memory store loses its contents.
    pub fn close(&self) {
        let mut guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            tracing::debug!(location = ?self.location, "closed store");
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            *guard = Some(self.open_connection()?);
        }
        match guard.as_mut() {
            Some(conn) => f(conn),
            None => Err(Error::IllegalState("store connection missing".to_string())),
        }
    }

    fn open_connection(&self) -> Result<Connection> {
        let mut conn = match &self.location {
            StoreLocation::Memory => Connection::open_in_memory()?,
            StoreLocation::File(path) => Connection::open(path)?,
        };
        Self::initialize_schema(&mut conn)?;
        tracing::debug!(location = ?self.location, "opened store");
        Ok(conn)
    }

    /// Create or upgrade the schema according to `PRAGMA user_version`
    fn initialize_schema(conn: &mut Connection) -> Result<()> {
        let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version == schema::DATABASE_VERSION {
            return Ok(());
        }
        if version > schema::DATABASE_VERSION {
            return Err(Error::Downgrade {
                found: version,
                supported: schema::DATABASE_VERSION,
            });
        }

        let tx = conn.transaction()?;
        let run = |stmt: &str| {
            tx.execute(stmt, [])
                .map_err(|e| Error::Schema(format!("{} in `{}`", e, stmt.trim())))
        };

        if version == 0 {
            for stmt in schema::create_statements() {
                run(stmt)?;
            }
            tracing::info!(version = schema::DATABASE_VERSION, "created database schema");
        } else {
            for from in version..schema::DATABASE_VERSION {
                for stmt in schema::upgrade_statements(from) {
                    run(stmt)?;
                }
            }
            tracing::info!(from = version, to = schema::DATABASE_VERSION, "upgraded database schema");
        }

        tx.pragma_update(None, "user_version", schema::DATABASE_VERSION)?;
        tx.commit()?;
        Ok(())
    }
}

/// Scoped view of an opened [`SqliteStore`].
///
/// Statements are built from trusted identifiers (table and column names);
/// `selection` and `sort_order` are SQL fragments passed through verbatim,
/// with `?` placeholders bound from `selection_args`.
pub struct StoreHandle<'a> {
    store: &'a SqliteStore,
    access: Access,
}

impl<'a> StoreHandle<'a> {
    pub fn is_read_only(&self) -> bool {
        self.access == Access::Read
    }

    /// Schema version recorded in the database
    pub fn version(&self) -> Result<u32> {
        self.store
            .with_conn(|conn| Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?))
    }

    // ========== Reads ==========

    /// Run a `SELECT` and materialise the rows
    pub fn query(
        &self,
        table: &str,
        columns: Option<&[&str]>,
        selection: Option<&str>,
        selection_args: &[Value],
        sort_order: Option<&str>,
    ) -> Result<Cursor> {
        let columns = columns
            .filter(|c| !c.is_empty())
            .map(|c| c.join(", "))
            .unwrap_or_else(|| "*".to_string());

        let mut sql = format!("SELECT {} FROM {}", columns, table);
        push_where(&mut sql, selection);
        if let Some(order) = sort_order.filter(|s| !s.trim().is_empty()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        self.store.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let width = names.len();

            let rows = stmt
                .query_map(params_from_iter(selection_args.iter()), |row| {
                    (0..width).map(|i| row.get::<_, Value>(i)).collect::<rusqlite::Result<Vec<_>>>()
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(Cursor::new(names, rows))
        })
    }

    // ========== Writes ==========

    /// Insert a row and return its new row id
    pub fn insert(&self, table: &str, values: &ContentValues) -> Result<i64> {
        self.require_write()?;

        let sql = if values.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table)
        } else {
            let columns: Vec<&str> = values.keys().collect();
            let placeholders = vec!["?"; columns.len()].join(", ");
            format!("INSERT INTO {} ({}) VALUES ({})", table, columns.join(", "), placeholders)
        };

        self.store.with_conn(|conn| {
            conn.execute(&sql, params_from_iter(values.iter().map(|(_, v)| v)))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Update matching rows and return how many changed
    pub fn update(
        &self,
        table: &str,
        values: &ContentValues,
        selection: Option<&str>,
        selection_args: &[Value],
    ) -> Result<usize> {
        self.require_write()?;
        if values.is_empty() {
            return Err(Error::InvalidArgument("Empty values".to_string()));
        }

        let assignments: Vec<String> = values.keys().map(|c| format!("{} = ?", c)).collect();
        let mut sql = format!("UPDATE {} SET {}", table, assignments.join(", "));
        push_where(&mut sql, selection);

        let params = values.iter().map(|(_, v)| v).chain(selection_args.iter());
        self.store
            .with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(params))?))
    }

    /// Delete matching rows (all rows when `selection` is `None`)
    pub fn delete(&self, table: &str, selection: Option<&str>, selection_args: &[Value]) -> Result<usize> {
        self.require_write()?;

        let mut sql = format!("DELETE FROM {}", table);
        push_where(&mut sql, selection);

        self.store
            .with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(selection_args.iter()))?))
    }

    fn require_write(&self) -> Result<()> {
        match self.access {
            Access::Write => Ok(()),
            Access::Read => Err(Error::ReadOnly),
        }
    }
}

fn push_where(sql: &mut String, selection: Option<&str>) {
    if let Some(selection) = selection.filter(|s| !s.trim().is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(selection);
    }
}
