//! Result sets returned by queries

use crate::changes::{ChangeBus, Subscription};
use std::sync::Arc;
use crate::uri::ContentUri;
use crate::{Error, Result};
use rusqlite::types::Value;

/// Restartable, materialised result of a query.
///
/// A cursor starts positioned before the first row. Rows and any change
/// subscription are released by [`Cursor::close`] or on drop, whichever
/// comes first.
#[derive(Debug)]
pub struct Cursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    /// -1 = before first, `rows.len()` = after last
    position: isize,
    closed: bool,
    subscription: Option<Subscription>,
}

impl Cursor {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            position: -1,
            closed: false,
            subscription: None,
        }
    }

    /// Tag this cursor with the identifier it was read from, so a later write
    /// to that identifier marks it stale.
    pub fn set_notification_uri(&mut self, bus: &Arc<ChangeBus>, uri: &ContentUri) {
        self.subscription = Some(bus.subscribe(uri, true));
    }

    /// Whether any change was published for the tagged identifier since the
    /// last call. Pending notifications are consumed.
    pub fn has_changed(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|s| !s.drain().is_empty())
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn position(&self) -> isize {
        self.position
    }

    pub fn move_to_first(&mut self) -> bool {
        self.move_to_position(0)
    }

    pub fn move_to_next(&mut self) -> bool {
        self.move_to_position(self.position + 1)
    }

    /// Move to `position`, clamped to the before-first/after-last sentinels.
    /// Returns whether the cursor now points at a row.
    pub fn move_to_position(&mut self, position: isize) -> bool {
        let len = self.rows.len() as isize;
        self.position = position.clamp(-1, len);
        self.position >= 0 && self.position < len
    }

    /// Value in `column` of the current row
    pub fn get(&self, column: usize) -> Result<&Value> {
        let row = self.current_row()?;
        row.get(column).ok_or_else(|| {
            Error::InvalidArgument(format!("column index {} out of range ({})", column, row.len()))
        })
    }

    pub fn get_i64(&self, column: usize) -> Result<Option<i64>> {
        match self.get(column)? {
            Value::Integer(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            other => Err(Error::InvalidArgument(format!(
                "column {} is not an integer: {:?}",
                self.columns[column], other
            ))),
        }
    }

    pub fn get_string(&self, column: usize) -> Result<Option<String>> {
        match self.get(column)? {
            Value::Text(s) => Ok(Some(s.clone())),
            Value::Integer(v) => Ok(Some(v.to_string())),
            Value::Real(v) => Ok(Some(v.to_string())),
            Value::Null => Ok(None),
            Value::Blob(_) => Err(Error::InvalidArgument(format!(
                "column {} holds a blob",
                self.columns[column]
            ))),
        }
    }

    pub fn is_null(&self, column: usize) -> Result<bool> {
        Ok(matches!(self.get(column)?, Value::Null))
    }

    /// Iterate all rows from the start, independent of the cursor position
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Release rows and unsubscribe. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.rows = Vec::new();
        self.position = -1;
        self.subscription = None;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn current_row(&self) -> Result<&Vec<Value>> {
        if self.closed {
            return Err(Error::IllegalState("cursor is closed".to_string()));
        }
        usize::try_from(self.position)
            .ok()
            .and_then(|p| self.rows.get(p))
            .ok_or_else(|| Error::IllegalState(format!("cursor has no row at position {}", self.position)))
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        self.close();
    }
}
