//! Typed view of rows in the todo table

use crate::contract::{self, Priority, Status};
use crate::cursor::Cursor;
use crate::values::ContentValues;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single to-do item as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Row id, assigned by storage
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
    pub priority: Priority,
    pub status: Status,
}

impl TodoItem {
    /// Read the row the cursor currently points at.
    ///
    /// The cursor must carry all five columns (a `None` projection does).
    pub fn from_cursor(cursor: &Cursor) -> Result<Self> {
        let column = |name: &str| {
            cursor
                .column_index(name)
                .ok_or_else(|| Error::InvalidArgument(format!("cursor lacks column {}", name)))
        };

        let id = cursor
            .get_i64(column(contract::COLUMN_ID)?)?
            .ok_or_else(|| Error::IllegalState("row without _id".to_string()))?;
        let name = cursor.get_string(column(contract::COLUMN_NAME)?)?.unwrap_or_default();
        let notes = cursor.get_string(column(contract::COLUMN_NOTES)?)?;

        let priority_code = cursor.get_i64(column(contract::COLUMN_PRIORITY)?)?.unwrap_or(0);
        let priority = Priority::from_code(priority_code).ok_or_else(|| {
            Error::IllegalState(format!("item {} has invalid priority {}", id, priority_code))
        })?;

        let status_code = cursor.get_i64(column(contract::COLUMN_STATUS)?)?.unwrap_or(0);
        let status = Status::from_code(status_code).ok_or_else(|| {
            Error::IllegalState(format!("item {} has invalid status {}", id, status_code))
        })?;

        Ok(Self { id, name, notes, priority, status })
    }

    /// Read every row of the cursor, leaving it positioned after the last row
    pub fn all_from_cursor(cursor: &mut Cursor) -> Result<Vec<Self>> {
        let mut items = Vec::with_capacity(cursor.count());
        let mut more = cursor.move_to_first();
        while more {
            items.push(Self::from_cursor(cursor)?);
            more = cursor.move_to_next();
        }
        Ok(items)
    }
}

/// Field set for creating or editing an item; `None` fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFields {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
}

impl ItemFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// True when every field is absent, blank or at its default
    pub fn is_blank(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.name)
            && blank(&self.notes)
            && self.priority.unwrap_or_default() == Priority::default()
            && self.status.unwrap_or_default() == Status::default()
    }

    pub fn to_values(&self) -> ContentValues {
        let mut values = ContentValues::new();
        if let Some(name) = &self.name {
            values.put(contract::COLUMN_NAME, name.trim().to_string());
        }
        if let Some(notes) = &self.notes {
            values.put(contract::COLUMN_NOTES, notes.trim().to_string());
        }
        if let Some(priority) = self.priority {
            values.put(contract::COLUMN_PRIORITY, priority.code());
        }
        if let Some(status) = self.status {
            values.put(contract::COLUMN_STATUS, status.code());
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Value;

    #[test]
    fn test_from_cursor() {
        let mut cursor = Cursor::new(
            contract::ALL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            vec![vec![
                Value::Integer(4),
                Value::Text("Write report".to_string()),
                Value::Null,
                Value::Integer(2),
                Value::Integer(1),
            ]],
        );

        let items = TodoItem::all_from_cursor(&mut cursor).unwrap();
        assert_eq!(
            items,
            vec![TodoItem {
                id: 4,
                name: "Write report".to_string(),
                notes: None,
                priority: Priority::High,
                status: Status::InProgress,
            }]
        );
    }

    #[test]
    fn test_from_cursor_needs_all_columns() {
        let mut cursor = Cursor::new(vec!["_id".to_string()], vec![vec![Value::Integer(1)]]);
        cursor.move_to_first();
        assert!(TodoItem::from_cursor(&cursor).is_err());
    }

    #[test]
    fn test_fields_to_values() {
        let values = ItemFields::new("  Call mom ").priority(Priority::Medium).to_values();
        assert_eq!(values.get_str("name"), Some("Call mom"));
        assert_eq!(values.get_i64("priority"), Some(1));
        assert!(!values.contains_key("status"));
        assert!(!values.contains_key("notes"));
    }

    #[test]
    fn test_blank_fields() {
        assert!(ItemFields::default().is_blank());
        assert!(ItemFields::new("  ").notes("").priority(Priority::Low).is_blank());
        assert!(!ItemFields::default().status(Status::Done).is_blank());
        assert!(!ItemFields::new("x").is_blank());
    }
}
