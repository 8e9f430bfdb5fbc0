//! Contract - table name, columns and value domains for to-do items
//!
//! Every other module names the `todo` table and its columns through the
//! constants here:
//! - `_id`: row id assigned by storage
//! - `name`: required item title
//! - `notes`: optional free text
//! - `priority`: [`Priority`] code
//! - `status`: [`Status`] code

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Authority under which every resource identifier lives
pub const CONTENT_AUTHORITY: &str = "com.codepath.simpletodo";

/// Scheme prefix of rendered identifiers
pub const SCHEME: &str = "content";

/// Path segment naming the item collection
pub const PATH_TODO: &str = "todo";

/// Backing table name
pub const TABLE_NAME: &str = "todo";

pub const COLUMN_ID: &str = "_id";
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_NOTES: &str = "notes";
pub const COLUMN_PRIORITY: &str = "priority";
pub const COLUMN_STATUS: &str = "status";

/// All columns in table order
pub const ALL_COLUMNS: &[&str] = &[
    COLUMN_ID,
    COLUMN_NAME,
    COLUMN_NOTES,
    COLUMN_PRIORITY,
    COLUMN_STATUS,
];

/// Type string returned for the collection identifier
pub const CONTENT_LIST_TYPE: &str = "vnd.android.cursor.dir/com.codepath.simpletodo/todo";

/// Type string returned for a single-item identifier
pub const CONTENT_ITEM_TYPE: &str = "vnd.android.cursor.item/com.codepath.simpletodo/todo";

/// Whether `column` names a column of the `todo` table
pub fn is_known_column(column: &str) -> bool {
    ALL_COLUMNS.contains(&column)
}

/// Returns true iff `value` is a valid [`Priority`] code
pub fn is_valid_priority(value: i64) -> bool {
    Priority::from_code(value).is_some()
}

/// Returns true iff `value` is a valid [`Status`] code
pub fn is_valid_status(value: i64) -> bool {
    Status::from_code(value).is_some()
}

/// Priority of an item, stored as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    /// Integer code persisted in the `priority` column
    pub fn code(&self) -> i64 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Priority::Low),
            1 => Some(Priority::Medium),
            2 => Some(Priority::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn all() -> &'static [Priority] {
        &[Priority::Low, Priority::Medium, Priority::High]
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" | "0" => Ok(Priority::Low),
            "medium" | "med" | "m" | "1" => Ok(Priority::Medium),
            "high" | "h" | "2" => Ok(Priority::High),
            _ => Err(Error::InvalidArgument(format!("Unknown priority: {}", s))),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress state of an item, stored as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    /// Integer code persisted in the `status` column
    pub fn code(&self) -> i64 {
        match self {
            Status::Todo => 0,
            Status::InProgress => 1,
            Status::Done => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Status::Todo),
            1 => Some(Status::InProgress),
            2 => Some(Status::Done),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        }
    }

    pub fn all() -> &'static [Status] {
        &[Status::Todo, Status::InProgress, Status::Done]
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "todo" | "to_do" | "0" => Ok(Status::Todo),
            "in_progress" | "inprogress" | "doing" | "1" => Ok(Status::InProgress),
            "done" | "complete" | "2" => Ok(Status::Done),
            _ => Err(Error::InvalidArgument(format!("Unknown status: {}", s))),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
