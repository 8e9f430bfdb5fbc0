//! Content URI - resource identifiers for the item store
//!
//! Format: `content://<authority>/todo[/<id>]`
//!
//! Examples:
//! - `content://com.codepath.simpletodo/todo` (the whole collection)
//! - `content://com.codepath.simpletodo/todo/3` (item with `_id` 3)
//!
//! The `content://` prefix is optional when parsing.

use crate::contract;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier naming either the item collection or a single item.
///
/// Parsing only checks structure; whether the provider understands the
/// identifier is decided by [`ContentUri::matches`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentUri {
    /// Authority (first segment)
    pub authority: String,
    /// Non-empty path segments after the authority
    pub segments: Vec<String>,
}

/// Resolved scope of a [`ContentUri`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriMatch {
    /// `todo` with no trailing id
    Collection,
    /// `todo/<id>`
    Item(i64),
    Unrecognized,
}

impl ContentUri {
    pub fn new<I, S>(authority: impl Into<String>, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            authority: authority.into(),
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The collection identifier, `content://com.codepath.simpletodo/todo`
    pub fn collection() -> Self {
        Self::new(contract::CONTENT_AUTHORITY, [contract::PATH_TODO])
    }

    /// Identifier for a single item in the collection
    pub fn item(id: i64) -> Self {
        Self::collection().with_appended_id(id)
    }

    /// Parse an identifier string
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = match uri.split_once("://") {
            Some((scheme, rest)) if scheme == contract::SCHEME => rest,
            Some((scheme, _)) => {
                return Err(Error::InvalidUri(format!("Unsupported scheme: {}", scheme)));
            }
            None => uri,
        };

        let mut parts = rest.split('/');
        let authority = parts.next().unwrap_or_default();
        if authority.is_empty() {
            return Err(Error::InvalidUri(format!("URI must name an authority: {}", uri)));
        }
        if authority.contains(char::is_whitespace) {
            return Err(Error::InvalidUri(format!("Invalid authority: {}", authority)));
        }

        let segments = parts.filter(|s| !s.is_empty()).map(str::to_string).collect();

        Ok(Self {
            authority: authority.to_string(),
            segments,
        })
    }

    /// Append a numeric id as a new trailing segment
    pub fn with_appended_id(&self, id: i64) -> Self {
        let mut uri = self.clone();
        uri.segments.push(id.to_string());
        uri
    }

    /// Numeric value of the last segment, if it is one
    pub fn parse_id(&self) -> Option<i64> {
        self.segments.last().and_then(|s| s.parse().ok())
    }

    /// Whether `self` is a strict path prefix of `other` under the same authority
    pub fn is_ancestor_of(&self, other: &ContentUri) -> bool {
        self.authority == other.authority
            && self.segments.len() < other.segments.len()
            && other.segments.starts_with(&self.segments)
    }

    /// Resolve this identifier to an operation scope
    pub fn matches(&self) -> UriMatch {
        if self.authority != contract::CONTENT_AUTHORITY {
            return UriMatch::Unrecognized;
        }

        match self.segments.as_slice() {
            [path] if path == contract::PATH_TODO => UriMatch::Collection,
            [path, id] if path == contract::PATH_TODO => {
                // Digits only: no sign, no whitespace
                if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
                    return UriMatch::Unrecognized;
                }
                id.parse().map(UriMatch::Item).unwrap_or(UriMatch::Unrecognized)
            }
            _ => UriMatch::Unrecognized,
        }
    }

    pub fn to_uri_string(&self) -> String {
        let mut out = format!("{}://{}", contract::SCHEME, self.authority);
        for segment in &self.segments {
            out.push('/');
            out.push_str(segment);
        }
        out
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri_string())
    }
}

impl FromStr for ContentUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ContentUri {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_uri_string())
    }
}

impl<'de> Deserialize<'de> for ContentUri {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ContentUri::parse(&s).map_err(serde::de::Error::custom)
    }
}
