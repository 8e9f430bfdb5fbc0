//! Column/value sets used for inserts and updates

use rusqlite::types::Value;
use std::collections::BTreeMap;

/// Write set keyed by column name.
///
/// A key mapped to [`Value::Null`] is "present but null", which validation
/// treats differently from an absent key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentValues {
    values: BTreeMap<String, Value>,
}

impl ContentValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn put_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.values.insert(column.into(), Value::Null);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Text value of `column`; `None` when absent, null or not text
    pub fn get_str(&self, column: &str) -> Option<&str> {
        match self.values.get(column) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Integer value of `column`; `None` when absent, null or not an integer
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.values.get(column) {
            Some(Value::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ContentValues {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut values = ContentValues::new();
        for (k, v) in iter {
            values.put(k, v);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let mut values = ContentValues::new();
        values.put("name", "Buy milk".to_string()).put("priority", 2i64).put_null("notes");

        assert_eq!(values.get_str("name"), Some("Buy milk"));
        assert_eq!(values.get_i64("priority"), Some(2));
        assert_eq!(values.get_str("notes"), None);
        assert!(values.contains_key("notes"));
        assert!(!values.contains_key("status"));
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_wrong_type_reads_as_none() {
        let values: ContentValues = [("priority", "high".to_string())].into_iter().collect();
        assert_eq!(values.get_i64("priority"), None);
    }
}
