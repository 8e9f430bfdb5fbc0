//! CRUD dispatcher for the todo table
//!
//! Resolves a [`ContentUri`] to a scope, validates the request, runs it
//! against the [`SqliteStore`] and publishes changes on the [`ChangeBus`].
//!
//! | URI          | query | insert | update | delete |
//! |--------------|-------|--------|--------|--------|
//! | `todo`       | yes   | yes    | yes    | yes    |
//! | `todo/<id>`  | yes   | no     | yes    | yes    |
//!
//! For `todo/<id>` the caller's selection is replaced by `_id = <id>`.

use std::sync::Arc;
use rusqlite::types::Value;
use crate::{Error, Result};
use crate::changes::ChangeBus;
use crate::contract::{self, is_valid_priority, is_valid_status};
use crate::cursor::Cursor;
use crate::item::TodoItem;
use crate::storage::SqliteStore;
use crate::uri::{ContentUri, UriMatch};
use crate::values::ContentValues;

const ID_SELECTION: &str = "_id = ?";

/// URI-addressed access to to-do items
pub struct TodoProvider {
    store: Arc<SqliteStore>,
    changes: Arc<ChangeBus>,
}

impl TodoProvider {
    pub fn new(store: Arc<SqliteStore>, changes: Arc<ChangeBus>) -> Self {
        Self { store, changes }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Bus on which writes are published
    pub fn changes(&self) -> &Arc<ChangeBus> {
        &self.changes
    }

    /// Query the table.
    ///
    /// The returned cursor is subscribed to changes at `uri`.
    pub fn query(
        &self,
        uri: &ContentUri,
        projection: Option<&[&str]>,
        selection: Option<&str>,
        selection_args: &[&str],
        sort_order: Option<&str>,
    ) -> Result<Cursor> {
        let (selection, args) = match uri.matches() {
            UriMatch::Collection => (selection, text_args(selection_args)),
            UriMatch::Item(id) => (Some(ID_SELECTION), vec![Value::Integer(id)]),
            UriMatch::Unrecognized => {
                return Err(Error::InvalidArgument(format!("Cannot query unknown URI {}", uri)));
            }
        };
        if let Some(columns) = projection {
            check_columns(columns.iter().copied())?;
        }

        let handle = self.store.open_for_read()?;
        let mut cursor = handle.query(contract::TABLE_NAME, projection, selection, &args, sort_order)?;
        cursor.set_notification_uri(&self.changes, uri);

        tracing::debug!(%uri, rows = cursor.count(), "query");
        Ok(cursor)
    }

    /// Insert a new item.
    ///
    /// Returns the new item's URI, or `None` when storage rejected the row
    /// (the failure is logged).
    pub fn insert(&self, uri: &ContentUri, values: &ContentValues) -> Result<Option<ContentUri>> {
        match uri.matches() {
            UriMatch::Collection => self.insert_item(uri, values),
            _ => Err(Error::InvalidArgument(format!("Insertion is not supported for {}", uri))),
        }
    }

    fn insert_item(&self, uri: &ContentUri, values: &ContentValues) -> Result<Option<ContentUri>> {
        check_columns(values.keys())?;
        if values.contains_key(contract::COLUMN_ID) {
            return Err(Error::InvalidArgument("item id is assigned by storage".to_string()));
        }

        let has_name = values
            .get_str(contract::COLUMN_NAME)
            .is_some_and(|name| !name.trim().is_empty());
        if !has_name {
            return Err(Error::InvalidArgument("item requires a name".to_string()));
        }
        check_codes(values)?;

        let handle = self.store.open_for_write()?;
        match handle.insert(contract::TABLE_NAME, values) {
            Ok(id) => {
                let item_uri = uri.with_appended_id(id);
                tracing::debug!(uri = %item_uri, "inserted item");
                self.changes.notify_change(uri);
                Ok(Some(item_uri))
            }
            Err(e) => {
                tracing::error!(%uri, error = %e, "Failed to insert row");
                Ok(None)
            }
        }
    }

    /// Update items and return how many rows changed.
    ///
    /// An empty `values` set is a no-op that never reaches storage.
    pub fn update(
        &self,
        uri: &ContentUri,
        values: &ContentValues,
        selection: Option<&str>,
        selection_args: &[&str],
    ) -> Result<usize> {
        match uri.matches() {
            UriMatch::Collection => self.update_items(uri, values, selection, &text_args(selection_args)),
            UriMatch::Item(id) => self.update_items(uri, values, Some(ID_SELECTION), &[Value::Integer(id)]),
            UriMatch::Unrecognized => {
                Err(Error::InvalidArgument(format!("Update is not supported for {}", uri)))
            }
        }
    }

    fn update_items(
        &self,
        uri: &ContentUri,
        values: &ContentValues,
        selection: Option<&str>,
        args: &[Value],
    ) -> Result<usize> {
        check_columns(values.keys())?;
        if values.contains_key(contract::COLUMN_ID) {
            return Err(Error::InvalidArgument("item id cannot be changed".to_string()));
        }
        // Only null is rejected here; an empty name is a valid edit
        if matches!(values.get(contract::COLUMN_NAME), Some(Value::Null)) {
            return Err(Error::InvalidArgument("item requires a name".to_string()));
        }
        check_codes(values)?;

        if values.is_empty() {
            return Ok(0);
        }

        let rows = self
            .store
            .open_for_write()?
            .update(contract::TABLE_NAME, values, selection, args)?;

        tracing::debug!(%uri, rows, "updated items");
        if rows > 0 {
            self.changes.notify_change(uri);
        }
        Ok(rows)
    }

    /// Delete items and return how many rows were removed.
    ///
    /// On the collection URI a `None` selection deletes every row.
    pub fn delete(&self, uri: &ContentUri, selection: Option<&str>, selection_args: &[&str]) -> Result<usize> {
        match uri.matches() {
            UriMatch::Collection => self.delete_items(uri, selection, &text_args(selection_args)),
            UriMatch::Item(id) => self.delete_items(uri, Some(ID_SELECTION), &[Value::Integer(id)]),
            UriMatch::Unrecognized => {
                Err(Error::InvalidArgument(format!("Deletion is not supported for {}", uri)))
            }
        }
    }

    fn delete_items(&self, uri: &ContentUri, selection: Option<&str>, args: &[Value]) -> Result<usize> {
        let rows = self
            .store
            .open_for_write()?
            .delete(contract::TABLE_NAME, selection, args)?;

        tracing::debug!(%uri, rows, "deleted items");
        if rows > 0 {
            self.changes.notify_change(uri);
        }
        Ok(rows)
    }

    /// Type string for `uri`: a directory of items or a single item
    pub fn get_type(&self, uri: &ContentUri) -> Result<&'static str> {
        match uri.matches() {
            UriMatch::Collection => Ok(contract::CONTENT_LIST_TYPE),
            UriMatch::Item(_) => Ok(contract::CONTENT_ITEM_TYPE),
            m @ UriMatch::Unrecognized => {
                Err(Error::IllegalState(format!("Unknown URI {} with match {:?}", uri, m)))
            }
        }
    }

    // ========== Typed helpers ==========

    /// All items matching `selection`, in `sort_order`
    pub fn items(&self, selection: Option<&str>, selection_args: &[&str], sort_order: Option<&str>) -> Result<Vec<TodoItem>> {
        let mut cursor = self.query(&ContentUri::collection(), None, selection, selection_args, sort_order)?;
        TodoItem::all_from_cursor(&mut cursor)
    }

    /// The item with `id`, if it exists
    pub fn item(&self, id: i64) -> Result<Option<TodoItem>> {
        let mut cursor = self.query(&ContentUri::item(id), None, None, &[], None)?;
        if !cursor.move_to_first() {
            return Ok(None);
        }
        TodoItem::from_cursor(&cursor).map(Some)
    }
}

fn text_args(args: &[&str]) -> Vec<Value> {
    args.iter().map(|a| Value::Text(a.to_string())).collect()
}

fn check_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> Result<()> {
    for column in columns {
        if !contract::is_known_column(column) {
            return Err(Error::InvalidArgument(format!("Unknown column {}", column)));
        }
    }
    Ok(())
}

/// Priority and status, when present, must be valid codes
fn check_codes(values: &ContentValues) -> Result<()> {
    check_code(values, contract::COLUMN_PRIORITY, is_valid_priority, "item requires valid priority")?;
    check_code(values, contract::COLUMN_STATUS, is_valid_status, "item requires valid status")
}

fn check_code(values: &ContentValues, column: &str, valid: fn(i64) -> bool, message: &str) -> Result<()> {
    if !values.contains_key(column) {
        return Ok(());
    }
    match values.get_i64(column) {
        Some(code) if valid(code) => Ok(()),
        _ => Err(Error::InvalidArgument(message.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ChangeObserver;
    use crate::contract::{Priority, Status};
    use crate::item::ItemFields;
    use rusqlite::Connection;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl ChangeObserver for Counter {
        fn on_change(&self, _uri: &ContentUri) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Counter {
        fn get(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn provider() -> TodoProvider {
        TodoProvider::new(Arc::new(SqliteStore::in_memory()), Arc::new(ChangeBus::new()))
    }

    /// Provider plus an observer on the whole collection
    fn observed() -> (TodoProvider, Arc<Counter>) {
        let provider = provider();
        let counter = Arc::new(Counter::default());
        provider
            .changes()
            .register_observer(&ContentUri::collection(), true, counter.clone());
        (provider, counter)
    }

    fn add(provider: &TodoProvider, name: &str) -> i64 {
        let uri = provider
            .insert(&ContentUri::collection(), &ItemFields::new(name).to_values())
            .unwrap()
            .unwrap();
        uri.parse_id().unwrap()
    }

    fn row_count(provider: &TodoProvider) -> usize {
        provider
            .query(&ContentUri::collection(), None, None, &[], None)
            .unwrap()
            .count()
    }

    fn assert_invalid(result: Result<impl std::fmt::Debug>, message: &str) {
        match result {
            Err(Error::InvalidArgument(m)) => assert_eq!(m, message),
            other => panic!("expected InvalidArgument({}), got {:?}", message, other),
        }
    }

    #[test]
    fn test_round_trip() {
        let provider = provider();
        let fields = ItemFields::new("A")
            .notes("B")
            .priority(Priority::Medium)
            .status(Status::Todo);

        let uri = provider
            .insert(&ContentUri::collection(), &fields.to_values())
            .unwrap()
            .unwrap();
        assert_eq!(uri.matches(), UriMatch::Item(uri.parse_id().unwrap()));

        let mut cursor = provider.query(&uri, None, None, &[], None).unwrap();
        let items = TodoItem::all_from_cursor(&mut cursor).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "A");
        assert_eq!(items[0].notes.as_deref(), Some("B"));
        assert_eq!(items[0].priority, Priority::Medium);
        assert_eq!(items[0].status, Status::Todo);
    }

    #[test]
    fn test_item_scope_overrides_selection() {
        let provider = provider();
        let a = add(&provider, "a");
        let b = add(&provider, "b");

        let cursor = provider
            .query(&ContentUri::item(a), Some(&["_id"][..]), Some("name = ?"), &["b"], None)
            .unwrap();
        let ids: Vec<_> = cursor.rows().map(|r| r[0].clone()).collect();
        assert_eq!(ids, vec![Value::Integer(a)]);

        let mut rename = ContentValues::new();
        rename.put("name", "renamed".to_string());
        let updated = provider.update(&ContentUri::item(a), &rename, Some("1 = 1"), &[]).unwrap();
        assert_eq!(updated, 1);
        assert_eq!(provider.item(b).unwrap().unwrap().name, "b");

        let deleted = provider.delete(&ContentUri::item(b), Some("1 = 1"), &[]).unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(provider.item(a).unwrap().unwrap().name, "renamed");
        assert!(provider.item(b).unwrap().is_none());
    }

    #[test]
    fn test_insert_requires_name() {
        let (provider, counter) = observed();
        let uri = ContentUri::collection();

        let mut absent = ContentValues::new();
        absent.put("notes", "no name".to_string());
        let mut null = ContentValues::new();
        null.put_null("name");
        let empty = ItemFields::new("").to_values();
        let mut blank = ContentValues::new();
        blank.put("name", "   ".to_string());

        for values in [absent, null, empty, blank] {
            assert_invalid(provider.insert(&uri, &values), "item requires a name");
        }
        assert_eq!(row_count(&provider), 0);
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_insert_requires_valid_priority() {
        let provider = provider();
        let uri = ContentUri::collection();

        let mut out_of_range = ItemFields::new("x").to_values();
        out_of_range.put("priority", 3i64);
        let mut null = ItemFields::new("x").to_values();
        null.put_null("priority");
        let mut text = ItemFields::new("x").to_values();
        text.put("priority", "high".to_string());

        for values in [out_of_range, null, text] {
            assert_invalid(provider.insert(&uri, &values), "item requires valid priority");
        }
        assert_eq!(row_count(&provider), 0);
    }

    #[test]
    fn test_insert_requires_valid_status() {
        let provider = provider();
        let mut values = ItemFields::new("x").to_values();
        values.put("status", -1i64);
        assert_invalid(provider.insert(&ContentUri::collection(), &values), "item requires valid status");
        assert_eq!(row_count(&provider), 0);
    }

    #[test]
    fn test_insert_defaults_priority() {
        let provider = provider();
        let id = add(&provider, "defaults");
        let item = provider.item(id).unwrap().unwrap();
        assert_eq!(item.priority, Priority::Low);
        assert_eq!(item.status, Status::Todo);
    }

    #[test]
    fn test_insert_rejects_unknown_and_id_columns() {
        let provider = provider();
        let mut unknown = ItemFields::new("x").to_values();
        unknown.put("due", 5i64);
        assert_invalid(provider.insert(&ContentUri::collection(), &unknown), "Unknown column due");

        let mut with_id = ItemFields::new("x").to_values();
        with_id.put("_id", 9i64);
        assert!(provider.insert(&ContentUri::collection(), &with_id).is_err());
    }

    #[test]
    fn test_insert_into_item_uri_is_rejected() {
        let provider = provider();
        let result = provider.insert(&ContentUri::item(1), &ItemFields::new("x").to_values());
        assert_invalid(result, "Insertion is not supported for content://com.codepath.simpletodo/todo/1");
    }

    #[test]
    fn test_unrecognized_uri() {
        let provider = provider();
        let uri = ContentUri::parse("content://com.codepath.simpletodo/staff").unwrap();
        let values = ItemFields::new("x").to_values();

        assert!(matches!(provider.query(&uri, None, None, &[], None), Err(Error::InvalidArgument(_))));
        assert!(matches!(provider.insert(&uri, &values), Err(Error::InvalidArgument(_))));
        assert!(matches!(provider.update(&uri, &values, None, &[]), Err(Error::InvalidArgument(_))));
        assert!(matches!(provider.delete(&uri, None, &[]), Err(Error::InvalidArgument(_))));
        assert!(matches!(provider.get_type(&uri), Err(Error::IllegalState(_))));
    }

    #[test]
    fn test_get_type() {
        let provider = provider();
        assert_eq!(provider.get_type(&ContentUri::collection()).unwrap(), contract::CONTENT_LIST_TYPE);
        assert_eq!(provider.get_type(&ContentUri::item(12)).unwrap(), contract::CONTENT_ITEM_TYPE);
    }

    #[test]
    fn test_empty_update_never_touches_storage() {
        let (provider, counter) = observed();
        let rows = provider
            .update(&ContentUri::item(1), &ContentValues::new(), None, &[])
            .unwrap();
        assert_eq!(rows, 0);
        assert!(!provider.store().is_open());
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_update_validation() {
        let provider = provider();
        let id = add(&provider, "x");
        let uri = ContentUri::item(id);

        let mut null_name = ContentValues::new();
        null_name.put_null("name");
        assert_invalid(provider.update(&uri, &null_name, None, &[]), "item requires a name");

        let mut bad_priority = ContentValues::new();
        bad_priority.put("priority", 9i64);
        assert_invalid(provider.update(&uri, &bad_priority, None, &[]), "item requires valid priority");

        let mut bad_status = ContentValues::new();
        bad_status.put("status", 3i64);
        assert_invalid(provider.update(&uri, &bad_status, None, &[]), "item requires valid status");

        let mut new_id = ContentValues::new();
        new_id.put("_id", 100i64);
        assert!(provider.update(&uri, &new_id, None, &[]).is_err());

        let mut empty_name = ContentValues::new();
        empty_name.put("name", String::new());
        assert_eq!(provider.update(&uri, &empty_name, None, &[]).unwrap(), 1);
    }

    #[test]
    fn test_partial_update() {
        let provider = provider();
        let id = add(&provider, "partial");

        let values = ItemFields::default().status(Status::Done).to_values();
        assert_eq!(provider.update(&ContentUri::item(id), &values, None, &[]).unwrap(), 1);

        let item = provider.item(id).unwrap().unwrap();
        assert_eq!(item.name, "partial");
        assert_eq!(item.status, Status::Done);
    }

    #[test]
    fn test_delete_all() {
        let provider = provider();
        add(&provider, "a");
        add(&provider, "b");
        add(&provider, "c");

        assert_eq!(provider.delete(&ContentUri::collection(), None, &[]).unwrap(), 3);
        assert_eq!(row_count(&provider), 0);
        assert_eq!(provider.delete(&ContentUri::collection(), None, &[]).unwrap(), 0);
    }

    #[test]
    fn test_collection_selection_is_honoured() {
        let provider = provider();
        add(&provider, "keep");
        add(&provider, "drop");

        let deleted = provider
            .delete(&ContentUri::collection(), Some("name = ?"), &["drop"])
            .unwrap();
        assert_eq!(deleted, 1);

        let names: Vec<_> = provider
            .items(None, &[], Some("name"))
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["keep"]);
    }

    #[test]
    fn test_notifications_once_per_effective_write() {
        let (provider, counter) = observed();

        let id = add(&provider, "n");
        assert_eq!(counter.get(), 1);

        let values = ItemFields::default().priority(Priority::High).to_values();
        provider.update(&ContentUri::item(id), &values, None, &[]).unwrap();
        assert_eq!(counter.get(), 2);

        // Nothing matched: no notification
        assert_eq!(provider.update(&ContentUri::item(id + 100), &values, None, &[]).unwrap(), 0);
        assert_eq!(provider.delete(&ContentUri::item(id + 100), None, &[]).unwrap(), 0);
        assert_eq!(counter.get(), 2);

        provider.delete(&ContentUri::item(id), None, &[]).unwrap();
        assert_eq!(counter.get(), 3);

        // Reads never notify
        provider.query(&ContentUri::collection(), None, None, &[], None).unwrap();
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn test_cursor_sees_later_writes() {
        let provider = provider();
        let id = add(&provider, "watched");

        let cursor = provider.query(&ContentUri::item(id), None, None, &[], None).unwrap();
        assert!(!cursor.has_changed());

        let values = ItemFields::default().notes("more").to_values();
        provider.update(&ContentUri::item(id), &values, None, &[]).unwrap();
        assert!(cursor.has_changed());
    }

    #[test]
    fn test_unknown_projection_column() {
        let provider = provider();
        let result = provider.query(&ContentUri::collection(), Some(&["secret"][..]), None, &[], None);
        assert_invalid(result, "Unknown column secret");
    }

    /// Store whose table rejects names longer than four characters
    fn constrained_store(dir: &tempfile::TempDir) -> Arc<SqliteStore> {
        let path = dir.path().join("constrained.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE todo (
                _id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL CHECK (length(name) <= 4),
                notes TEXT,
                priority INTEGER NOT NULL DEFAULT 0,
                status INTEGER NOT NULL DEFAULT 0
            );
            PRAGMA user_version = 1;",
        )
        .unwrap();
        Arc::new(SqliteStore::new(path))
    }

    #[test]
    fn test_insert_storage_failure_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let provider = TodoProvider::new(constrained_store(&dir), Arc::new(ChangeBus::new()));
        let counter = Arc::new(Counter::default());
        provider
            .changes()
            .register_observer(&ContentUri::collection(), true, counter.clone());

        let result = provider
            .insert(&ContentUri::collection(), &ItemFields::new("too long").to_values())
            .unwrap();
        assert!(result.is_none());
        assert_eq!(counter.get(), 0);
        assert_eq!(row_count(&provider), 0);
    }

    #[test]
    fn test_update_storage_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let provider = TodoProvider::new(constrained_store(&dir), Arc::new(ChangeBus::new()));
        let id = add(&provider, "ok");

        let values = ItemFields::new("much too long").to_values();
        let result = provider.update(&ContentUri::item(id), &values, None, &[]);
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[test]
    fn test_dropped_cursors_release_registrations() {
        let provider = provider();
        let id = add(&provider, "kept");

        for _ in 0..100 {
            provider.query(&ContentUri::collection(), None, None, &[], None).unwrap();
            provider.item(id).unwrap();
        }
        assert_eq!(provider.changes().observer_count(), 0);

        let mut cursor = provider.query(&ContentUri::item(id), None, None, &[], None).unwrap();
        assert_eq!(provider.changes().observer_count(), 1);
        cursor.close();
        assert_eq!(provider.changes().observer_count(), 0);
    }
}
