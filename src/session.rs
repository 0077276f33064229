/// Session-scoped table registry
///
/// Views that show the same data (an attribute grid reopened for the same
/// managed object, say) share a table through a `Session` rather than a
/// process-wide cache. The session owns its tables; closing an entry or
/// dropping the session releases them.

use crate::table::Table;
use std::collections::BTreeMap;

/// Join key parts with ':'
pub fn composite_key(parts: &[&str]) -> String {
    parts.join(":")
}

/// Owns tables keyed by composite keys.
///
/// ```
/// use tablesorter::{composite_key, ColumnType, Schema, Session, Table};
///
/// let mut session = Session::new("console-1");
/// let key = composite_key(&["java.lang:type=Memory", "HeapMemoryUsage"]);
/// let schema = Schema::new(vec![("value".to_string(), ColumnType::Any, true)]);
///
/// session.open(key.clone(), Table::new("heap".to_string(), schema));
/// assert!(session.get(&key).is_some());
///
/// session.dispose();
/// assert!(session.is_empty());
/// ```
pub struct Session {
    name: String,
    tables: BTreeMap<String, Table>,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Session {
            name: name.into(),
            tables: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a table under `key`, returning the table it replaced
    pub fn open(&mut self, key: impl Into<String>, table: Table) -> Option<Table> {
        let key = key.into();
        log::debug!("session '{}': open '{}'", self.name, key);
        self.tables.insert(key, table)
    }

    pub fn get(&self, key: &str) -> Option<&Table> {
        self.tables.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Table> {
        self.tables.get_mut(key)
    }

    /// The table under `key`, opening one with `create` if none exists
    pub fn get_or_open(&mut self, key: impl Into<String>, create: impl FnOnce() -> Table) -> &mut Table {
        let key = key.into();
        let name = &self.name;
        self.tables.entry(key).or_insert_with_key(|key| {
            log::debug!("session '{}': open '{}'", name, key);
            create()
        })
    }

    /// Remove and return the table under `key`
    pub fn close(&mut self, key: &str) -> Option<Table> {
        let table = self.tables.remove(key);
        if table.is_some() {
            log::debug!("session '{}': closed '{}'", self.name, key);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|k| k.as_str())
    }

    /// Release every table. Returns how many were released.
    pub fn dispose(&mut self) -> usize {
        let count = self.tables.len();
        if count > 0 {
            log::debug!("session '{}': disposing {} tables", self.name, count);
        }
        self.tables.clear();
        count
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("tables", &self.tables.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{CellValue, ColumnType};
    use std::sync::Arc;
    use crate::table::Schema;

    fn table(name: &str) -> Table {
        Table::new(
            name.to_string(),
            Schema::new(vec![("value".to_string(), ColumnType::Any, true)]),
        )
    }

    #[test]
    fn test_composite_key() {
        assert_eq!(composite_key(&["a", "b", "c"]), "a:b:c");
        assert_eq!(composite_key(&[]), "");
    }

    #[test]
    fn test_open_replace_and_close() {
        let mut session = Session::new("s");
        assert!(session.open("k", table("first")).is_none());

        let replaced = session.open("k", table("second")).unwrap();
        assert_eq!(replaced.name(), "first");
        assert_eq!(session.get("k").unwrap().name(), "second");

        let closed = session.close("k").unwrap();
        assert_eq!(closed.name(), "second");
        assert!(session.close("k").is_none());
        assert!(session.is_empty());
    }

    #[test]
    fn test_get_or_open_creates_once() {
        let mut session = Session::new("s");
        session
            .get_or_open("k", || table("made"))
            .append_row(vec![1.into()])
            .unwrap();
        let again = session.get_or_open("k", || table("not used"));
        assert_eq!(again.name(), "made");
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn test_tables_are_independent() {
        let mut session = Session::new("s");
        session.open("a", table("a"));
        session.open("b", table("b"));

        session.get_mut("a").unwrap().append_row(vec![1.into()]).unwrap();
        assert_eq!(session.get("a").unwrap().len(), 1);
        assert_eq!(session.get("b").unwrap().len(), 0);
        assert_eq!(session.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_dispose_releases_everything() {
        let mut session = Session::new("s");
        session.open("a", table("a"));
        session.open("b", table("b"));
        assert_eq!(session.dispose(), 2);
        assert_eq!(session.dispose(), 0);
        assert_eq!(session.len(), 0);
    }

    #[test]
    fn test_drop_releases_tables() {
        let marker = Arc::new(());
        let weak = Arc::downgrade(&marker);

        let mut held = table("held");
        held.parsers_mut().register("marker", move |text| {
            let _held = &marker;
            Ok(CellValue::from(text))
        });

        {
            let mut session = Session::new("s");
            session.open("held", held);
            session.open("other", table("other"));
            assert!(weak.upgrade().is_some());
        }

        assert!(weak.upgrade().is_none());
    }
}
