//! Store schema.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::error::{Result, StoreError};

/// Bumped whenever `schema.sql` changes shape.
pub const SCHEMA_VERSION: &str = "4";

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Open (or create) a store file and make sure every table exists.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    initialize(&conn)?;
    Ok(conn)
}

/// Open an already built store for queries without modifying it.
pub fn open_read_only(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Store not found: {}", path.display()),
        )));
    }
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(conn)
}

/// Fresh in-memory store, mostly for tests.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    initialize(&conn)?;
    Ok(conn)
}

/// Apply the schema. Idempotent; foreign keys are switched on per connection.
pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn test_all_tables_created() {
        let conn = open_in_memory().unwrap();
        let names = table_names(&conn);
        for expected in [
            "build_metadata",
            "cross_references",
            "definitions",
            "definitions_fts",
            "external_instruments",
            "legal_documents",
            "legal_provisions",
            "provisions_fts",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_initialize_twice() {
        let conn = open_in_memory().unwrap();
        assert!(initialize(&conn).is_ok());
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = open_in_memory().unwrap();
        let on: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(on, 1);
    }

    #[test]
    fn test_open_read_only_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");
        assert!(matches!(open_read_only(&path), Err(StoreError::Io(_))));

        drop(open(&path).unwrap());
        let conn = open_read_only(&path).unwrap();
        assert!(conn.execute("DELETE FROM build_metadata", []).is_err());
    }

    #[test]
    fn test_status_check_constraint() {
        let conn = open_in_memory().unwrap();
        let result = conn.execute(
            "INSERT INTO legal_documents (id, type, title, status, url) VALUES ('X', 'statute', 't', 'draft', 'u')",
            [],
        );
        assert!(result.is_err());
    }
}
