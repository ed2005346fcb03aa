use crate::error::PersistenceError;
use crate::persistence::KeyValueStore;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// Durable key-value storage in a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                PersistenceError::Unavailable(format!("creating {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened workout database");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, PersistenceError> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS kv_store (
              key    TEXT PRIMARY KEY,
              value  TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.conn.execute(
            r"
            INSERT INTO kv_store (key, value) VALUES (?1, ?2)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            ",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_and_remove_clears() {
        let mut db = SqliteStore::open_in_memory().unwrap();
        assert_eq!(db.get("workouts").unwrap(), None);

        db.set("workouts", "[]").unwrap();
        db.set("workouts", "[1]").unwrap();
        assert_eq!(db.get("workouts").unwrap().as_deref(), Some("[1]"));

        db.remove("workouts").unwrap();
        assert_eq!(db.get("workouts").unwrap(), None);
    }

    #[test]
    fn values_survive_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mapty.db");
        {
            let mut db = SqliteStore::open(&path).unwrap();
            db.set("workouts", "[]").unwrap();
        }
        let db = SqliteStore::open(&path).unwrap();
        assert_eq!(db.get("workouts").unwrap().as_deref(), Some("[]"));
    }
}
