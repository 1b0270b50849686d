//! SQLite storage for templates and received submissions.
//!
//! Handlers open a connection per request through [`Database::connect`];
//! the schema is created once when the server starts.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS templates (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    fields_json TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS submissions (
    submission_id        TEXT PRIMARY KEY,
    template_id          TEXT NOT NULL,
    client_submission_id TEXT UNIQUE,
    entity_id            TEXT NOT NULL,
    entity_type          TEXT NOT NULL,
    payload_json         TEXT NOT NULL,
    received_at          TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS submissions_by_entity
    ON submissions (entity_id, entity_type);
";

#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Opens (creating if needed) the database file and applies the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, String> {
        let database = Self {
            path: path.as_ref().to_path_buf(),
        };
        database
            .connect()?
            .execute_batch(SCHEMA)
            .map_err(|e| e.to_string())?;
        Ok(database)
    }

    pub fn connect(&self) -> Result<Connection, String> {
        let conn = Connection::open(&self.path).map_err(|e| e.to_string())?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| e.to_string())?;
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_both_tables_and_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forms.sqlite");

        Database::open(&path).unwrap();
        let database = Database::open(&path).unwrap();

        let conn = database.connect().unwrap();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(Result::ok)
            .collect();
        assert_eq!(tables, vec!["submissions", "templates"]);
        assert_eq!(database.path(), path.as_path());
    }
}
