//! Catalog status report for the `status` command.

use std::fmt;
use std::path::{Path, PathBuf};

use gamecrit_common::Result;
use gamecrit_db::models::TableCount;
use gamecrit_db::schema::{self, SCHEMA_VERSION};
use rusqlite::Connection;
use serde::Serialize;

/// Snapshot of a catalog database.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CatalogStatus {
    pub path: PathBuf,
    pub schema_version: i64,
    pub supported_version: i64,
    /// Declared tables not present in the database.
    pub missing_tables: Vec<String>,
    /// Row counts; empty until every table exists.
    pub tables: Vec<TableCount>,
}

impl CatalogStatus {
    /// Inspect the database behind `conn` without modifying it.
    ///
    /// Fails with `DdlConflict` if an existing table has the wrong shape.
    pub fn collect(conn: &Connection, path: &Path) -> Result<Self> {
        let schema = schema::define_schema();
        let missing = schema.verify(conn)?;
        let tables = if missing.is_empty() {
            schema.table_counts(conn)?
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            schema_version: schema::current_version(conn)?,
            supported_version: SCHEMA_VERSION,
            missing_tables: missing.into_iter().map(String::from).collect(),
            tables,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.missing_tables.is_empty()
    }
}

impl fmt::Display for CatalogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Database: {}", self.path.display())?;
        writeln!(
            f,
            "Schema version: {} (supported: {})",
            self.schema_version, self.supported_version
        )?;

        if !self.is_initialized() {
            writeln!(f, "Missing tables: {}", self.missing_tables.join(", "))?;
            return write!(f, "Run `gamecrit init` to create them.");
        }

        writeln!(f, "Tables:")?;
        for (i, count) in self.tables.iter().enumerate() {
            write!(f, "  {:<12} {:>8} rows", count.table, count.rows)?;
            if i + 1 < self.tables.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_database() {
        let conn = Connection::open_in_memory().unwrap();
        let status = CatalogStatus::collect(&conn, Path::new(":memory:")).unwrap();

        assert!(!status.is_initialized());
        assert_eq!(status.schema_version, 0);
        assert_eq!(status.missing_tables.len(), 4);
        assert!(status.tables.is_empty());
        assert!(status.to_string().contains("gamecrit init"));
    }

    #[test]
    fn test_initialized_database() {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_all(&conn).unwrap();
        conn.execute(
            "INSERT INTO games (title, genre, platform, price) VALUES ('Chrono', 'RPG', 'PC', 40)",
            [],
        )
        .unwrap();

        let status = CatalogStatus::collect(&conn, Path::new(":memory:")).unwrap();
        assert!(status.is_initialized());
        assert_eq!(status.schema_version, SCHEMA_VERSION);
        assert_eq!(status.tables[0].table, "games");
        assert_eq!(status.tables[0].rows, 1);

        let text = status.to_string();
        assert!(text.contains("games"));
        assert!(text.contains("game_users"));
    }

    #[test]
    fn test_serializes_to_json() {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_all(&conn).unwrap();
        let status = CatalogStatus::collect(&conn, Path::new("catalog.db")).unwrap();

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["schema_version"], 1);
        assert_eq!(json["tables"].as_array().unwrap().len(), 4);
    }
}
