//! Catalog schema metadata and idempotent table creation.
//!
//! [`define_schema`] builds the in-memory description of the four catalog
//! tables without touching the database. [`Schema::create_all`] checks every
//! existing table against that description, creates the missing ones, and
//! stamps the schema version into `PRAGMA user_version`, all inside one
//! transaction.

use gamecrit_common::{Error, Result};
use rusqlite::Connection;

use crate::error::from_sqlite;
use crate::models::TableCount;

/// Version written to `PRAGMA user_version` once the tables exist.
pub const SCHEMA_VERSION: i64 = 1;

/// SQL expression producing the current UTC time with millisecond precision.
pub(crate) const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Foreign-key target of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
}

/// A declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub not_null: bool,
    pub primary_key: bool,
    pub default: Option<&'static str>,
    pub references: Option<ForeignKey>,
}

impl Column {
    fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            not_null: false,
            primary_key: false,
            default: None,
            references: None,
        }
    }

    fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    fn default(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }

    fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some(ForeignKey { table, column });
        self
    }

    fn definition(&self, inline_pk: bool) -> String {
        let mut def = format!("{} {}", self.name, self.sql_type);
        if self.primary_key && inline_pk {
            def.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            def.push_str(" NOT NULL");
        }
        if let Some(expr) = self.default {
            def.push_str(&format!(" DEFAULT ({expr})"));
        }
        if let Some(fk) = self.references {
            def.push_str(&format!(" REFERENCES {}({})", fk.table, fk.column));
        }
        def
    }
}

/// A declared table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub columns: Vec<Column>,
}

impl Table {
    /// Columns forming the primary key, in key order.
    pub fn primary_key(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name)
            .collect()
    }

    /// Render the `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_sql(&self) -> String {
        let pk = self.primary_key();
        let inline_pk = pk.len() == 1;

        let mut defs: Vec<String> = self
            .columns
            .iter()
            .map(|c| c.definition(inline_pk))
            .collect();
        if pk.len() > 1 {
            defs.push(format!("PRIMARY KEY ({})", pk.join(", ")));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.name,
            defs.join(",\n    ")
        )
    }

    /// Compare the stored table against this declaration.
    ///
    /// Columns must agree in order, name, type affinity, NOT NULL (not
    /// checked on a rowid primary key) and primary-key position; foreign
    /// keys must agree as a set.
    ///
    /// Returns `Ok(false)` if the table does not exist, `Ok(true)` if it
    /// matches, and [`Error::DdlConflict`] if it exists with another shape.
    fn check(&self, conn: &Connection) -> Result<bool> {
        let stored = stored_columns(conn, self.name)?;
        if stored.is_empty() {
            return Ok(false);
        }

        if stored.len() != self.columns.len() {
            let names: Vec<&str> = stored.iter().map(|c| c.name.as_str()).collect();
            return Err(Error::ddl_conflict(
                self.name,
                format!(
                    "expected {} columns, found {} ({})",
                    self.columns.len(),
                    stored.len(),
                    names.join(", ")
                ),
            ));
        }

        let pk = self.primary_key();
        let rowid_pk = pk.len() == 1;
        for (declared, found) in self.columns.iter().zip(&stored) {
            if !declared.name.eq_ignore_ascii_case(&found.name) {
                return Err(Error::ddl_conflict(
                    self.name,
                    format!("found column '{}' where '{}' is declared", found.name, declared.name),
                ));
            }
            if affinity(declared.sql_type) != affinity(&found.sql_type) {
                return Err(Error::ddl_conflict(
                    self.name,
                    format!(
                        "column '{}' has type '{}', expected '{}'",
                        declared.name, found.sql_type, declared.sql_type
                    ),
                ));
            }
            // An INTEGER PRIMARY KEY aliases the rowid and can never hold NULL.
            let is_rowid = rowid_pk
                && declared.primary_key
                && affinity(declared.sql_type) == Affinity::Integer;
            if declared.not_null != found.not_null && !is_rowid {
                return Err(Error::ddl_conflict(
                    self.name,
                    format!(
                        "column '{}' is {}, expected {}",
                        declared.name,
                        nullability(found.not_null),
                        nullability(declared.not_null)
                    ),
                ));
            }
            let expected_pk = pk
                .iter()
                .position(|name| *name == declared.name)
                .map_or(0, |i| i as i64 + 1);
            if expected_pk != found.pk {
                return Err(Error::ddl_conflict(
                    self.name,
                    format!(
                        "column '{}' has primary key position {}, expected {}",
                        declared.name, found.pk, expected_pk
                    ),
                ));
            }
        }

        let mut expected_fks: Vec<(String, String, String)> = self
            .columns
            .iter()
            .filter_map(|c| {
                c.references
                    .map(|fk| (c.name.to_string(), fk.table.to_string(), fk.column.to_string()))
            })
            .collect();
        expected_fks.sort();
        let found_fks = stored_foreign_keys(conn, self.name)?;
        if expected_fks != found_fks {
            return Err(Error::ddl_conflict(
                self.name,
                format!("foreign keys differ: expected {expected_fks:?}, found {found_fks:?}"),
            ));
        }

        Ok(true)
    }
}

/// SQLite column affinity, derived from a declared type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Affinity {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
}

/// Apply SQLite's affinity rules, so `VARCHAR` matches `TEXT` and
/// `BIGINT` matches `INTEGER`.
fn affinity(decl: &str) -> Affinity {
    let decl = decl.to_ascii_uppercase();
    if decl.contains("INT") {
        Affinity::Integer
    } else if ["CHAR", "CLOB", "TEXT"].iter().any(|t| decl.contains(t)) {
        Affinity::Text
    } else if decl.is_empty() || decl.contains("BLOB") {
        Affinity::Blob
    } else if ["REAL", "FLOA", "DOUB"].iter().any(|t| decl.contains(t)) {
        Affinity::Real
    } else {
        Affinity::Numeric
    }
}

fn nullability(not_null: bool) -> &'static str {
    if not_null {
        "NOT NULL"
    } else {
        "nullable"
    }
}

/// Column shape as reported by `pragma_table_info`.
struct StoredColumn {
    name: String,
    sql_type: String,
    not_null: bool,
    pk: i64,
}

fn stored_columns(conn: &Connection, table: &str) -> Result<Vec<StoredColumn>> {
    let mut stmt = conn
        .prepare("SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid")
        .map_err(from_sqlite)?;

    let columns = stmt
        .query_map([table], |row| {
            Ok(StoredColumn {
                name: row.get(0)?,
                sql_type: row.get(1)?,
                not_null: row.get::<_, i64>(2)? != 0,
                pk: row.get(3)?,
            })
        })
        .map_err(from_sqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_sqlite)?;

    Ok(columns)
}

fn stored_foreign_keys(conn: &Connection, table: &str) -> Result<Vec<(String, String, String)>> {
    let mut stmt = conn
        .prepare("SELECT \"from\", \"table\", \"to\" FROM pragma_foreign_key_list(?1)")
        .map_err(from_sqlite)?;

    let mut fks = stmt
        .query_map([table], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            ))
        })
        .map_err(from_sqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_sqlite)?;
    fks.sort();

    Ok(fks)
}

/// In-memory description of the catalog tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    tables: Vec<Table>,
}

/// Build the catalog schema metadata. Does not touch any database.
pub fn define_schema() -> Schema {
    Schema {
        tables: vec![
            Table {
                name: "games",
                columns: vec![
                    Column::new("id", "INTEGER").primary_key(),
                    Column::new("title", "TEXT"),
                    Column::new("genre", "TEXT"),
                    Column::new("platform", "TEXT"),
                    Column::new("price", "INTEGER"),
                ],
            },
            Table {
                name: "users",
                columns: vec![
                    Column::new("id", "INTEGER").primary_key(),
                    Column::new("name", "TEXT"),
                    Column::new("created_at", "DATETIME").default(NOW_SQL),
                    Column::new("updated_at", "DATETIME"),
                ],
            },
            Table {
                name: "reviews",
                columns: vec![
                    Column::new("id", "INTEGER").primary_key(),
                    Column::new("score", "INTEGER"),
                    Column::new("comment", "TEXT"),
                    Column::new("game_id", "INTEGER").references("games", "id"),
                    Column::new("user_id", "INTEGER").references("users", "id"),
                ],
            },
            Table {
                name: "game_users",
                columns: vec![
                    Column::new("game_id", "INTEGER")
                        .primary_key()
                        .not_null()
                        .references("games", "id"),
                    Column::new("user_id", "INTEGER")
                        .primary_key()
                        .not_null()
                        .references("users", "id"),
                ],
            },
        ],
    }
}

impl Schema {
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Check stored tables against the metadata without creating anything.
    ///
    /// Returns the names of declared tables that do not exist yet.
    pub fn verify(&self, conn: &Connection) -> Result<Vec<&'static str>> {
        check_version(conn)?;

        let mut missing = Vec::new();
        for table in &self.tables {
            if !table.check(conn)? {
                missing.push(table.name);
            }
        }
        Ok(missing)
    }

    /// Create every missing table and stamp the schema version.
    ///
    /// Safe to call repeatedly: existing tables with the declared shape are
    /// left alone. If any stored table conflicts with the metadata, nothing
    /// is created and [`Error::DdlConflict`] is returned.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of tables created (0 when all already existed)
    /// * `Err(Error)` - On a shape conflict or database failure
    pub fn create_all(&self, conn: &Connection) -> Result<usize> {
        let tx = conn.unchecked_transaction().map_err(from_sqlite)?;

        let missing = self.verify(&tx)?;
        for name in &missing {
            if let Some(table) = self.table(name) {
                tx.execute_batch(&table.create_sql()).map_err(from_sqlite)?;
                tracing::debug!(table = *name, "Created table");
            }
        }

        if current_version(&tx)? < SCHEMA_VERSION {
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)
                .map_err(from_sqlite)?;
        }

        tx.commit().map_err(from_sqlite)?;

        if !missing.is_empty() {
            tracing::info!("Created {} catalog tables: {}", missing.len(), missing.join(", "));
        }

        Ok(missing.len())
    }

    /// Row count of every catalog table, in declaration order.
    pub fn table_counts(&self, conn: &Connection) -> Result<Vec<TableCount>> {
        self.tables
            .iter()
            .map(|table| {
                let rows: i64 = conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table.name), [], |row| {
                        row.get(0)
                    })
                    .map_err(from_sqlite)?;
                Ok(TableCount {
                    table: table.name.to_string(),
                    rows,
                })
            })
            .collect()
    }
}

/// Create all catalog tables that do not exist yet.
///
/// Shorthand for `define_schema().create_all(conn)`.
pub fn create_all(conn: &Connection) -> Result<usize> {
    define_schema().create_all(conn)
}

/// Read the schema version stored in the database (0 for a fresh file).
pub fn current_version(conn: &Connection) -> Result<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(from_sqlite)
}

fn check_version(conn: &Connection) -> Result<()> {
    let version = current_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(Error::ddl_conflict(
            "user_version",
            format!("database schema version {version} is newer than supported version {SCHEMA_VERSION}"),
        ));
    }
    Ok(())
}

/// List user tables in the database, sorted by name.
pub fn table_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )
        .map_err(from_sqlite)?;

    let names = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_sqlite)?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(from_sqlite)?;

    Ok(names)
}
