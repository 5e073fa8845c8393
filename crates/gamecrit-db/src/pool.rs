//! Database connection and pool management.
//!
//! This module opens SQLite connections with the catalog's pragmas, builds
//! r2d2 pools over them, and materialises the schema on pool creation.
//! Every data operation elsewhere in the crate takes one of these
//! connections explicitly.

use std::time::Duration;

use gamecrit_common::config::DatabaseConfig;
use gamecrit_common::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};

use crate::schema;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// How long `get_conn` waits for a free connection.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Apply per-connection settings.
fn configure(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

/// Open a single connection to the configured database file.
///
/// The file is created if it does not exist. Foreign keys and the busy
/// timeout are enabled, and the file header is read once so that a path
/// that is not a SQLite database fails here rather than on first use.
///
/// # Returns
///
/// * `Ok(Connection)` - A ready connection
/// * `Err(Error::ConnectionFailure)` - If the path cannot be opened as a database
pub fn open_connection(config: &DatabaseConfig) -> Result<Connection> {
    let path = config.effective_path();
    let fail = |e: rusqlite::Error| {
        Error::connection(format!("Failed to open database {}: {e}", path.display()))
    };

    let conn = Connection::open(&path).map_err(fail)?;
    configure(&conn, config.busy_timeout()).map_err(fail)?;
    probe(&conn).map_err(fail)?;

    Ok(conn)
}

/// Open an existing database file without write access.
///
/// Unlike [`open_connection`], a missing file is reported as
/// `ConnectionFailure` instead of being created, and nothing on disk is
/// modified through the returned connection.
pub fn open_read_only(config: &DatabaseConfig) -> Result<Connection> {
    let path = config.effective_path();
    let fail = |e: rusqlite::Error| {
        Error::connection(format!("Failed to open database {}: {e}", path.display()))
    };

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(&path, flags).map_err(fail)?;
    conn.busy_timeout(config.busy_timeout()).map_err(fail)?;
    probe(&conn).map_err(fail)?;

    Ok(conn)
}

/// Read the schema table once so a file that is not a database fails early.
fn probe(conn: &Connection) -> rusqlite::Result<()> {
    conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|_| ())
}

/// Initialize a new database pool from configuration.
///
/// This function will:
/// - Create the SQLite database file if it doesn't exist
/// - Set up connection pooling with r2d2 (`pool_size` connections)
/// - Enable foreign key constraints and the busy timeout on all connections
/// - Create any catalog tables that do not exist yet
///
/// # Example
///
/// ```no_run
/// use gamecrit_common::config::DatabaseConfig;
/// use gamecrit_db::pool::init_pool;
///
/// let pool = init_pool(&DatabaseConfig::at("/var/lib/gamecrit/catalog.db")).unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    if config.pool_size == 0 {
        return Err(Error::invalid_input("database.pool_size must be at least 1"));
    }

    // Surface open errors directly instead of as a pool checkout timeout.
    drop(open_connection(config)?);

    let path = config.effective_path();
    let busy_timeout = config.busy_timeout();
    let manager =
        SqliteConnectionManager::file(&path).with_init(move |conn| configure(conn, busy_timeout));

    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(CHECKOUT_TIMEOUT)
        .build(manager)
        .map_err(|e| Error::connection(format!("Failed to create connection pool: {e}")))?;

    let conn = get_conn(&pool)?;
    let created = schema::create_all(&conn)?;
    tracing::info!(
        "Opened catalog database at {} ({} tables created)",
        path.display(),
        created
    );

    Ok(pool)
}

/// Initialize an in-memory database pool (useful for tests).
///
/// Each call creates a uniquely-named shared-cache in-memory database so
/// that parallel tests do not interfere with each other, while all
/// connections *within* a single pool still share state.
pub fn init_memory_pool() -> Result<DbPool> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let uri = format!("file:gamecrit_mem_{n}?mode=memory&cache=shared");

    let busy_timeout = DatabaseConfig::default().busy_timeout();
    let manager =
        SqliteConnectionManager::file(uri).with_init(move |conn| configure(conn, busy_timeout));

    let pool = Pool::builder()
        .max_size(4)
        .connection_timeout(CHECKOUT_TIMEOUT)
        .build(manager)
        .map_err(|e| Error::connection(format!("Failed to create in-memory pool: {e}")))?;

    let conn = get_conn(&pool)?;
    schema::create_all(&conn)?;

    Ok(pool)
}

/// Convenience helper to get a connection from the pool.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::connection(format!("Failed to get connection from pool: {e}")))
}
