//! Classification of SQLite failures into the catalog error taxonomy.

use gamecrit_common::Error;
use rusqlite::ErrorCode;

/// Map a rusqlite error onto [`Error`] by its SQLite result code.
pub(crate) fn from_sqlite(e: rusqlite::Error) -> Error {
    match e.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => Error::constraint(e.to_string()),
        Some(ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::PermissionDenied) => {
            Error::connection(e.to_string())
        }
        _ => Error::database(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rusqlite::Connection;

    #[test]
    fn constraint_failures_are_classified() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT NOT NULL);")
            .unwrap();

        let err = conn
            .execute("INSERT INTO t (v) VALUES (NULL)", [])
            .unwrap_err();
        assert_matches!(from_sqlite(err), Error::ConstraintViolation(_));
    }

    #[test]
    fn other_failures_are_database_errors() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.execute("SELECT * FROM missing", []).unwrap_err();
        assert_matches!(from_sqlite(err), Error::Database(_));
    }
}
