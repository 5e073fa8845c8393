//! Error taxonomy for the catalog.
//!
//! Every failure in the workspace is funnelled into [`Error`]. The database
//! crate classifies SQLite failures into the variants below; nothing is
//! retried and nothing is swallowed.

use std::fmt;

/// Common error type for gamecrit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backing store could not be reached or opened.
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    /// An existing table does not have the shape the schema declares.
    #[error("DDL conflict on table '{table}': {detail}")]
    DdlConflict {
        /// Name of the conflicting table.
        table: String,
        /// What differs between the stored and declared shape.
        detail: String,
    },

    /// A write violated a primary-key, foreign-key, NOT NULL or unique constraint.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A lookup by identifier found no row.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "game", "user").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Any other database failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new ConnectionFailure error.
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::ConnectionFailure(msg.into())
    }

    /// Create a new DdlConflict error.
    pub fn ddl_conflict(table: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::DdlConflict {
            table: table.into(),
            detail: detail.into(),
        }
    }

    /// Create a new ConstraintViolation error.
    pub fn constraint<S: Into<String>>(msg: S) -> Self {
        Self::ConstraintViolation(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("game", 42);
        assert_eq!(err.to_string(), "game not found: 42");

        let err = Error::connection("unable to open database file");
        assert_eq!(
            err.to_string(),
            "Connection failure: unable to open database file"
        );

        let err = Error::ddl_conflict("games", "missing column 'price'");
        assert_eq!(
            err.to_string(),
            "DDL conflict on table 'games': missing column 'price'"
        );

        let err = Error::constraint("FOREIGN KEY constraint failed");
        assert_eq!(
            err.to_string(),
            "Constraint violation: FOREIGN KEY constraint failed"
        );

        let err = Error::database("disk I/O error");
        assert_eq!(err.to_string(), "Database error: disk I/O error");

        let err = Error::invalid_input("pool_size must be at least 1");
        assert_eq!(err.to_string(), "Invalid input: pool_size must be at least 1");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(Error::connection("x"), Error::ConnectionFailure(_)));
        assert!(matches!(
            Error::ddl_conflict("users", "x"),
            Error::DdlConflict { ref table, .. } if table == "users"
        ));
        assert!(matches!(Error::constraint("x"), Error::ConstraintViolation(_)));
        assert!(matches!(
            Error::not_found("review", 3),
            Error::NotFound { ref entity, ref id } if entity == "review" && id == "3"
        ));
    }
}
