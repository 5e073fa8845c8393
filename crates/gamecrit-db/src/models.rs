//! Rust structs mapping to the catalog tables.
//!
//! Each stored model implements `from_row` for constructing itself from a
//! `rusqlite::Row` whose columns follow the model's field order. Every
//! non-key column is nullable in the store, so stored models carry `Option`
//! fields; the `New*` insert types always supply a value.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use gamecrit_common::{GameId, ReviewId, UserId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Render a timestamp the way SQLite's `strftime('%Y-%m-%dT%H:%M:%fZ')` does.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 as well as SQLite's `CURRENT_TIMESTAMP` form
/// (`YYYY-MM-DD HH:MM:SS[.fff]`, UTC), which databases created by other
/// tools use for column defaults.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| rfc_err),
    }
}

fn get_opt_timestamp(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(s) => parse_timestamp(&s).map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        }),
        None => Ok(None),
    }
}

/// Displays a nullable column the way an unset value reads in logs: `None`.
struct OrNone<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for OrNone<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => v.fmt(f),
            None => f.write_str("None"),
        }
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub platform: Option<String>,
    pub price: Option<i64>,
}

impl Game {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: GameId::from(row.get::<_, i64>(0)?),
            title: row.get(1)?,
            genre: row.get(2)?,
            platform: row.get(3)?,
            price: row.get(4)?,
        })
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Game(id={}, title={}, platform={})",
            self.id,
            OrNone(&self.title),
            OrNone(&self.platform)
        )
    }
}

/// Fields for inserting a game; the id is generated by the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewGame {
    pub title: String,
    pub genre: String,
    pub platform: String,
    pub price: i64,
}

impl NewGame {
    pub fn new(
        title: impl Into<String>,
        genre: impl Into<String>,
        platform: impl Into<String>,
        price: i64,
    ) -> Self {
        Self {
            title: title.into(),
            genre: genre.into(),
            platform: platform.into(),
            price,
        }
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: Option<String>,
    /// Set once at insertion.
    pub created_at: Option<DateTime<Utc>>,
    /// `None` until the first update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: UserId::from(row.get::<_, i64>(0)?),
            name: row.get(1)?,
            created_at: get_opt_timestamp(row, 2)?,
            updated_at: get_opt_timestamp(row, 3)?,
        })
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User(id={}, name={})", self.id, OrNone(&self.name))
    }
}

/// Fields for inserting a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    /// Explicit creation time; the database clock is used when `None`.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    pub id: ReviewId,
    pub score: Option<i64>,
    pub comment: Option<String>,
    pub game_id: Option<GameId>,
    pub user_id: Option<UserId>,
}

impl Review {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: ReviewId::from(row.get::<_, i64>(0)?),
            score: row.get(1)?,
            comment: row.get(2)?,
            game_id: row.get::<_, Option<i64>>(3)?.map(GameId::from),
            user_id: row.get::<_, Option<i64>>(4)?.map(UserId::from),
        })
    }
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Review(id={}, score={}, game_id={})",
            self.id,
            OrNone(&self.score),
            OrNone(&self.game_id)
        )
    }
}

/// Fields for inserting a review.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewReview {
    pub score: i64,
    pub comment: Option<String>,
    pub game_id: Option<GameId>,
    pub user_id: Option<UserId>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Rows removed alongside a game or user.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CascadeReport {
    pub reviews_deleted: usize,
    pub memberships_deleted: usize,
}

/// Number of rows in one catalog table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TableCount {
    pub table: String,
    pub rows: i64,
}
