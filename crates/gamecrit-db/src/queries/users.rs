//! User CRUD operations.
//!
//! `created_at` is written once at insertion, by the caller or by the
//! database clock. Every update stamps `updated_at` from the database clock
//! and never touches `created_at`.

use gamecrit_common::{Error, Result, UserId};
use rusqlite::Connection;

use super::{REVIEW_COLS, USER_COLS};
use crate::error::from_sqlite;
use crate::models::{format_timestamp, CascadeReport, Game, NewUser, Review, User};
use crate::schema::NOW_SQL;

/// Create a new user and return it as stored.
///
/// # Returns
///
/// * `Ok(User)` - The created user, with `created_at` filled in
/// * `Err(Error)` - If a database error occurs
pub fn create_user(conn: &Connection, new: &NewUser) -> Result<User> {
    let inserted = match new.created_at {
        Some(created_at) => conn.execute(
            "INSERT INTO users (name, created_at) VALUES (?1, ?2)",
            rusqlite::params![new.name, format_timestamp(&created_at)],
        ),
        None => conn.execute("INSERT INTO users (name) VALUES (?1)", [&new.name]),
    };
    inserted.map_err(from_sqlite)?;

    // Re-read to pick up the database-supplied created_at.
    let id = UserId::from(conn.last_insert_rowid());
    get_user(conn, id)?.ok_or_else(|| Error::not_found("user", id))
}

/// Get a user by primary key.
pub fn get_user(conn: &Connection, id: UserId) -> Result<Option<User>> {
    let q = format!("SELECT {USER_COLS} FROM users WHERE id = ?1");
    match conn.query_row(&q, [id.get()], User::from_row) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(from_sqlite(e)),
    }
}

/// List all users in insertion order.
pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let q = format!("SELECT {USER_COLS} FROM users ORDER BY id");
    let mut stmt = conn.prepare(&q).map_err(from_sqlite)?;
    let rows = stmt
        .query_map([], User::from_row)
        .map_err(from_sqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_sqlite)?;
    Ok(rows)
}

/// Write the mutable fields of `user` and stamp `updated_at`.
///
/// `user.created_at` and `user.updated_at` are ignored.
///
/// # Returns
///
/// * `Ok(User)` - The row as stored after the update
/// * `Err(Error::NotFound)` - If no user has `user.id`
pub fn update_user(conn: &Connection, user: &User) -> Result<User> {
    let q = format!("UPDATE users SET name = ?1, updated_at = {NOW_SQL} WHERE id = ?2");
    let rows_affected = conn
        .execute(&q, rusqlite::params![user.name, user.id.get()])
        .map_err(from_sqlite)?;

    if rows_affected == 0 {
        return Err(Error::not_found("user", user.id));
    }

    get_user(conn, user.id)?.ok_or_else(|| Error::not_found("user", user.id))
}

/// Games associated with a user through `game_users`, ordered by game id.
pub fn list_games(conn: &Connection, id: UserId) -> Result<Vec<Game>> {
    let mut stmt = conn
        .prepare(
            "SELECT g.id, g.title, g.genre, g.platform, g.price
             FROM games g
             JOIN game_users gu ON gu.game_id = g.id
             WHERE gu.user_id = ?1
             ORDER BY g.id",
        )
        .map_err(from_sqlite)?;
    let rows = stmt
        .query_map([id.get()], Game::from_row)
        .map_err(from_sqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_sqlite)?;
    Ok(rows)
}

/// Reviews written by a user in insertion order.
pub fn list_reviews(conn: &Connection, id: UserId) -> Result<Vec<Review>> {
    let q = format!("SELECT {REVIEW_COLS} FROM reviews WHERE user_id = ?1 ORDER BY id");
    let mut stmt = conn.prepare(&q).map_err(from_sqlite)?;
    let rows = stmt
        .query_map([id.get()], Review::from_row)
        .map_err(from_sqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_sqlite)?;
    Ok(rows)
}

/// Delete a user together with their reviews and association rows.
///
/// Runs in one transaction; nothing is removed if the user does not exist
/// or any step fails.
pub fn delete_user(conn: &Connection, id: UserId) -> Result<CascadeReport> {
    let tx = conn.unchecked_transaction().map_err(from_sqlite)?;

    let reviews_deleted = tx
        .execute("DELETE FROM reviews WHERE user_id = ?1", [id.get()])
        .map_err(from_sqlite)?;
    let memberships_deleted = tx
        .execute("DELETE FROM game_users WHERE user_id = ?1", [id.get()])
        .map_err(from_sqlite)?;
    let users_deleted = tx
        .execute("DELETE FROM users WHERE id = ?1", [id.get()])
        .map_err(from_sqlite)?;

    if users_deleted == 0 {
        return Err(Error::not_found("user", id));
    }

    tx.commit().map_err(from_sqlite)?;

    tracing::debug!(
        user_id = id.get(),
        reviews_deleted,
        memberships_deleted,
        "Deleted user"
    );

    Ok(CascadeReport {
        reviews_deleted,
        memberships_deleted,
    })
}
