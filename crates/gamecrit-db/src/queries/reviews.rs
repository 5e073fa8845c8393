//! Review CRUD and navigation to the reviewed game and its author.

use gamecrit_common::{Error, Result, ReviewId};
use rusqlite::Connection;

use super::{games, users, REVIEW_COLS};
use crate::error::from_sqlite;
use crate::models::{Game, NewReview, Review, User};

/// Insert a review.
///
/// # Returns
///
/// * `Ok(Review)` - The created review
/// * `Err(Error::ConstraintViolation)` - If `game_id` or `user_id` names a missing row
pub fn create_review(conn: &Connection, new: &NewReview) -> Result<Review> {
    conn.execute(
        "INSERT INTO reviews (score, comment, game_id, user_id) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            new.score,
            new.comment,
            new.game_id.map(|id| id.get()),
            new.user_id.map(|id| id.get()),
        ],
    )
    .map_err(from_sqlite)?;

    Ok(Review {
        id: ReviewId::from(conn.last_insert_rowid()),
        score: Some(new.score),
        comment: new.comment.clone(),
        game_id: new.game_id,
        user_id: new.user_id,
    })
}

/// Get a review by primary key.
pub fn get_review(conn: &Connection, id: ReviewId) -> Result<Option<Review>> {
    let q = format!("SELECT {REVIEW_COLS} FROM reviews WHERE id = ?1");
    match conn.query_row(&q, [id.get()], Review::from_row) {
        Ok(review) => Ok(Some(review)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(from_sqlite(e)),
    }
}

/// List every review in insertion order.
pub fn list_reviews(conn: &Connection) -> Result<Vec<Review>> {
    let q = format!("SELECT {REVIEW_COLS} FROM reviews ORDER BY id");
    let mut stmt = conn.prepare(&q).map_err(from_sqlite)?;
    let rows = stmt
        .query_map([], Review::from_row)
        .map_err(from_sqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_sqlite)?;
    Ok(rows)
}

/// Write every field of `review` to its row.
pub fn update_review(conn: &Connection, review: &Review) -> Result<()> {
    let rows_affected = conn
        .execute(
            "UPDATE reviews SET score = ?1, comment = ?2, game_id = ?3, user_id = ?4
             WHERE id = ?5",
            rusqlite::params![
                review.score,
                review.comment,
                review.game_id.map(|id| id.get()),
                review.user_id.map(|id| id.get()),
                review.id.get(),
            ],
        )
        .map_err(from_sqlite)?;

    if rows_affected == 0 {
        return Err(Error::not_found("review", review.id));
    }

    Ok(())
}

/// Delete a review. Returns true if a row was removed.
pub fn delete_review(conn: &Connection, id: ReviewId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM reviews WHERE id = ?1", [id.get()])
        .map_err(from_sqlite)?;
    Ok(n > 0)
}

/// The reviewed game; `None` if `game_id` is null or names no row.
pub fn game_of(conn: &Connection, review: &Review) -> Result<Option<Game>> {
    match review.game_id {
        Some(id) => games::get_game(conn, id),
        None => Ok(None),
    }
}

/// The review's author; `None` if `user_id` is null or names no row.
pub fn user_of(conn: &Connection, review: &Review) -> Result<Option<User>> {
    match review.user_id {
        Some(id) => users::get_user(conn, id),
        None => Ok(None),
    }
}
