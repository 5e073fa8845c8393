//! Game CRUD, relationship navigation, and cascade delete.

use gamecrit_common::{Error, GameId, Result};
use rusqlite::Connection;

use super::{GAME_COLS, REVIEW_COLS};
use crate::error::from_sqlite;
use crate::models::{CascadeReport, Game, NewGame, Review, User};

/// Insert a game and return it with its generated id.
pub fn create_game(conn: &Connection, new: &NewGame) -> Result<Game> {
    conn.execute(
        "INSERT INTO games (title, genre, platform, price) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![new.title, new.genre, new.platform, new.price],
    )
    .map_err(from_sqlite)?;

    Ok(Game {
        id: GameId::from(conn.last_insert_rowid()),
        title: Some(new.title.clone()),
        genre: Some(new.genre.clone()),
        platform: Some(new.platform.clone()),
        price: Some(new.price),
    })
}

/// Get a game by primary key.
pub fn get_game(conn: &Connection, id: GameId) -> Result<Option<Game>> {
    let q = format!("SELECT {GAME_COLS} FROM games WHERE id = ?1");
    match conn.query_row(&q, [id.get()], Game::from_row) {
        Ok(game) => Ok(Some(game)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(from_sqlite(e)),
    }
}

/// List all games in insertion order.
pub fn list_games(conn: &Connection) -> Result<Vec<Game>> {
    let q = format!("SELECT {GAME_COLS} FROM games ORDER BY id");
    let mut stmt = conn.prepare(&q).map_err(from_sqlite)?;
    let rows = stmt
        .query_map([], Game::from_row)
        .map_err(from_sqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_sqlite)?;
    Ok(rows)
}

/// Write every field of `game` to its row.
///
/// # Returns
///
/// * `Ok(())` - If the update succeeded
/// * `Err(Error::NotFound)` - If no game has `game.id`
pub fn update_game(conn: &Connection, game: &Game) -> Result<()> {
    let rows_affected = conn
        .execute(
            "UPDATE games SET title = ?1, genre = ?2, platform = ?3, price = ?4 WHERE id = ?5",
            rusqlite::params![game.title, game.genre, game.platform, game.price, game.id.get()],
        )
        .map_err(from_sqlite)?;

    if rows_affected == 0 {
        return Err(Error::not_found("game", game.id));
    }

    Ok(())
}

/// Users associated with a game through `game_users`, ordered by user id.
pub fn list_users(conn: &Connection, id: GameId) -> Result<Vec<User>> {
    let mut stmt = conn
        .prepare(
            "SELECT u.id, u.name, u.created_at, u.updated_at
             FROM users u
             JOIN game_users gu ON gu.user_id = u.id
             WHERE gu.game_id = ?1
             ORDER BY u.id",
        )
        .map_err(from_sqlite)?;
    let rows = stmt
        .query_map([id.get()], User::from_row)
        .map_err(from_sqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_sqlite)?;
    Ok(rows)
}

/// Reviews of a game in insertion order.
pub fn list_reviews(conn: &Connection, id: GameId) -> Result<Vec<Review>> {
    let q = format!("SELECT {REVIEW_COLS} FROM reviews WHERE game_id = ?1 ORDER BY id");
    let mut stmt = conn.prepare(&q).map_err(from_sqlite)?;
    let rows = stmt
        .query_map([id.get()], Review::from_row)
        .map_err(from_sqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_sqlite)?;
    Ok(rows)
}

/// Delete a game together with its reviews and association rows.
///
/// All three deletes run in one transaction; if any step fails, or the game
/// does not exist, nothing is removed.
///
/// # Returns
///
/// * `Ok(CascadeReport)` - Counts of the dependent rows removed
/// * `Err(Error::NotFound)` - If no game has `id`
pub fn delete_game(conn: &Connection, id: GameId) -> Result<CascadeReport> {
    let tx = conn.unchecked_transaction().map_err(from_sqlite)?;

    let reviews_deleted = tx
        .execute("DELETE FROM reviews WHERE game_id = ?1", [id.get()])
        .map_err(from_sqlite)?;
    let memberships_deleted = tx
        .execute("DELETE FROM game_users WHERE game_id = ?1", [id.get()])
        .map_err(from_sqlite)?;
    let games_deleted = tx
        .execute("DELETE FROM games WHERE id = ?1", [id.get()])
        .map_err(from_sqlite)?;

    if games_deleted == 0 {
        return Err(Error::not_found("game", id));
    }

    tx.commit().map_err(from_sqlite)?;

    tracing::debug!(
        game_id = id.get(),
        reviews_deleted,
        memberships_deleted,
        "Deleted game"
    );

    Ok(CascadeReport {
        reviews_deleted,
        memberships_deleted,
    })
}
