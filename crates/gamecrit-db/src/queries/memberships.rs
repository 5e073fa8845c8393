//! Game/user membership rows in `game_users`.

use gamecrit_common::{GameId, Result, UserId};
use rusqlite::Connection;

use crate::error::from_sqlite;

/// Associate a user with a game. No-op if the pair already exists.
///
/// # Returns
///
/// * `Ok(true)` - A new association row was inserted
/// * `Ok(false)` - The pair was already associated
/// * `Err(Error::ConstraintViolation)` - If the game or user does not exist
pub fn add_membership(conn: &Connection, game_id: GameId, user_id: UserId) -> Result<bool> {
    let n = conn
        .execute(
            "INSERT INTO game_users (game_id, user_id) VALUES (?1, ?2)
             ON CONFLICT (game_id, user_id) DO NOTHING",
            [game_id.get(), user_id.get()],
        )
        .map_err(from_sqlite)?;
    Ok(n > 0)
}

/// Remove an association. Returns true if removed.
pub fn remove_membership(conn: &Connection, game_id: GameId, user_id: UserId) -> Result<bool> {
    let n = conn
        .execute(
            "DELETE FROM game_users WHERE game_id = ?1 AND user_id = ?2",
            [game_id.get(), user_id.get()],
        )
        .map_err(from_sqlite)?;
    Ok(n > 0)
}

/// Check whether a user is associated with a game.
pub fn is_member(conn: &Connection, game_id: GameId, user_id: UserId) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM game_users WHERE game_id = ?1 AND user_id = ?2)",
        [game_id.get(), user_id.get()],
        |row| row.get(0),
    )
    .map_err(from_sqlite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewGame, NewUser};
    use crate::pool::{init_memory_pool, PooledConnection};
    use crate::queries::{games, users};
    use assert_matches::assert_matches;
    use gamecrit_common::Error;

    fn setup() -> (PooledConnection, GameId, UserId) {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let game = games::create_game(&conn, &NewGame::new("Chrono", "RPG", "PC", 40)).unwrap();
        let user = users::create_user(&conn, &NewUser::new("Ada")).unwrap();
        (conn, game.id, user.id)
    }

    #[test]
    fn add_is_idempotent() {
        let (conn, gid, uid) = setup();

        assert!(add_membership(&conn, gid, uid).unwrap());
        for _ in 0..3 {
            assert!(!add_membership(&conn, gid, uid).unwrap());
        }

        let members = games::list_users(&conn, gid).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, uid);
        assert_eq!(users::list_games(&conn, uid).unwrap().len(), 1);
    }

    #[test]
    fn add_and_remove() {
        let (conn, gid, uid) = setup();
        add_membership(&conn, gid, uid).unwrap();
        assert!(is_member(&conn, gid, uid).unwrap());

        assert!(remove_membership(&conn, gid, uid).unwrap());
        assert!(!remove_membership(&conn, gid, uid).unwrap());
        assert!(!is_member(&conn, gid, uid).unwrap());
        assert!(games::list_users(&conn, gid).unwrap().is_empty());
    }

    #[test]
    fn missing_side_is_constraint_violation() {
        let (conn, gid, uid) = setup();
        assert_matches!(
            add_membership(&conn, gid, UserId::from(999)),
            Err(Error::ConstraintViolation(_))
        );
        assert_matches!(
            add_membership(&conn, GameId::from(999), uid),
            Err(Error::ConstraintViolation(_))
        );
    }
}
