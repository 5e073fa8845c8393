//! End-to-end catalog behaviour against on-disk and in-memory databases.

use gamecrit::common::config::DatabaseConfig;
use gamecrit::common::Error;
use gamecrit::db::models::{NewGame, NewReview, NewUser};
use gamecrit::db::pool::{get_conn, init_memory_pool, init_pool, open_connection};
use gamecrit::db::queries::{games, memberships, reviews, users};
use gamecrit::db::schema;

#[test]
fn chrono_scenario() {
    let pool = init_memory_pool().unwrap();
    let conn = get_conn(&pool).unwrap();

    let game = games::create_game(&conn, &NewGame::new("Chrono", "RPG", "PC", 40)).unwrap();
    let ada = users::create_user(&conn, &NewUser::new("Ada")).unwrap();
    memberships::add_membership(&conn, game.id, ada.id).unwrap();
    let review = reviews::create_review(
        &conn,
        &NewReview {
            score: 9,
            comment: Some("Great".into()),
            game_id: Some(game.id),
            user_id: Some(ada.id),
        },
    )
    .unwrap();

    let game_reviews = games::list_reviews(&conn, game.id).unwrap();
    assert_eq!(game_reviews.len(), 1);
    assert_eq!(game_reviews[0].score, Some(9));

    let game_users = games::list_users(&conn, game.id).unwrap();
    assert_eq!(game_users.len(), 1);
    assert_eq!(game_users[0].name.as_deref(), Some("Ada"));

    assert_eq!(users::list_reviews(&conn, ada.id).unwrap(), vec![review.clone()]);
    assert_eq!(reviews::game_of(&conn, &review).unwrap(), Some(game.clone()));

    games::delete_game(&conn, game.id).unwrap();

    assert!(reviews::get_review(&conn, review.id).unwrap().is_none());
    assert!(!memberships::is_member(&conn, game.id, ada.id).unwrap());
    assert_eq!(users::get_user(&conn, ada.id).unwrap(), Some(ada.clone()));
    assert!(users::list_games(&conn, ada.id).unwrap().is_empty());
}

#[test]
fn create_all_twice_on_file_leaves_four_tables() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig::at(dir.path().join("many_to_many.db"));

    let conn = open_connection(&config).unwrap();
    assert_eq!(schema::create_all(&conn).unwrap(), 4);
    assert_eq!(schema::create_all(&conn).unwrap(), 0);
    drop(conn);

    let conn = open_connection(&config).unwrap();
    assert_eq!(schema::create_all(&conn).unwrap(), 0);
    assert_eq!(
        schema::table_names(&conn).unwrap(),
        vec!["game_users", "games", "reviews", "users"]
    );
}

#[test]
fn pool_on_conflicting_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE games (id INTEGER PRIMARY KEY, name TEXT);")
            .unwrap();
    }

    let result = init_pool(&DatabaseConfig::at(&path));
    assert!(matches!(result, Err(Error::DdlConflict { ref table, .. }) if table == "games"));
}

#[test]
fn deleting_one_game_keeps_other_reviews() {
    let pool = init_memory_pool().unwrap();
    let conn = get_conn(&pool).unwrap();

    let doomed = games::create_game(&conn, &NewGame::new("Chrono", "RPG", "PC", 40)).unwrap();
    let kept = games::create_game(&conn, &NewGame::new("Myst", "Puzzle", "Mac", 30)).unwrap();
    let ada = users::create_user(&conn, &NewUser::new("Ada")).unwrap();
    let bob = users::create_user(&conn, &NewUser::new("Bob")).unwrap();

    let mut kept_reviews = Vec::new();
    for (game_id, user_id, score) in [
        (doomed.id, ada.id, 9),
        (kept.id, ada.id, 6),
        (doomed.id, bob.id, 4),
        (kept.id, bob.id, 8),
        (doomed.id, ada.id, 7),
    ] {
        let review = reviews::create_review(
            &conn,
            &NewReview {
                score,
                comment: None,
                game_id: Some(game_id),
                user_id: Some(user_id),
            },
        )
        .unwrap();
        if game_id == kept.id {
            kept_reviews.push(review);
        }
    }

    let report = games::delete_game(&conn, doomed.id).unwrap();
    assert_eq!(report.reviews_deleted, 3);
    assert_eq!(reviews::list_reviews(&conn).unwrap(), kept_reviews);
}

#[test]
fn pooled_connections_see_each_others_writes() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_pool(&DatabaseConfig::at(dir.path().join("catalog.db"))).unwrap();

    let writer = get_conn(&pool).unwrap();
    let reader = get_conn(&pool).unwrap();

    let user = users::create_user(&writer, &NewUser::new("Ada")).unwrap();
    assert_eq!(users::get_user(&reader, user.id).unwrap(), Some(user));
}

#[test]
fn existing_sqlalchemy_database_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("many_to_many.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE games (
                id INTEGER NOT NULL, title VARCHAR, genre VARCHAR,
                platform VARCHAR, price INTEGER, PRIMARY KEY (id)
            );
            CREATE TABLE users (
                id INTEGER NOT NULL, name VARCHAR,
                created_at DATETIME DEFAULT (CURRENT_TIMESTAMP),
                updated_at DATETIME, PRIMARY KEY (id)
            );
            CREATE TABLE game_users (
                game_id INTEGER NOT NULL, user_id INTEGER NOT NULL,
                PRIMARY KEY (game_id, user_id),
                FOREIGN KEY(game_id) REFERENCES games (id),
                FOREIGN KEY(user_id) REFERENCES users (id)
            );
            CREATE TABLE reviews (
                id INTEGER NOT NULL, score INTEGER, comment VARCHAR,
                game_id INTEGER, user_id INTEGER, PRIMARY KEY (id),
                FOREIGN KEY(game_id) REFERENCES games (id),
                FOREIGN KEY(user_id) REFERENCES users (id)
            );
            INSERT INTO games (title, genre, platform, price) VALUES (NULL, 'RPG', 'PC', NULL);",
        )
        .unwrap();
    }

    let pool = init_pool(&DatabaseConfig::at(&path)).unwrap();
    let conn = get_conn(&pool).unwrap();
    assert_eq!(schema::current_version(&conn).unwrap(), schema::SCHEMA_VERSION);

    let untitled = &games::list_games(&conn).unwrap()[0];
    assert!(untitled.title.is_none());
    assert_eq!(untitled.genre.as_deref(), Some("RPG"));

    // The table's own CURRENT_TIMESTAMP default supplies created_at.
    let ada = users::create_user(&conn, &NewUser::new("Ada")).unwrap();
    assert!(ada.created_at.is_some());
    memberships::add_membership(&conn, untitled.id, ada.id).unwrap();
    assert_eq!(games::list_users(&conn, untitled.id).unwrap(), vec![ada]);
}
