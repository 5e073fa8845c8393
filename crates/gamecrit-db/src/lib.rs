//! Gamecrit-DB: schema, connections, and data access for the review catalog.
//!
//! This crate stores games, users, and reviews in a single SQLite file using
//! rusqlite with r2d2 connection pooling. Every operation takes an explicit
//! connection; there is no global engine.
//!
//! # Modules
//!
//! - `schema` - Table metadata and idempotent table creation
//! - `pool` - Connection and pool management
//! - `models` - Rust models matching the tables
//! - `queries` - Explicit data access, relationship navigation, cascade deletes
//!
//! # Example
//!
//! ```no_run
//! use gamecrit_common::config::DatabaseConfig;
//! use gamecrit_db::models::NewGame;
//! use gamecrit_db::pool::{get_conn, init_pool};
//! use gamecrit_db::queries::games;
//!
//! let pool = init_pool(&DatabaseConfig::default()).unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let game = games::create_game(&conn, &NewGame::new("Chrono", "RPG", "PC", 40)).unwrap();
//! println!("Created game {}", game.id);
//! ```

mod error;
pub mod models;
pub mod pool;
pub mod queries;
pub mod schema;
