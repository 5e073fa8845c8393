//! Database query modules.
//!
//! Relationships are resolved by explicit join queries; nothing is loaded
//! lazily.
//! - games: Game CRUD, its users and reviews, cascade delete
//! - users: User CRUD with timestamps, its games and reviews, cascade delete
//! - reviews: Review CRUD and navigation to the reviewed game and author
//! - memberships: The `game_users` association

pub mod games;
pub mod memberships;
pub mod reviews;
pub mod users;

/// Column list matching `Game::from_row`.
pub(crate) const GAME_COLS: &str = "id, title, genre, platform, price";

/// Column list matching `User::from_row`.
pub(crate) const USER_COLS: &str = "id, name, created_at, updated_at";

/// Column list matching `Review::from_row`.
pub(crate) const REVIEW_COLS: &str = "id, score, comment, game_id, user_id";
