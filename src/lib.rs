//! gamecrit: a SQLite catalog of games, users, and reviews.
//!
//! The schema and data access live in `gamecrit-db`; this crate adds
//! configuration loading and the reports behind the `gamecrit` binary.

pub mod config;
pub mod status;

pub use gamecrit_common as common;
pub use gamecrit_db as db;
