//! Gamecrit-Common: shared types for the game review catalog.
//!
//! - **Typed IDs**: integer newtypes for games, users, and reviews
//! - **Error Handling**: the catalog error taxonomy and result alias
//! - **Configuration**: database settings shared by the CLI and the pool
//!
//! # Examples
//!
//! ```
//! use gamecrit_common::{Error, GameId, Result};
//!
//! let id = GameId::from(7);
//! assert_eq!(id.get(), 7);
//!
//! let lookup = || -> Result<()> {
//!     Err(Error::not_found("game", id))
//! };
//! assert!(lookup().is_err());
//! ```

pub mod config;
pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;
