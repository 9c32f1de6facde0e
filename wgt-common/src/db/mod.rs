//! SQLite store for players and their daily scores
//!
//! The `scores` table is keyed by `(user_id, wordle_number)`; every write
//! goes through insert-or-ignore so repeated imports are safe.

pub mod init;
pub mod scores;
pub mod users;

pub use init::init_database;
