//! # WGT Common Library
//!
//! Shared code for the Wordle Group Tracker tools:
//! - Value types (player ids, scores)
//! - Puzzle calendar (puzzle number <-> date)
//! - Configuration loading
//! - SQLite store schema and queries

pub mod config;
pub mod db;
pub mod error;
pub mod puzzle;
pub mod types;

pub use error::{Error, Result};
pub use types::{PlayerId, PuzzleNumber, Score, UserId};
