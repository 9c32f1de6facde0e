//! Value types shared by the store and the import pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential daily puzzle identifier (puzzle #1 falls on the anchor date)
pub type PuzzleNumber = u32;

/// Canonical player identifier (the store's `users.username`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Store-assigned row id of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of guesses used, or [`Score::FAILED`] for a missed puzzle
///
/// Valid values are 1..=6 and 10. Lower is better; a failure scores 10 so
/// it always ranks below any solved puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Score recorded for a failed or missing puzzle
    pub const FAILED: Score = Score(10);

    /// Maximum number of guesses for a solved puzzle
    pub const MAX_GUESSES: u8 = 6;

    /// Score for a puzzle solved in `guesses` guesses (1..=6)
    pub fn solved(guesses: u8) -> Option<Self> {
        (1..=Self::MAX_GUESSES).contains(&guesses).then_some(Self(guesses))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value == Self::FAILED.0 {
            Ok(Self::FAILED)
        } else {
            Self::solved(value).ok_or_else(|| format!("invalid score {}", value))
        }
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> u8 {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
