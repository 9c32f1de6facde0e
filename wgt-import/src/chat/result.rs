//! Result extraction
//!
//! Pulls a `(puzzle number, score)` pair out of a message using the share
//! format `Wordle 1,234 4/6` (case-insensitive). Only the first match in a
//! message is used.

use super::message::Message;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use wgt_common::puzzle::MAX_PUZZLE_NUMBER;
use wgt_common::{PuzzleNumber, Score};

static RESULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)wordle\s+([0-9,]+)\s+([x0-9])/6").expect("result pattern is valid")
});

/// A result as posted, before the sender is resolved to a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    pub date: NaiveDate,
    pub sender_name: String,
    pub puzzle_number: PuzzleNumber,
    pub score: Score,
}

/// A result pattern was found but one of its tokens is unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("malformed puzzle number {token:?} from {sender}")]
    PuzzleNumber { sender: String, token: String },

    #[error("malformed score {token:?} from {sender}")]
    Score { sender: String, token: String },
}

/// Parse a puzzle number token, stripping thousands separators
pub fn parse_puzzle_number(token: &str) -> Option<PuzzleNumber> {
    let digits: String = token.chars().filter(|c| *c != ',').collect();
    digits
        .parse::<PuzzleNumber>()
        .ok()
        .filter(|n| (1..=MAX_PUZZLE_NUMBER).contains(n))
}

/// Parse a score token: `X` (any case) is a failure, `1`..`6` are guesses
pub fn parse_score(token: &str) -> Option<Score> {
    if token.eq_ignore_ascii_case("x") {
        return Some(Score::FAILED);
    }
    token.parse::<u8>().ok().and_then(Score::solved)
}

/// Extract the result posted in `message`, if any
///
/// Returns `Ok(None)` when the text holds no result, and an error when the
/// pattern matched but a token could not be parsed.
pub fn extract(message: &Message) -> Result<Option<RawResult>, ExtractError> {
    let Some(caps) = RESULT_PATTERN.captures(&message.text) else {
        return Ok(None);
    };

    let puzzle_number = parse_puzzle_number(&caps[1]).ok_or_else(|| ExtractError::PuzzleNumber {
        sender: message.sender_name.clone(),
        token: caps[1].to_string(),
    })?;

    let score = parse_score(&caps[2]).ok_or_else(|| ExtractError::Score {
        sender: message.sender_name.clone(),
        token: caps[2].to_string(),
    })?;

    Ok(Some(RawResult {
        date: message.date,
        sender_name: message.sender_name.clone(),
        puzzle_number,
        score,
    }))
}

/// Lazily extract results from a message sequence, keeping input order
pub fn extract_all<'m, I>(messages: I) -> impl Iterator<Item = Result<RawResult, ExtractError>> + 'm
where
    I: IntoIterator<Item = &'m Message>,
    I::IntoIter: 'm,
{
    messages
        .into_iter()
        .filter_map(|message| extract(message).transpose())
}
