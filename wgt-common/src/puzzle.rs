//! Puzzle calendar utilities
//!
//! Puzzle numbers are sequential days counted from an anchor date:
//! puzzle #1 is played on the anchor date, puzzle #n on `anchor + (n - 1)` days.

use crate::types::PuzzleNumber;
use chrono::{Days, Local, NaiveDate};

/// Date of puzzle #1 for the public Wordle numbering
pub const DEFAULT_ANCHOR_DATE: &str = "2021-06-19";

/// Largest puzzle number accepted from chat text (roughly 2700 years of daily puzzles)
pub const MAX_PUZZLE_NUMBER: PuzzleNumber = 1_000_000;

/// Parse [`DEFAULT_ANCHOR_DATE`]
pub fn default_anchor_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 6, 19).unwrap_or(NaiveDate::MIN)
}

/// Date on which puzzle `number` is played
///
/// Saturates at `NaiveDate::MAX` for numbers beyond the calendar range, which
/// cannot happen for numbers up to [`MAX_PUZZLE_NUMBER`].
pub fn date_for_puzzle(anchor: NaiveDate, number: PuzzleNumber) -> NaiveDate {
    let offset = u64::from(number.saturating_sub(1));
    anchor.checked_add_days(Days::new(offset)).unwrap_or(NaiveDate::MAX)
}

/// Puzzle number played on `date`, or `None` before the anchor date
pub fn puzzle_for_date(anchor: NaiveDate, date: NaiveDate) -> Option<PuzzleNumber> {
    let days = date.signed_duration_since(anchor).num_days();
    if days < 0 {
        return None;
    }
    PuzzleNumber::try_from(days + 1).ok()
}

/// Puzzle number for today's local date
pub fn current_puzzle(anchor: NaiveDate) -> Option<PuzzleNumber> {
    puzzle_for_date(anchor, Local::now().date_naive())
}
