//! Message reconstruction
//!
//! Turns raw export lines into discrete messages. A line matching the header
//! pattern `DD/MM/YYYY, HH:MM - Sender: text` opens a new message; any other
//! non-blank line continues the open message. Blank lines are skipped without
//! closing the message.
//!
//! Lines that cannot be attached to anything (continuations before the first
//! header, or after a header whose date is not a real calendar date) are
//! dropped and counted in [`ReconstructStats::ignored_lines`].

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

static HEADER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2}/[0-9]{2}/[0-9]{4}),\s+[0-9]{2}:[0-9]{2}\s+-\s+([^:]+):\s*(.*)$")
        .expect("header pattern is valid")
});

/// One chat message: a header line plus its continuation lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Date as written in the export (no timezone)
    pub date: NaiveDate,
    pub sender_name: String,
    /// Message body, continuation lines joined with `\n`
    pub text: String,
}

/// Line counters collected while reconstructing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconstructStats {
    pub lines_read: usize,
    pub messages: usize,
    pub ignored_lines: usize,
}

enum Line<'a> {
    Header(Message),
    BadHeader(&'a str),
    Blank,
    Continuation(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if line.trim().is_empty() {
        return Line::Blank;
    }

    let Some(caps) = HEADER_PATTERN.captures(line) else {
        return Line::Continuation(line);
    };

    match NaiveDate::parse_from_str(&caps[1], "%d/%m/%Y") {
        Ok(date) => Line::Header(Message {
            date,
            sender_name: caps[2].to_string(),
            text: caps[3].to_string(),
        }),
        Err(_) => Line::BadHeader(line),
    }
}

/// Lazy iterator of messages over a sequence of lines
///
/// A message is yielded once the next header (or the end of input) is seen.
pub struct Messages<'a, I> {
    lines: I,
    open: Option<Message>,
    stats: ReconstructStats,
    _marker: std::marker::PhantomData<&'a str>,
}

impl<'a, I> Messages<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            open: None,
            stats: ReconstructStats::default(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Counters so far; complete once the iterator is exhausted
    pub fn stats(&self) -> ReconstructStats {
        self.stats
    }
}

impl<'a, I> Iterator for Messages<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    type Item = Message;

    fn next(&mut self) -> Option<Message> {
        for raw in self.lines.by_ref() {
            self.stats.lines_read += 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);

            match classify(line) {
                Line::Header(message) => {
                    if let Some(done) = self.open.replace(message) {
                        self.stats.messages += 1;
                        return Some(done);
                    }
                }
                Line::BadHeader(text) => {
                    warn!(line = text, "Header with invalid date; message dropped");
                    self.stats.ignored_lines += 1;
                    if let Some(done) = self.open.take() {
                        self.stats.messages += 1;
                        return Some(done);
                    }
                }
                Line::Blank => {}
                Line::Continuation(text) => match self.open.as_mut() {
                    Some(message) => {
                        message.text.push('\n');
                        message.text.push_str(text);
                    }
                    None => {
                        debug!(line = text, "Continuation line without open message ignored");
                        self.stats.ignored_lines += 1;
                    }
                },
            }
        }

        let last = self.open.take();
        if last.is_some() {
            self.stats.messages += 1;
        }
        last
    }
}

/// Reconstruct messages from a whole export
pub fn messages(text: &str) -> Messages<'_, std::str::Lines<'_>> {
    Messages::new(text.lines())
}
