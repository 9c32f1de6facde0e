//! Import run diagnostics
//!
//! Everything that was skipped, dropped or filled in during a run is counted
//! here so an operator can review it. Nothing in this module is an error.

use crate::chat::ReconstructStats;
use crate::emit::ApplyReport;
use crate::error::ImportResult;
use crate::pipeline::write_output;
use crate::identity::Resolution;
use crate::reconcile::{PuzzleRange, Reconciliation};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};
use wgt_common::{PlayerId, PuzzleNumber};

/// Counters for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Lines in the export
    pub lines_read: usize,
    /// Messages reconstructed
    pub messages: usize,
    /// Lines that belonged to no message
    pub ignored_lines: usize,
    /// Messages that held a well-formed result
    pub results_parsed: usize,
    /// Messages whose result had an unusable puzzle number or score
    pub malformed_results: usize,
    /// Results attributed to a player
    pub resolved_results: usize,
    /// Unknown sender names with the number of results dropped for each
    pub unresolved_senders: BTreeMap<String, usize>,
    /// Puzzle numbers covered, `None` if no results were found
    pub range: Option<PuzzleRange>,
    pub distinct_puzzles: usize,
    /// First puzzle number per player
    pub first_puzzles: BTreeMap<PlayerId, PuzzleNumber>,
    pub observed: usize,
    pub synthesized: usize,
    pub duplicates: usize,
    pub operations: usize,
    /// Today's puzzle number under the configured anchor date
    pub current_puzzle: Option<PuzzleNumber>,
    /// Store outcome, when the batch was applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply: Option<ApplyReport>,
}

impl ImportSummary {
    /// Assemble the summary from the stage outputs
    pub fn new(
        reconstruct: ReconstructStats,
        results_parsed: usize,
        malformed_results: usize,
        resolution: &Resolution,
        reconciliation: &Reconciliation,
        current_puzzle: Option<PuzzleNumber>,
    ) -> Self {
        Self {
            lines_read: reconstruct.lines_read,
            messages: reconstruct.messages,
            ignored_lines: reconstruct.ignored_lines,
            results_parsed,
            malformed_results,
            resolved_results: resolution.resolved.len(),
            unresolved_senders: resolution.unresolved.clone(),
            range: reconciliation.range,
            distinct_puzzles: reconciliation.distinct_puzzles,
            first_puzzles: reconciliation.windows.clone(),
            observed: reconciliation.observed,
            synthesized: reconciliation.synthesized,
            duplicates: reconciliation.duplicates,
            operations: reconciliation.records.len(),
            current_puzzle,
            apply: None,
        }
    }

    /// Highest puzzle number lies after today's puzzle (likely a typo in the chat)
    pub fn has_future_puzzles(&self) -> bool {
        match (self.range, self.current_puzzle) {
            (Some(range), Some(current)) => range.last > current,
            _ => false,
        }
    }

    /// Human-readable report lines
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Found {} messages in {} lines ({} ignored)",
                self.messages, self.lines_read, self.ignored_lines
            ),
            format!(
                "Parsed {} scores from chat ({} malformed)",
                self.results_parsed, self.malformed_results
            ),
            format!(
                "Resolved {} scores, {} unknown senders",
                self.resolved_results,
                self.unresolved_senders.len()
            ),
        ];

        for (name, count) in &self.unresolved_senders {
            lines.push(format!("  Unknown player: {} ({} scores dropped)", name, count));
        }

        match self.range {
            Some(range) => lines.push(format!(
                "Games range: {} to {} ({} distinct games posted)",
                range.first, range.last, self.distinct_puzzles
            )),
            None => lines.push("Games range: none".to_string()),
        }

        for (player, first) in &self.first_puzzles {
            lines.push(format!("  {} first game: {}", player, first));
        }

        lines.push(format!(
            "Total scores with missing filled: {} ({} posted, {} filled as 10, {} duplicates superseded)",
            self.operations, self.observed, self.synthesized, self.duplicates
        ));

        if let Some(report) = &self.apply {
            lines.push(format!(
                "Store: {} inserted, {} already present, {} skipped",
                report.inserted, report.already_present, report.skipped
            ));
        }

        lines
    }

    /// Write the summary as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> ImportResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_output(path, &json)
    }

    /// Write the report to the log
    pub fn log(&self) {
        for line in self.display_lines() {
            info!("{}", line);
        }

        if self.has_future_puzzles() {
            warn!(
                "Highest game {} is after today's game {}; check the chat for typos",
                self.range.map(|r| r.last).unwrap_or_default(),
                self.current_puzzle.unwrap_or_default()
            );
        }

        if let Some(report) = &self.apply {
            for player in &report.unknown_players {
                warn!(player = %player, "Player missing from store; use --seed-players to create");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> ImportSummary {
        let mut unresolved_senders = BTreeMap::new();
        unresolved_senders.insert("Stranger".to_string(), 2);
        let mut first_puzzles = BTreeMap::new();
        first_puzzles.insert(PlayerId::new("rob"), 200);

        ImportSummary {
            lines_read: 10,
            messages: 6,
            ignored_lines: 1,
            results_parsed: 5,
            malformed_results: 1,
            resolved_results: 3,
            unresolved_senders,
            range: Some(PuzzleRange { first: 200, last: 203 }),
            distinct_puzzles: 3,
            first_puzzles,
            observed: 3,
            synthesized: 1,
            duplicates: 0,
            operations: 4,
            current_puzzle: Some(1200),
            apply: None,
        }
    }

    #[test]
    fn test_display_lines_report_every_counter() {
        let lines = summary().display_lines();

        assert_eq!(lines[0], "Found 6 messages in 10 lines (1 ignored)");
        assert_eq!(lines[1], "Parsed 5 scores from chat (1 malformed)");
        assert!(lines.contains(&"  Unknown player: Stranger (2 scores dropped)".to_string()));
        assert!(lines.contains(&"Games range: 200 to 203 (3 distinct games posted)".to_string()));
        assert!(lines.contains(&"  rob first game: 200".to_string()));
        assert!(lines.last().unwrap().starts_with("Total scores with missing filled: 4"));
    }

    #[test]
    fn test_apply_report_line() {
        let mut summary = summary();
        summary.apply = Some(ApplyReport {
            inserted: 3,
            already_present: 1,
            ..ApplyReport::default()
        });

        let lines = summary.display_lines();
        assert_eq!(lines.last().unwrap(), "Store: 3 inserted, 1 already present, 0 skipped");
    }

    #[test]
    fn test_future_puzzle_detection() {
        let mut summary = summary();
        assert!(!summary.has_future_puzzles());

        summary.current_puzzle = Some(202);
        assert!(summary.has_future_puzzles());

        summary.range = None;
        assert!(!summary.has_future_puzzles());
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(summary()).unwrap();
        assert_eq!(json["unresolved_senders"]["Stranger"], 2);
        assert_eq!(json["range"]["last"], 203);
        assert_eq!(json["first_puzzles"]["rob"], 200);
        assert!(json.get("apply").is_none());
    }

    #[test]
    fn test_write_json_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("summary.json");

        let err = summary().write_json(&path).unwrap_err();
        assert!(matches!(err, crate::error::ImportError::WriteOutput { .. }));
    }

    #[test]
    fn test_write_json_round_trips_counters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");

        summary().write_json(&path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["operations"], 4);
        assert_eq!(json["malformed_results"], 1);
    }
}
