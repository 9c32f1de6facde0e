//! Chat-to-score reconciliation pipeline
//!
//! # Stages
//! 1. Reconstruct messages from export lines
//! 2. Extract raw results from messages
//! 3. Resolve senders to players
//! 4. Reconcile participation windows and fill gaps
//! 5. Emit insert-if-absent operations
//!
//! Each stage runs to completion before the next starts. The whole pipeline
//! is a pure function of the export text and the configuration; only
//! [`read_chat`] and the store/script writers in `main` touch I/O.

use crate::chat::{self, RawResult};
use crate::emit::{self, UpsertOperation};
use crate::error::{ImportError, ImportResult};
use crate::identity::{AliasTable, IdentityResolver};
use crate::reconcile::{reconcile, Reconciliation};
use crate::summary::ImportSummary;
use chrono::NaiveDate;
use std::path::Path;
use tracing::{debug, warn};
use wgt_common::config::TomlConfig;
use wgt_common::puzzle::{current_puzzle, default_anchor_date};

/// Settings for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Date of puzzle #1, used to date synthesized failures
    pub anchor_date: NaiveDate,
    pub aliases: AliasTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            anchor_date: default_anchor_date(),
            aliases: AliasTable::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(config: &TomlConfig) -> Self {
        Self {
            anchor_date: config.anchor_date,
            aliases: AliasTable::new(config.aliases.clone()),
        }
    }
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub operations: Vec<UpsertOperation>,
    pub reconciliation: Reconciliation,
    pub summary: ImportSummary,
}

/// Read the chat export
pub fn read_chat(path: &Path) -> ImportResult<String> {
    std::fs::read_to_string(path).map_err(|source| ImportError::ReadChat {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a generated file (SQL script, JSON summary)
pub fn write_output(path: &Path, content: &str) -> ImportResult<()> {
    std::fs::write(path, content).map_err(|source| ImportError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })
}

/// Run every stage over an export
pub fn run(text: &str, config: &PipelineConfig) -> PipelineOutput {
    // Stage 1: messages
    let mut reconstructor = chat::messages(text);
    let messages: Vec<_> = reconstructor.by_ref().collect();
    let reconstruct = reconstructor.stats();
    debug!("Found {} messages", messages.len());

    // Stage 2: raw results
    let mut raw_results: Vec<RawResult> = Vec::new();
    let mut malformed = 0;
    for extraction in chat::extract_all(&messages) {
        match extraction {
            Ok(result) => raw_results.push(result),
            Err(e) => {
                warn!("Skipping result: {}", e);
                malformed += 1;
            }
        }
    }
    let results_parsed = raw_results.len();
    debug!("Parsed {} scores from chat", results_parsed);

    // Stage 3: identities
    let resolver = IdentityResolver::new(config.aliases.clone());
    let resolution = resolver.resolve_all(raw_results);
    debug!(
        resolved = resolution.resolved.len(),
        unresolved = resolution.unresolved.len(),
        "Resolved senders"
    );

    // Stage 4: windows and gaps
    let reconciliation = reconcile(&resolution.resolved, config.anchor_date);

    // Stage 5: operations
    let operations = emit::emit(&reconciliation);

    let summary = ImportSummary::new(
        reconstruct,
        results_parsed,
        malformed,
        &resolution,
        &reconciliation,
        current_puzzle(config.anchor_date),
    );

    PipelineOutput {
        operations,
        reconciliation,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgt_common::config::AliasEntry;
    use wgt_common::{PlayerId, Score};

    fn config() -> PipelineConfig {
        PipelineConfig {
            aliases: AliasTable::new(vec![AliasEntry {
                full_name: "Alice Smith".to_string(),
                player: PlayerId::new("alice"),
                display_name: None,
            }]),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_single_failure_with_separator() {
        let output = run("04/11/2024, 08:00 - Alice Smith: Wordle 1,234 X/6", &config());

        assert_eq!(output.operations.len(), 1);
        assert_eq!(output.operations[0].puzzle_number, 1234);
        assert_eq!(output.operations[0].score, Score::FAILED);
        assert_eq!(output.operations[0].player, PlayerId::new("alice"));
    }

    #[test]
    fn test_unknown_sender_yields_diagnostic_only() {
        let output = run("04/11/2024, 08:00 - Mallory: Wordle 1,234 4/6", &config());

        assert!(output.operations.is_empty());
        assert_eq!(output.summary.results_parsed, 1);
        assert_eq!(output.summary.resolved_results, 0);
        assert_eq!(output.summary.unresolved_senders.len(), 1);
        assert!(output.summary.unresolved_senders.contains_key("Mallory"));
    }

    #[test]
    fn test_malformed_results_are_counted() {
        let input = "\
04/11/2024, 08:00 - Alice Smith: Wordle 1,234 8/6
04/11/2024, 08:05 - Alice Smith: Wordle 1,235 2/6";
        let output = run(input, &config());

        assert_eq!(output.summary.malformed_results, 1);
        assert_eq!(output.summary.results_parsed, 1);
        assert_eq!(output.operations.len(), 1);
    }

    #[test]
    fn test_empty_export() {
        let output = run("", &config());

        assert!(output.operations.is_empty());
        assert_eq!(output.summary.messages, 0);
        assert!(output.summary.range.is_none());
    }

    #[test]
    fn test_from_toml_copies_anchor_and_aliases() {
        let toml = TomlConfig::example();
        let config = PipelineConfig::from_toml(&toml);

        assert_eq!(config.anchor_date, toml.anchor_date);
        assert_eq!(config.aliases.entries(), toml.aliases.as_slice());
    }

    #[test]
    fn test_read_missing_chat_is_an_error() {
        let err = read_chat(Path::new("/nonexistent/chat.txt")).unwrap_err();
        assert!(matches!(err, ImportError::ReadChat { .. }));
    }
}
