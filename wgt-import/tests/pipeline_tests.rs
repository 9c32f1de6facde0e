//! End-to-end tests of the import pipeline over a realistic chat export

use chrono::NaiveDate;
use std::collections::HashSet;
use wgt_common::config::AliasEntry;
use wgt_common::{PlayerId, Score};
use wgt_import::identity::AliasTable;
use wgt_import::reconcile::{Origin, PuzzleRange};
use wgt_import::{run, PipelineConfig};

const CHAT: &str = include_str!("fixtures/group_chat.txt");

fn alias(full_name: &str, player: &str) -> AliasEntry {
    AliasEntry {
        full_name: full_name.to_string(),
        player: PlayerId::new(player),
        display_name: None,
    }
}

fn config() -> PipelineConfig {
    PipelineConfig {
        aliases: AliasTable::new(vec![
            alias("Rob Beasley", "rob"),
            alias("Claire Allen", "claire"),
            alias("Pete Gibbons", "pete"),
        ]),
        ..PipelineConfig::default()
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_summary_counts() {
    let output = run(CHAT, &config());
    let summary = &output.summary;

    // Encryption notice and group events come before any sender message
    assert_eq!(summary.ignored_lines, 3);
    assert_eq!(summary.messages, 9);
    assert_eq!(summary.results_parsed, 7);
    assert_eq!(summary.malformed_results, 1);
    assert_eq!(summary.resolved_results, 6);
    assert_eq!(summary.unresolved_senders.get("Uncle Bob"), Some(&1));
    assert_eq!(summary.range, Some(PuzzleRange { first: 188, last: 191 }));
}

#[test]
fn test_participation_windows() {
    let output = run(CHAT, &config());
    let windows = &output.reconciliation.windows;

    assert_eq!(windows.get(&PlayerId::new("rob")), Some(&188));
    assert_eq!(windows.get(&PlayerId::new("claire")), Some(&189));
    assert_eq!(windows.get(&PlayerId::new("pete")), Some(&190));
    assert_eq!(windows.get(&PlayerId::new("Uncle Bob")), None);
}

#[test]
fn test_complete_history_per_player() {
    let output = run(CHAT, &config());

    let keys: Vec<_> = output
        .operations
        .iter()
        .map(|op| (op.puzzle_number, op.player.as_str()))
        .collect();

    assert_eq!(
        keys,
        vec![
            (188, "rob"),
            (189, "claire"),
            (189, "rob"),
            (190, "claire"),
            (190, "pete"),
            (190, "rob"),
            (191, "claire"),
            (191, "pete"),
            (191, "rob"),
        ]
    );

    let unique: HashSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len());
}

#[test]
fn test_observed_and_synthesized_records() {
    let output = run(CHAT, &config());
    let find = |n: u32, player: &str| {
        output
            .reconciliation
            .records
            .iter()
            .find(|r| r.puzzle_number == n && r.player.as_str() == player)
            .cloned()
            .unwrap()
    };

    // Posted failure keeps its message date
    let rob_189 = find(189, "rob");
    assert_eq!(rob_189.score, Score::FAILED);
    assert_eq!(rob_189.origin, Origin::Observed);
    assert_eq!(rob_189.date, ymd(2021, 12, 25));

    // Claire skipped 190: filled in as a failure dated from puzzle #1
    let claire_190 = find(190, "claire");
    assert_eq!(claire_190.score, Score::FAILED);
    assert_eq!(claire_190.origin, Origin::Synthesized);
    assert_eq!(claire_190.date, ymd(2021, 12, 25));

    // Lower-case share with hard-mode star still counts
    assert_eq!(find(191, "claire").score, Score::solved(6).unwrap());

    assert_eq!(output.reconciliation.observed, 6);
    assert_eq!(output.reconciliation.synthesized, 3);
}

#[test]
fn test_same_input_same_output() {
    let first = run(CHAT, &config());
    let second = run(CHAT, &config());
    assert_eq!(first.operations, second.operations);
}

#[test]
fn test_empty_alias_table_resolves_nobody() {
    let output = run(CHAT, &PipelineConfig::default());

    assert!(output.operations.is_empty());
    assert_eq!(output.summary.resolved_results, 0);
    assert_eq!(output.summary.unresolved_senders.len(), 4);
}
