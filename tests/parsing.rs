use std::fs;
use std::path::PathBuf;

use betsmarter_terminal::records::{Outcome, odds_label, parse_records_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_matches_page_fixture() {
    let raw = read_fixture("matches_page.json");
    let rows = parse_records_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[0].team1.as_deref(), Some("Arsenal"));
    assert_eq!(rows[0].result, Some(Outcome::Home));
    assert_eq!(rows[0].score_label(), "2 - 0");
    assert_eq!(rows[0].kickoff_label(), "2024-08-17 15:00");
}

#[test]
fn comma_decimal_odds_are_read() {
    let raw = read_fixture("matches_page.json");
    let rows = parse_records_json(&raw).expect("fixture should parse");
    let everton = rows.iter().find(|r| r.id == 3).expect("row 3");
    assert_eq!(everton.odd1, Some(2.6));
    assert_eq!(odds_label(everton.oddx), "3.30");
    assert_eq!(everton.result, Some(Outcome::Draw));
}

#[test]
fn unplayed_match_has_blank_result() {
    let raw = read_fixture("matches_page.json");
    let rows = parse_records_json(&raw).expect("fixture should parse");
    let unplayed = rows.iter().find(|r| r.id == 10).expect("row 10");
    assert_eq!(unplayed.result, None);
    assert_eq!(unplayed.total_goals(), None);
    assert_eq!(unplayed.result_label(), "-");
    assert_eq!(unplayed.score_label(), "-");
}

#[test]
fn empty_and_null_bodies_are_empty_pages() {
    assert!(parse_records_json("").unwrap().is_empty());
    assert!(parse_records_json("null").unwrap().is_empty());
    assert!(parse_records_json("[]").unwrap().is_empty());
    assert!(parse_records_json("{\"message\":\"bad\"}").is_err());
}
