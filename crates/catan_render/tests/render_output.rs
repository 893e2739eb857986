use std::path::PathBuf;

use catan_core::core_api::{Engine, Session};
use catan_core::filter::GameFilter;
use catan_render::{
    JsonStyle, Report, ReportSections, TextRenderOptions, TextStyle, render_json_full,
    render_json_selected, render_text, render_text_selected, render_text_with_options,
};
use serde_json::Value;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn session_from_fixture(name: &str) -> Session {
    let path = workspace_root().join("tests/fixtures").join(name);
    let bytes = std::fs::read(path).expect("fixture should be readable");
    Engine::new()
        .open_bytes(bytes)
        .expect("fixture should parse")
}

#[test]
fn full_json_uses_canonical_top_level_order() {
    let session = session_from_fixture("two_games.csv");
    let view = session.view(&GameFilter::default());
    let report = Report {
        session: &session,
        view: &view,
        summary: None,
    };
    let value = render_json_full(&report, JsonStyle::CanonicalV1);
    let keys: Vec<&str> = value
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect();

    assert_eq!(
        keys,
        vec![
            "filter",
            "games_shown",
            "games_total",
            "players",
            "series",
            "order_matrix",
            "missing_stats",
            "score_mismatches",
            "profiles",
        ]
    );
}

#[test]
fn full_json_carries_player_stats() {
    let session = session_from_fixture("two_games.csv");
    let view = session.view(&GameFilter::default());
    let summary = session.summary(session.games()[1].date);
    let report = Report {
        session: &session,
        view: &view,
        summary: Some(&summary),
    };
    let value = render_json_full(&report, JsonStyle::CanonicalV1);

    assert_eq!(value["summary"]["total_games"], Value::from(2));
    assert_eq!(value["summary"]["recency"], Value::from("fresh"));
    assert_eq!(value["games_shown"], Value::from(2));
    assert_eq!(value["filter"]["auto_selected"], Value::Bool(false));

    let ann = &value["players"][0];
    assert_eq!(ann["name"], Value::from("Ann"));
    assert_eq!(ann["games"], Value::from(2));
    assert_eq!(ann["score"], Value::from(16));
    assert_eq!(ann["wins"], Value::from(1));
    assert_eq!(ann["win_rate"], Value::from(0.5));
    assert_eq!(ann["places"]["third"], Value::from(1));

    let bob_series = value["series"]["Bob"]["win_rate"]
        .as_array()
        .expect("series should be an array");
    assert_eq!(bob_series.len(), 2);
    assert_eq!(bob_series[0]["value"], Value::from(0.0));
    assert_eq!(bob_series[1]["value"], Value::from(0.5));

    let rows = value["order_matrix"]
        .as_array()
        .expect("order matrix should be an array");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["start"], Value::from("first"));
    assert_eq!(rows[0]["finish"]["second"], Value::from(0.5));

    assert_eq!(value["missing_stats"]["all"], Value::Array(Vec::new()));
    assert_eq!(value["score_mismatches"], Value::Array(Vec::new()));
    assert_eq!(value["profiles"][0]["averages"]["games"], Value::from(2));
}

#[test]
fn selected_json_only_includes_requested_sections() {
    let session = session_from_fixture("sessions.csv");
    let view = session.view(&GameFilter::default());
    let report = Report {
        session: &session,
        view: &view,
        summary: None,
    };
    let sections = ReportSections {
        players: true,
        mismatches: true,
        ..ReportSections::default()
    };
    let value = render_json_selected(&report, &sections, JsonStyle::CanonicalV1);
    let keys: Vec<&str> = value
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["players", "score_mismatches"]);
    assert_eq!(value["score_mismatches"][0]["player"], Value::from("Ann"));
    assert_eq!(value["score_mismatches"][0]["expected"], Value::from(12));
    assert_eq!(value["players"].as_array().map(Vec::len), Some(3));
}

#[test]
fn text_report_lists_players_and_sections() {
    let session = session_from_fixture("two_games.csv");
    let view = session.view(&GameFilter::default());
    let summary = session.summary(session.games()[1].date);
    let report = Report {
        session: &session,
        view: &view,
        summary: Some(&summary),
    };
    let text = render_text(&report, TextStyle::Report);

    assert!(text.contains("CATAN SESSION STATS"));
    assert!(text.contains("2 games, 3 players, 2023-03-04 to 2023-03-11"));
    assert!(text.contains("last game 0 days ago (fresh)"));
    assert!(text.contains("Showing 2 of 2 games"));
    assert!(text.contains(" ::: Start Order :::"));
    assert!(!text.contains(" ::: Profiles :::"));

    let ann = text
        .lines()
        .find(|line| line.starts_with("  Ann "))
        .expect("player table should have a row for Ann");
    assert!(ann.contains("50.0%"));
    assert!(ann.contains("8.0"));
}

#[test]
fn verbose_text_adds_profiles() {
    let session = session_from_fixture("two_games.csv");
    let view = session.view(&GameFilter::default());
    let report = Report {
        session: &session,
        view: &view,
        summary: None,
    };
    let text = render_text_with_options(
        &report,
        TextStyle::Report,
        TextRenderOptions { verbose: true },
    );
    assert!(text.contains(" ::: Profiles :::"));
    assert!(text.contains("Ann (2 detailed games)"));
}

#[test]
fn text_report_flags_filtered_missing_stats() {
    let session = session_from_fixture("sessions.csv");
    let filter = GameFilter {
        required: catan_core::filter::RequiredStats {
            order: true,
            point_details: false,
        },
        ..GameFilter::default()
    };
    let view = session.view(&filter);
    let report = Report {
        session: &session,
        view: &view,
        summary: None,
    };
    let sections = ReportSections {
        missing_stats: true,
        mismatches: true,
        ..ReportSections::default()
    };
    let text = render_text_selected(&report, &sections);

    assert!(text.contains("Game 1       base, development, extraPoints, order (filtered out)"));
    assert!(text.contains("Game 4       order (filtered out)"));
    assert!(text.contains("Ann recorded 11, details add up to 12"));
    assert!(!text.contains(" ::: Players :::"));
}
