use std::fs;
use std::path::PathBuf;

use catan_core::aggregate::ParticipationThreshold;
use catan_core::core_api::{CoreErrorCode, Engine, EngineConfig, Recency};
use catan_core::decode::ExtraPointsAccumulation;
use catan_core::extra_points::ExtraPointKind;
use catan_core::filter::{DateRange, GameFilter, RequiredStats, Whitelist};
use catan_core::model::Place;
use chrono::NaiveDate;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_bytes(name: &str) -> Vec<u8> {
    let path = workspace_root().join("tests/fixtures").join(name);
    fs::read(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {}", path, e))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn game_numbers(view_games: &[&catan_core::model::Game]) -> Vec<String> {
    view_games.iter().map(|g| g.game_no.clone()).collect()
}

#[test]
fn empty_filter_auto_selects_regular_players() {
    let session = Engine::new()
        .open_bytes(fixture_bytes("sessions.csv"))
        .expect("fixture should parse");
    let view = session.view(&GameFilter::default());

    assert!(view.auto_selected());
    let selected: Vec<&str> = view.filter().whitelist.names().collect();
    assert_eq!(selected, vec!["Ann", "Bob", "Cid"]);
    assert_eq!(game_numbers(view.games()), vec!["1", "4", "5", "6", "7"]);

    let ann = view.players().get("Ann").expect("Ann should be shown");
    assert_eq!(ann.total_games, 5);
    assert_eq!(ann.total_wins, 3);
}

#[test]
fn fractional_threshold_admits_occasional_players() {
    let config = EngineConfig {
        participation: ParticipationThreshold::FractionOfGames(0.2),
        ..EngineConfig::default()
    };
    let session = Engine::with_config(config)
        .expect("config should be valid")
        .open_bytes(fixture_bytes("sessions.csv"))
        .expect("fixture should parse");
    let view = session.view(&GameFilter::default());

    let selected: Vec<&str> = view.filter().whitelist.names().collect();
    assert_eq!(selected, vec!["Ann", "Bob", "Cid", "Dee"]);
    assert_eq!(
        game_numbers(view.games()),
        vec!["1", "2", "4", "5", "6", "7", "8"]
    );
}

#[test]
fn explicit_whitelist_is_not_replaced() {
    let session = Engine::new()
        .open_bytes(fixture_bytes("sessions.csv"))
        .expect("fixture should parse");
    let filter = GameFilter {
        whitelist: Whitelist::new(["Ann", "Cid", "Dee"]),
        ..GameFilter::default()
    };
    let view = session.view(&filter);
    assert!(!view.auto_selected());
    assert_eq!(game_numbers(view.games()), vec!["8"]);
}

#[test]
fn date_range_and_completeness_compose() {
    let session = Engine::new()
        .open_bytes(fixture_bytes("sessions.csv"))
        .expect("fixture should parse");
    let filter = GameFilter {
        date_range: DateRange::new(date(2022, 2, 1), date(2022, 3, 31)),
        whitelist: Whitelist::new(["Ann", "Bob", "Cid"]),
        required: RequiredStats::default(),
    };
    let view = session.view(&filter);
    assert_eq!(game_numbers(view.games()), vec!["4", "5", "6"]);

    let missing = view.missing_stats();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].game_no, "4");

    let strict = GameFilter {
        required: RequiredStats {
            order: true,
            point_details: false,
        },
        ..filter
    };
    let view = session.view(&strict);
    assert_eq!(game_numbers(view.games()), vec!["5", "6"]);
    assert_eq!(view.missing_stats().len(), 1);
    assert!(view.shown_missing_stats().is_empty());
}

#[test]
fn view_series_and_order_matrix() {
    let session = Engine::new()
        .open_bytes(fixture_bytes("sessions.csv"))
        .expect("fixture should parse");
    let view = session.view(&GameFilter::default());

    let wins: Vec<f64> = view.win_rate_series("Ann").iter().map(|p| p.value).collect();
    assert_eq!(wins, vec![1.0, 1.0, 2.0 / 3.0, 3.0 / 4.0, 3.0 / 5.0]);

    let scores: Vec<f64> = view
        .average_score_series("Bob")
        .iter()
        .map(|p| p.value)
        .collect();
    assert_eq!(scores.len(), 5);
    assert_eq!(scores[0], 9.0);
    assert!(view.win_rate_series("Eve").is_empty());

    let matrix = view.order_matrix();
    assert_eq!(matrix.row_total(Place::First), 3);
    assert_eq!(matrix.count(Place::First, Place::Second), 2);
    assert_eq!(matrix.count(Place::Second, Place::Third), 2);
    assert_eq!(matrix.count(Place::Third, Place::First), 1);
    assert_eq!(matrix.row_total(Place::Fourth), 0);
}

#[test]
fn profile_averages_detailed_games() {
    let session = Engine::new()
        .open_bytes(fixture_bytes("sessions.csv"))
        .expect("fixture should parse");
    let view = session.view(&GameFilter::default());

    let profile = view.profile("Ann").expect("Ann has a profile");
    let averages = profile.averages.expect("Ann has detailed games");
    assert_eq!(averages.games, 4);
    assert!((averages.extra[&ExtraPointKind::Roads] - 0.75).abs() < 1e-9);
    assert_eq!(profile.start_order_counts, [1, 1, 1, 0]);
    assert_eq!(profile.win_averages.map(|w| w.games), Some(2));
    assert!(view.profile("Nobody").is_none());
}

#[test]
fn summary_and_available_players() {
    let session = Engine::new()
        .open_bytes(fixture_bytes("sessions.csv"))
        .expect("fixture should parse");

    let summary = session.summary(date(2022, 4, 30));
    assert_eq!(summary.total_games, 8);
    assert_eq!(summary.total_players(), 5);
    assert_eq!(summary.first_date, Some(date(2022, 1, 8)));
    assert_eq!(summary.days_since_last, Some(14));
    assert_eq!(summary.recency, Some(Recency::Recent));

    let range = DateRange::new(date(2022, 2, 1), date(2022, 3, 31));
    assert_eq!(
        session.available_players(&range),
        vec!["Cid", "Ann", "Bob", "Eve"]
    );
}

#[test]
fn ordering_violation_aborts_the_parse() {
    let err = Engine::new()
        .open_bytes(fixture_bytes("score_before_player.csv"))
        .expect_err("score before roster must fail");
    assert_eq!(err.code, CoreErrorCode::OrderingViolation);
    assert!(err.message.contains("line 3"));
}

#[test]
fn unknown_extra_point_token_aborts_the_parse() {
    let input = "h\nh\n1,2022-01-01,Player,Ann,Bob,,\n,,Extra points,\"roads, castle\",,,\n";
    let err = Engine::new()
        .open_bytes(input)
        .expect_err("unknown token must fail");
    assert_eq!(err.code, CoreErrorCode::UnrecognizedField);
    assert!(err.message.contains("castle"));
}

#[test]
fn legacy_accumulation_keeps_first_value() {
    let input = "h\nh\n1,2022-01-01,Player,Ann,,,\n,,Extra points,\"1d, 2d\",,,\n";
    let legacy = EngineConfig {
        extra_points: ExtraPointsAccumulation::Legacy,
        ..EngineConfig::default()
    };

    let summed = Engine::new().open_bytes(input).expect("input should parse");
    let kept = Engine::with_config(legacy)
        .expect("config should be valid")
        .open_bytes(input)
        .expect("input should parse");

    let extra = |session: &catan_core::core_api::Session| {
        session.games()[0].players[0]
            .extra_points
            .clone()
            .expect("extra points recorded")
    };
    assert_eq!(extra(&summed).item(ExtraPointKind::Defender), 3);
    assert_eq!(extra(&kept).item(ExtraPointKind::Defender), 1);
    assert_eq!(extra(&kept).total, 3);
}

#[test]
fn oversized_numeric_cells_degrade_instead_of_panicking() {
    let input = "h\nh\n1,2023-01-01,Player,Ann,Bob,,\n,,Score,10,8,,\n,,Base,3000000000c,2c,,\n,,Extra points,\"2147483647d, roads\",,,\n";
    let session = Engine::new().open_bytes(input).expect("input should parse");

    let ann = &session.games()[0].players[0];
    assert_eq!(ann.base.expect("base recorded").points(), i32::MAX);
    assert_eq!(
        ann.extra_points.as_ref().expect("extra points recorded").total,
        i32::MAX
    );
    let mismatches = session.score_mismatches();
    assert_eq!(mismatches.len(), 2);
    assert_eq!(mismatches[0].player, "Ann");
    assert_eq!(mismatches[0].expected_score, i32::MAX);
    assert_eq!(mismatches[1].player, "Bob");
    assert_eq!(mismatches[1].expected_score, 4);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Engine::new()
        .open_path(&workspace_root().join("tests/fixtures/does_not_exist.csv"))
        .expect_err("missing file must fail");
    assert_eq!(err.code, CoreErrorCode::Io);
}
