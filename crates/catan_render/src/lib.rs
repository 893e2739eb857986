use std::fmt::Write as _;

use catan_core::aggregate::{OrderMatrix, PlayerStats, SeriesPoint};
use catan_core::consistency::{MissingStats, ScoreMismatch};
use catan_core::core_api::{Session, StatsView, Summary};
use catan_core::extra_points::ExtraPointKind;
use catan_core::model::Place;
use catan_core::profile::{DetailAverages, PlayerProfile};
use serde_json::{Map as JsonMap, Value as JsonValue};

const PAGE_WIDTH: usize = 72;
const NAME_COL_WIDTH: usize = 16;
const GAME_COL_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// Adds per-player detail profiles to the report.
    pub verbose: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportSections {
    pub summary: bool,
    pub filter: bool,
    pub players: bool,
    pub series: bool,
    pub order_matrix: bool,
    pub missing_stats: bool,
    pub mismatches: bool,
    pub profiles: bool,
}

impl ReportSections {
    pub fn is_any_selected(&self) -> bool {
        self.summary
            || self.filter
            || self.players
            || self.series
            || self.order_matrix
            || self.missing_stats
            || self.mismatches
            || self.profiles
    }
}

/// Everything a report is rendered from. `summary` is optional since it
/// depends on a caller-supplied "today".
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub session: &'a Session,
    pub view: &'a StatsView<'a>,
    pub summary: Option<&'a Summary>,
}

pub fn render_json_full(report: &Report<'_>, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(report)),
    }
}

pub fn render_json_selected(
    report: &Report<'_>,
    sections: &ReportSections,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(selected_json(sections, report)),
    }
}

pub fn render_text(report: &Report<'_>, style: TextStyle) -> String {
    render_text_with_options(report, style, TextRenderOptions::default())
}

pub fn render_text_with_options(
    report: &Report<'_>,
    style: TextStyle,
    options: TextRenderOptions,
) -> String {
    let sections = ReportSections {
        summary: true,
        filter: true,
        players: true,
        series: false,
        order_matrix: true,
        missing_stats: true,
        mismatches: true,
        profiles: options.verbose,
    };
    match style {
        TextStyle::Report => render_report_impl(report, &sections),
    }
}

pub fn render_text_selected(report: &Report<'_>, sections: &ReportSections) -> String {
    render_report_impl(report, sections)
}

fn default_json(report: &Report<'_>) -> JsonMap<String, JsonValue> {
    let sections = ReportSections {
        summary: report.summary.is_some(),
        filter: true,
        players: true,
        series: true,
        order_matrix: true,
        missing_stats: true,
        mismatches: true,
        profiles: true,
    };
    selected_json(&sections, report)
}

fn selected_json(sections: &ReportSections, report: &Report<'_>) -> JsonMap<String, JsonValue> {
    let view = report.view;
    let mut out = JsonMap::new();

    if sections.summary {
        out.insert(
            "summary".to_string(),
            match report.summary {
                Some(summary) => summary_to_json(summary),
                None => JsonValue::Null,
            },
        );
    }
    if sections.filter {
        out.insert("filter".to_string(), filter_to_json(view));
        out.insert(
            "games_shown".to_string(),
            JsonValue::from(view.games().len()),
        );
        out.insert(
            "games_total".to_string(),
            JsonValue::from(report.session.games().len()),
        );
    }
    if sections.players {
        out.insert(
            "players".to_string(),
            JsonValue::Array(view.players().iter().map(player_to_json).collect()),
        );
    }
    if sections.series {
        out.insert("series".to_string(), series_to_json(view));
    }
    if sections.order_matrix {
        out.insert(
            "order_matrix".to_string(),
            order_matrix_to_json(&view.order_matrix()),
        );
    }
    if sections.missing_stats {
        let mut m = JsonMap::new();
        m.insert(
            "all".to_string(),
            missing_stats_to_json(&view.missing_stats()),
        );
        m.insert(
            "shown".to_string(),
            missing_stats_to_json(&view.shown_missing_stats()),
        );
        out.insert("missing_stats".to_string(), JsonValue::Object(m));
    }
    if sections.mismatches {
        out.insert(
            "score_mismatches".to_string(),
            mismatches_to_json(report.session.score_mismatches()),
        );
    }
    if sections.profiles {
        out.insert(
            "profiles".to_string(),
            JsonValue::Array(
                view.players()
                    .names()
                    .filter_map(|name| view.profile(name))
                    .map(|profile| profile_to_json(&profile))
                    .collect(),
            ),
        );
    }

    out
}

fn summary_to_json(summary: &Summary) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert(
        "total_games".to_string(),
        JsonValue::from(summary.total_games),
    );
    m.insert(
        "total_players".to_string(),
        JsonValue::from(summary.total_players()),
    );
    m.insert("players".to_string(), names_to_json(&summary.players));
    m.insert(
        "first_date".to_string(),
        optional_string(summary.first_date.map(|d| d.to_string())),
    );
    m.insert(
        "last_date".to_string(),
        optional_string(summary.last_date.map(|d| d.to_string())),
    );
    m.insert(
        "days_since_last".to_string(),
        match summary.days_since_last {
            Some(days) => JsonValue::from(days),
            None => JsonValue::Null,
        },
    );
    m.insert(
        "recency".to_string(),
        optional_string(summary.recency.map(|r| r.as_str().to_string())),
    );
    JsonValue::Object(m)
}

fn filter_to_json(view: &StatsView<'_>) -> JsonValue {
    let filter = view.filter();
    let mut m = JsonMap::new();
    m.insert(
        "from".to_string(),
        optional_string(filter.date_range.start.map(|d| d.to_string())),
    );
    m.insert(
        "to".to_string(),
        optional_string(filter.date_range.end.map(|d| d.to_string())),
    );
    m.insert(
        "players".to_string(),
        JsonValue::Array(
            filter
                .whitelist
                .names()
                .map(|n| JsonValue::String(n.to_string()))
                .collect(),
        ),
    );
    m.insert(
        "auto_selected".to_string(),
        JsonValue::Bool(view.auto_selected()),
    );
    m.insert(
        "require_order".to_string(),
        JsonValue::Bool(filter.required.order),
    );
    m.insert(
        "require_point_details".to_string(),
        JsonValue::Bool(filter.required.point_details),
    );
    JsonValue::Object(m)
}

fn player_to_json(stats: &PlayerStats<'_>) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("name".to_string(), JsonValue::String(stats.name.clone()));
    m.insert("games".to_string(), JsonValue::from(stats.total_games));
    m.insert("score".to_string(), JsonValue::from(stats.total_score));
    m.insert("wins".to_string(), JsonValue::from(stats.total_wins));
    m.insert("win_rate".to_string(), JsonValue::from(stats.win_rate()));
    m.insert(
        "average_score".to_string(),
        JsonValue::from(stats.average_score()),
    );

    let mut places = JsonMap::new();
    let mut shares = JsonMap::new();
    for place in Place::ALL {
        places.insert(
            place.as_str().to_string(),
            JsonValue::from(stats.places.get(place)),
        );
        shares.insert(
            place.as_str().to_string(),
            JsonValue::from(stats.place_share(place)),
        );
    }
    m.insert("places".to_string(), JsonValue::Object(places));
    m.insert("place_shares".to_string(), JsonValue::Object(shares));
    JsonValue::Object(m)
}

fn series_to_json(view: &StatsView<'_>) -> JsonValue {
    let mut out = JsonMap::new();
    for name in view.players().names() {
        let mut m = JsonMap::new();
        m.insert(
            "win_rate".to_string(),
            series_points_to_json(&view.win_rate_series(name)),
        );
        m.insert(
            "average_score".to_string(),
            series_points_to_json(&view.average_score_series(name)),
        );
        out.insert(name.to_string(), JsonValue::Object(m));
    }
    JsonValue::Object(out)
}

fn series_points_to_json(points: &[SeriesPoint]) -> JsonValue {
    JsonValue::Array(
        points
            .iter()
            .map(|p| {
                let mut m = JsonMap::new();
                m.insert("game".to_string(), JsonValue::String(p.game_no.clone()));
                m.insert("value".to_string(), JsonValue::from(p.value));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn order_matrix_to_json(matrix: &OrderMatrix) -> JsonValue {
    JsonValue::Array(
        matrix
            .rows()
            .map(|(start, shares)| {
                let mut m = JsonMap::new();
                m.insert(
                    "start".to_string(),
                    JsonValue::String(start.as_str().to_string()),
                );
                m.insert("games".to_string(), JsonValue::from(matrix.row_total(start)));
                let mut finish = JsonMap::new();
                for (place, share) in Place::ALL.iter().zip(shares) {
                    finish.insert(place.as_str().to_string(), JsonValue::from(share));
                }
                m.insert("finish".to_string(), JsonValue::Object(finish));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn missing_stats_to_json(entries: &[MissingStats]) -> JsonValue {
    JsonValue::Array(
        entries
            .iter()
            .map(|entry| {
                let mut m = JsonMap::new();
                m.insert("game".to_string(), JsonValue::String(entry.game_no.clone()));
                m.insert(
                    "missing".to_string(),
                    JsonValue::Array(
                        entry
                            .missing
                            .iter()
                            .map(|c| JsonValue::String(c.as_str().to_string()))
                            .collect(),
                    ),
                );
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn mismatches_to_json(mismatches: &[ScoreMismatch]) -> JsonValue {
    JsonValue::Array(
        mismatches
            .iter()
            .map(|mismatch| {
                let mut m = JsonMap::new();
                m.insert(
                    "game".to_string(),
                    JsonValue::String(mismatch.game_no.clone()),
                );
                m.insert(
                    "player".to_string(),
                    JsonValue::String(mismatch.player.clone()),
                );
                m.insert(
                    "recorded".to_string(),
                    JsonValue::from(mismatch.recorded_score),
                );
                m.insert(
                    "expected".to_string(),
                    JsonValue::from(mismatch.expected_score),
                );
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn profile_to_json(profile: &PlayerProfile) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("name".to_string(), JsonValue::String(profile.name.clone()));
    m.insert(
        "averages".to_string(),
        optional_averages(profile.averages.as_ref()),
    );
    m.insert(
        "win_averages".to_string(),
        optional_averages(profile.win_averages.as_ref()),
    );
    m.insert(
        "start_order".to_string(),
        JsonValue::Array(
            profile
                .start_order_counts
                .iter()
                .map(|&c| JsonValue::from(c))
                .collect(),
        ),
    );
    JsonValue::Object(m)
}

fn optional_averages(averages: Option<&DetailAverages>) -> JsonValue {
    let Some(avg) = averages else {
        return JsonValue::Null;
    };
    let mut m = JsonMap::new();
    m.insert("games".to_string(), JsonValue::from(avg.games));
    m.insert("trade".to_string(), JsonValue::from(avg.trade));
    m.insert("politics".to_string(), JsonValue::from(avg.politics));
    m.insert("science".to_string(), JsonValue::from(avg.science));
    m.insert("cities".to_string(), JsonValue::from(avg.cities));
    m.insert("settlements".to_string(), JsonValue::from(avg.settlements));
    let mut extra = JsonMap::new();
    for kind in ExtraPointKind::ALL {
        extra.insert(
            kind.as_str().to_string(),
            JsonValue::from(avg.extra.get(&kind).copied().unwrap_or(0.0)),
        );
    }
    m.insert("extra".to_string(), JsonValue::Object(extra));
    JsonValue::Object(m)
}

fn names_to_json(names: &[String]) -> JsonValue {
    JsonValue::Array(names.iter().map(|n| JsonValue::String(n.clone())).collect())
}

fn optional_string(value: Option<String>) -> JsonValue {
    match value {
        Some(v) => JsonValue::String(v),
        None => JsonValue::Null,
    }
}

fn render_report_impl(report: &Report<'_>, sections: &ReportSections) -> String {
    let view = report.view;
    let mut out = String::new();

    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "{}",
        centered_no_trailing("CATAN SESSION STATS", PAGE_WIDTH)
    )
    .expect("writing to String cannot fail");

    if sections.summary
        && let Some(summary) = report.summary
    {
        write_summary(&mut out, summary);
    }
    writeln!(&mut out).expect("writing to String cannot fail");

    if sections.filter {
        write_filter(&mut out, report);
        writeln!(&mut out).expect("writing to String cannot fail");
    }
    if sections.players {
        write_player_table(&mut out, view);
        writeln!(&mut out).expect("writing to String cannot fail");
    }
    if sections.series {
        write_series(&mut out, view);
        writeln!(&mut out).expect("writing to String cannot fail");
    }
    if sections.order_matrix {
        write_order_matrix(&mut out, &view.order_matrix());
        writeln!(&mut out).expect("writing to String cannot fail");
    }
    if sections.missing_stats {
        write_missing_stats(&mut out, view);
        writeln!(&mut out).expect("writing to String cannot fail");
    }
    if sections.mismatches {
        write_mismatches(&mut out, report.session.score_mismatches());
        writeln!(&mut out).expect("writing to String cannot fail");
    }
    if sections.profiles {
        write_profiles(&mut out, view);
        writeln!(&mut out).expect("writing to String cannot fail");
    }

    out
}

fn write_summary(out: &mut String, summary: &Summary) {
    let span = match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => format!(", {first} to {last}"),
        _ => String::new(),
    };
    let headline = format!(
        "{} games, {} players{}",
        summary.total_games,
        summary.total_players(),
        span
    );
    writeln!(out, "{}", centered_no_trailing(&headline, PAGE_WIDTH))
        .expect("writing to String cannot fail");

    if let (Some(days), Some(recency)) = (summary.days_since_last, summary.recency) {
        let line = format!("last game {} ago ({})", plural(days, "day"), recency.as_str());
        writeln!(out, "{}", centered_no_trailing(&line, PAGE_WIDTH))
            .expect("writing to String cannot fail");
    }
}

fn write_filter(out: &mut String, report: &Report<'_>) {
    let view = report.view;
    let filter = view.filter();

    let dates = match (filter.date_range.start, filter.date_range.end) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        _ => "all".to_string(),
    };
    writeln!(out, "  Dates: {dates}").expect("writing to String cannot fail");

    let players = if filter.whitelist.is_empty() {
        "all".to_string()
    } else {
        let names: Vec<&str> = filter.whitelist.names().collect();
        let suffix = if view.auto_selected() { " (auto)" } else { "" };
        format!("{}{suffix}", names.join(", "))
    };
    writeln!(out, "  Players: {players}").expect("writing to String cannot fail");

    let mut required = Vec::new();
    if filter.required.order {
        required.push("start order");
    }
    if filter.required.point_details {
        required.push("point details");
    }
    if !required.is_empty() {
        writeln!(out, "  Requires: {}", required.join(", "))
            .expect("writing to String cannot fail");
    }

    writeln!(
        out,
        "  Showing {} of {} games",
        view.games().len(),
        report.session.games().len()
    )
    .expect("writing to String cannot fail");
}

fn write_player_table(out: &mut String, view: &StatsView<'_>) {
    writeln!(out, " ::: Players :::").expect("writing to String cannot fail");
    if view.players().is_empty() {
        writeln!(out, "  none").expect("writing to String cannot fail");
        return;
    }

    writeln!(
        out,
        "  {:<w$}{:>6}{:>6}{:>8}{:>7}{:>5}{:>5}{:>5}{:>5}",
        "Player",
        "Games",
        "Wins",
        "Win %",
        "Avg",
        "1st",
        "2nd",
        "3rd",
        "4th",
        w = NAME_COL_WIDTH
    )
    .expect("writing to String cannot fail");

    for stats in view.players().iter() {
        writeln!(
            out,
            "  {:<w$}{:>6}{:>6}{:>8}{:>7}{:>5}{:>5}{:>5}{:>5}",
            fit_column(&stats.name, NAME_COL_WIDTH),
            stats.total_games,
            stats.total_wins,
            format_percent(stats.win_rate()),
            format!("{:.1}", stats.average_score()),
            stats.places.first,
            stats.places.second,
            stats.places.third,
            stats.places.fourth,
            w = NAME_COL_WIDTH
        )
        .expect("writing to String cannot fail");
    }
}

fn write_series(out: &mut String, view: &StatsView<'_>) {
    writeln!(out, " ::: Trends :::").expect("writing to String cannot fail");
    for name in view.players().names() {
        let wins = view.win_rate_series(name);
        let scores = view.average_score_series(name);
        let (Some(last_win), Some(last_score)) = (wins.last(), scores.last()) else {
            continue;
        };
        writeln!(
            out,
            "  {:<w$}win rate {:>7} after game {:<6} avg score {:.1}",
            fit_column(name, NAME_COL_WIDTH),
            format_percent(last_win.value),
            last_win.game_no,
            last_score.value,
            w = NAME_COL_WIDTH
        )
        .expect("writing to String cannot fail");
    }
}

fn write_order_matrix(out: &mut String, matrix: &OrderMatrix) {
    writeln!(out, " ::: Start Order :::").expect("writing to String cannot fail");
    if matrix.is_empty() {
        writeln!(out, "  no games with start order").expect("writing to String cannot fail");
        return;
    }

    writeln!(
        out,
        "  {:<10}{:>8}{:>8}{:>8}{:>8}{:>7}",
        "Start", "1st", "2nd", "3rd", "4th", "Games"
    )
    .expect("writing to String cannot fail");
    for (start, shares) in matrix.rows() {
        let cells: String = shares
            .iter()
            .map(|&share| format!("{:>8}", format_percent(share)))
            .collect();
        writeln!(
            out,
            "  {:<10}{cells}{:>7}",
            start.as_str(),
            matrix.row_total(start)
        )
        .expect("writing to String cannot fail");
    }
}

fn write_missing_stats(out: &mut String, view: &StatsView<'_>) {
    writeln!(out, " ::: Missing Stats :::").expect("writing to String cannot fail");
    let all = view.missing_stats();
    if all.is_empty() {
        writeln!(out, "  none").expect("writing to String cannot fail");
        return;
    }

    let shown = view.shown_missing_stats();
    for entry in &all {
        let categories: Vec<&str> = entry.missing.iter().map(|c| c.as_str()).collect();
        let hidden = if shown.iter().any(|s| s.game_no == entry.game_no) {
            ""
        } else {
            " (filtered out)"
        };
        let line = format!(
            "  Game {:<w$}{}{hidden}",
            entry.game_no,
            categories.join(", "),
            w = GAME_COL_WIDTH
        );
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
}

fn write_mismatches(out: &mut String, mismatches: &[ScoreMismatch]) {
    writeln!(out, " ::: Score Mismatches :::").expect("writing to String cannot fail");
    if mismatches.is_empty() {
        writeln!(out, "  none").expect("writing to String cannot fail");
        return;
    }
    for m in mismatches {
        writeln!(
            out,
            "  Game {:<w$}{} recorded {}, details add up to {}",
            m.game_no,
            m.player,
            m.recorded_score,
            m.expected_score,
            w = GAME_COL_WIDTH
        )
        .expect("writing to String cannot fail");
    }
}

fn write_profiles(out: &mut String, view: &StatsView<'_>) {
    writeln!(out, " ::: Profiles :::").expect("writing to String cannot fail");
    for name in view.players().names() {
        let Some(profile) = view.profile(name) else {
            continue;
        };
        let Some(avg) = &profile.averages else {
            writeln!(out, "  {name}: no detailed games").expect("writing to String cannot fail");
            continue;
        };

        writeln!(out, "  {name} ({})", plural(avg.games as i64, "detailed game"))
            .expect("writing to String cannot fail");
        writeln!(
            out,
            "    Development  trade {:.1}  politics {:.1}  science {:.1}",
            avg.trade, avg.politics, avg.science
        )
        .expect("writing to String cannot fail");
        writeln!(
            out,
            "    Buildings    cities {:.1}  settlements {:.1}",
            avg.cities, avg.settlements
        )
        .expect("writing to String cannot fail");

        let extras: Vec<String> = avg
            .extra
            .iter()
            .filter(|(_, value)| **value > 0.0)
            .map(|(kind, value)| format!("{} {value:.2}", kind.as_str()))
            .collect();
        let extras = if extras.is_empty() {
            "none".to_string()
        } else {
            extras.join("  ")
        };
        writeln!(out, "    Extras       {extras}").expect("writing to String cannot fail");

        let starts: Vec<String> = Place::ALL
            .iter()
            .zip(profile.start_order_counts)
            .map(|(place, count)| format!("{} {count}", place.as_str()))
            .collect();
        writeln!(out, "    Started      {}", starts.join("  "))
            .expect("writing to String cannot fail");

        if let Some(wins) = &profile.win_averages {
            writeln!(
                out,
                "    In wins      cities {:.1}  settlements {:.1} over {}",
                wins.cities,
                wins.settlements,
                plural(wins.games as i64, "game")
            )
            .expect("writing to String cannot fail");
        }
    }
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 3) {
        out.push(ch);
    }
    out.push_str("...");
    out
}

fn centered_no_trailing(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let left_padding = (width - len) / 2;
    format!("{}{}", " ".repeat(left_padding), value)
}

fn format_percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

fn plural(count: i64, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
