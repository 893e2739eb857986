//! Decoders for the compact per-column cell formats of the export.
//!
//! Numeric sub-tokens that fail to parse degrade to zero with a warning.
//! The extra-points cell is the exception: an unknown token rejects the file.

use std::sync::LazyLock;

use chrono::NaiveDate;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core_api::ParseError;
use crate::extra_points::ExtraPointKind;
use crate::model::{Base, Development, ExtraPoints};

static CITIES_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex('c'));
static SETTLEMENTS_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex('s'));
static TRADE_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex('y'));
static POLITICS_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex('b'));
static SCIENCE_RE: LazyLock<Regex> = LazyLock::new(|| marker_regex('g'));

const EXTRA_POINTS_DELIMITER: char = ',';
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];

fn marker_regex(marker: char) -> Regex {
    Regex::new(&format!(r"(\d+){marker}")).expect("valid marker regex")
}

/// How repeated tokens of one kind inside a single cell are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraPointsAccumulation {
    /// Repeated tokens add up.
    #[default]
    Sum,
    /// Reproduces historical exports: the first non-zero value recorded for
    /// a kind is kept and later occurrences only count towards the total.
    Legacy,
}

fn marker_value(re: &Regex, cell: &str, what: &str) -> u32 {
    let Some(caps) = re.captures(cell) else {
        return 0;
    };
    caps[1].parse().unwrap_or_else(|_| {
        warn!("malformed {what} count in \"{cell}\", using 0");
        0
    })
}

pub fn parse_base(cell: &str) -> Base {
    Base {
        cities: marker_value(&CITIES_RE, cell, "city"),
        settlements: marker_value(&SETTLEMENTS_RE, cell, "settlement"),
    }
}

pub fn parse_development(cell: &str) -> Development {
    Development {
        trade: marker_value(&TRADE_RE, cell, "trade"),
        politics: marker_value(&POLITICS_RE, cell, "politics"),
        science: marker_value(&SCIENCE_RE, cell, "science"),
    }
}

pub fn parse_extra_points(
    cell: &str,
    accumulation: ExtraPointsAccumulation,
) -> Result<ExtraPoints, ParseError> {
    let mut out = ExtraPoints::default();

    for token in cell.split(EXTRA_POINTS_DELIMITER).map(str::trim) {
        if token.is_empty() {
            continue;
        }

        let (kind, score) = ExtraPointKind::from_token(token)
            .ok_or_else(|| ParseError::UnrecognizedField(token.to_string()))?;

        out.total = out.total.checked_add(score).unwrap_or_else(|| {
            warn!("extra points total overflows at \"{token}\", saturating");
            out.total.saturating_add(score)
        });
        let entry = out.items.entry(kind).or_insert(0);
        *entry = match accumulation {
            ExtraPointsAccumulation::Sum => entry.saturating_add(score),
            ExtraPointsAccumulation::Legacy if *entry != 0 => *entry,
            ExtraPointsAccumulation::Legacy => score,
        };
    }

    Ok(out)
}

/// Empty cells score zero; anything else that is not an integer is
/// reported and scored zero. Fractional scores such as `10.5` count as
/// malformed, since victory points are whole numbers.
pub fn parse_score(cell: &str) -> i32 {
    let cell = cell.trim();
    if cell.is_empty() {
        return 0;
    }
    cell.parse().unwrap_or_else(|_| {
        warn!("malformed score \"{cell}\", using 0");
        0
    })
}

/// Empty or non-integer cells leave the starting order unknown.
pub fn parse_start_order(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    match cell.parse() {
        Ok(order) => Some(order),
        Err(_) => {
            warn!("malformed start order \"{cell}\", leaving it unset");
            None
        }
    }
}

pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(cell, format).ok())
}
