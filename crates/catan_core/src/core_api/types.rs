use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{CoreError, CoreErrorCode};
use crate::aggregate::ParticipationThreshold;
use crate::decode::ExtraPointsAccumulation;

const DEFAULT_HEADER_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Leading rows of the export that carry no game data.
    pub header_rows: usize,
    pub extra_points: ExtraPointsAccumulation,
    pub participation: ParticipationThreshold,
    /// Fill an empty player filter with the regular players.
    pub auto_select: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            header_rows: DEFAULT_HEADER_ROWS,
            extra_points: ExtraPointsAccumulation::default(),
            participation: ParticipationThreshold::default(),
            auto_select: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let ParticipationThreshold::FractionOfGames(fraction) = self.participation
            && !(fraction > 0.0 && fraction <= 1.0)
        {
            return Err(CoreError::new(
                CoreErrorCode::InvalidConfig,
                format!("participation fraction must be in (0, 1], got {fraction}"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recency {
    Fresh,
    Recent,
    Cooling,
    Stale,
    Dormant,
}

impl Recency {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d < 14 => Self::Fresh,
            d if d < 30 => Self::Recent,
            d if d < 60 => Self::Cooling,
            d if d < 120 => Self::Stale,
            _ => Self::Dormant,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Fresh => "fresh",
            Self::Recent => "recent",
            Self::Cooling => "cooling",
            Self::Stale => "stale",
            Self::Dormant => "dormant",
        }
    }
}

/// Headline figures over the whole, unfiltered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_games: usize,
    pub players: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub days_since_last: Option<i64>,
    pub recency: Option<Recency>,
}

impl Summary {
    pub fn total_players(&self) -> usize {
        self.players.len()
    }
}
