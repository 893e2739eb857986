use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::model::{Game, Player};

/// A recorded score that disagrees with the score rebuilt from the
/// player's buildings and extra points. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreMismatch {
    pub game_no: String,
    pub player: String,
    pub recorded_score: i32,
    pub expected_score: i32,
}

/// `None` when the player has neither buildings nor extra points recorded.
pub fn expected_score(player: &Player) -> Option<i32> {
    if player.base.is_none() && player.extra_points.is_none() {
        return None;
    }
    let base = player.base.map(|b| b.points()).unwrap_or(0);
    let extra = player.extra_points.as_ref().map(|e| e.total).unwrap_or(0);
    Some(base.saturating_add(extra))
}

pub fn check_scores(games: &[Game]) -> Vec<ScoreMismatch> {
    let mismatches: Vec<ScoreMismatch> = games
        .iter()
        .flat_map(|game| {
            game.players.iter().filter_map(move |player| {
                let expected = expected_score(player)?;
                (expected != player.score).then(|| ScoreMismatch {
                    game_no: game.game_no.clone(),
                    player: player.name.clone(),
                    recorded_score: player.score,
                    expected_score: expected,
                })
            })
        })
        .collect();

    for m in &mismatches {
        warn!(
            "game {}: {} recorded {} points, details add up to {}",
            m.game_no, m.player, m.recorded_score, m.expected_score
        );
    }
    mismatches
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatCategory {
    Base,
    Development,
    ExtraPoints,
    Order,
}

impl StatCategory {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Base => "base",
            Self::Development => "development",
            Self::ExtraPoints => "extraPoints",
            Self::Order => "order",
        }
    }

    pub fn is_point_detail(&self) -> bool {
        !matches!(self, Self::Order)
    }
}

impl fmt::Display for StatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingStats {
    pub game_no: String,
    pub missing: Vec<StatCategory>,
}

/// Categories absent from a game, judged on the winner's entry since a
/// block's players are always recorded together.
pub fn missing_categories(game: &Game) -> Vec<StatCategory> {
    let Some(first) = game.winner() else {
        return vec![
            StatCategory::Base,
            StatCategory::Development,
            StatCategory::ExtraPoints,
            StatCategory::Order,
        ];
    };

    let mut missing = Vec::new();
    if first.base.is_none() {
        missing.push(StatCategory::Base);
    }
    if first.development.is_none() {
        missing.push(StatCategory::Development);
    }
    if first.extra_points.is_none() {
        missing.push(StatCategory::ExtraPoints);
    }
    if first.order.is_none() {
        missing.push(StatCategory::Order);
    }
    missing
}

/// Report entries for the games that lack at least one category.
pub fn missing_stats<'a>(games: impl IntoIterator<Item = &'a Game>) -> Vec<MissingStats> {
    games
        .into_iter()
        .filter_map(|game| {
            let missing = missing_categories(game);
            (!missing.is_empty()).then(|| MissingStats {
                game_no: game.game_no.clone(),
                missing,
            })
        })
        .collect()
}
