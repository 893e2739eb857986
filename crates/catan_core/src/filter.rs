use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::consistency::missing_categories;
use crate::model::Game;

/// Inclusive date window. Both bounds are needed; a half-open range
/// admits every game.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_open(&self) -> bool {
        self.start.is_none() || self.end.is_none()
    }

    pub fn admits(&self, game: &Game) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= game.date && game.date <= end,
            _ => true,
        }
    }
}

/// Player roster filter. A non-empty whitelist keeps a game only when every
/// participant is on it; an empty one keeps everything.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Whitelist(BTreeSet<String>);

impl Whitelist {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn admits(&self, game: &Game) -> bool {
        self.is_empty() || game.players.iter().all(|p| self.contains(&p.name))
    }
}

/// Detail categories a game must carry to be kept.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequiredStats {
    pub order: bool,
    pub point_details: bool,
}

impl RequiredStats {
    pub fn is_empty(&self) -> bool {
        !self.order && !self.point_details
    }

    pub fn admits(&self, game: &Game) -> bool {
        if self.is_empty() {
            return true;
        }
        let missing = missing_categories(game);
        let lacks_order = missing.iter().any(|c| !c.is_point_detail());
        let lacks_details = missing.iter().any(|c| c.is_point_detail());
        !(self.order && lacks_order) && !(self.point_details && lacks_details)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameFilter {
    pub date_range: DateRange,
    pub whitelist: Whitelist,
    pub required: RequiredStats,
}

impl GameFilter {
    pub fn admits(&self, game: &Game) -> bool {
        self.date_range.admits(game) && self.whitelist.admits(game) && self.required.admits(game)
    }

    /// Keeps the admitted games in their original order.
    pub fn apply<'a, I>(&self, games: I) -> Vec<&'a Game>
    where
        I: IntoIterator<Item = &'a Game>,
    {
        games.into_iter().filter(|g| self.admits(g)).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{DateRange, GameFilter, RequiredStats, Whitelist};
    use crate::model::{Base, Development, ExtraPoints, Game, Player};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 6, day).expect("valid date")
    }

    fn game(no: &str, day: u32, names: &[&str]) -> Game {
        Game {
            game_no: no.to_string(),
            date: date(day),
            raw_date: date(day).to_string(),
            players: names.iter().map(|n| Player::new(*n)).collect(),
        }
    }

    fn game_numbers(games: &[&Game]) -> Vec<String> {
        games.iter().map(|g| g.game_no.clone()).collect()
    }

    #[test]
    fn date_range_is_inclusive_and_open_when_partial() {
        let games = [
            game("1", 1, &["A"]),
            game("2", 5, &["A"]),
            game("3", 10, &["A"]),
        ];
        let range = DateRange::new(date(5), date(10));
        let kept: Vec<&Game> = games.iter().filter(|g| range.admits(g)).collect();
        assert_eq!(game_numbers(&kept), vec!["2", "3"]);

        let half = DateRange {
            start: Some(date(6)),
            end: None,
        };
        assert!(half.is_open());
        assert!(games.iter().all(|g| half.admits(g)));
    }

    #[test]
    fn whitelist_requires_every_participant() {
        let games = [
            game("1", 1, &["A", "B"]),
            game("2", 2, &["A", "C"]),
            game("3", 3, &["B"]),
        ];
        let filter = GameFilter {
            whitelist: Whitelist::new(["A", "B"]),
            ..GameFilter::default()
        };
        assert_eq!(game_numbers(&filter.apply(&games)), vec!["1", "3"]);

        let empty = GameFilter::default();
        assert_eq!(empty.apply(&games).len(), 3);
    }

    #[test]
    fn completeness_filter_checks_requested_categories() {
        let mut detailed = game("1", 1, &["A", "B"]);
        detailed.players[0].base = Some(Base::default());
        detailed.players[0].development = Some(Development::default());
        detailed.players[0].extra_points = Some(ExtraPoints::default());
        let mut ordered = game("2", 2, &["A", "B"]);
        ordered.players[0].order = Some(2);
        let games = [detailed, ordered, game("3", 3, &["A"])];

        let order_only = GameFilter {
            required: RequiredStats {
                order: true,
                point_details: false,
            },
            ..GameFilter::default()
        };
        assert_eq!(game_numbers(&order_only.apply(&games)), vec!["2"]);

        let details_only = GameFilter {
            required: RequiredStats {
                order: false,
                point_details: true,
            },
            ..GameFilter::default()
        };
        assert_eq!(game_numbers(&details_only.apply(&games)), vec!["1"]);

        let both = GameFilter {
            required: RequiredStats {
                order: true,
                point_details: true,
            },
            ..GameFilter::default()
        };
        assert!(both.apply(&games).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let games = [
            game("1", 1, &["A", "B"]),
            game("2", 4, &["A", "C"]),
            game("3", 8, &["B", "A"]),
            game("4", 12, &["A"]),
        ];
        let filter = GameFilter {
            date_range: DateRange::new(date(2), date(12)),
            whitelist: Whitelist::new(["A", "B"]),
            required: RequiredStats::default(),
        };
        let once = filter.apply(&games);
        let twice = filter.apply(once.iter().copied());
        assert_eq!(once, twice);
        assert_eq!(game_numbers(&once), vec!["3", "4"]);
    }
}
