//! Statistics folded out of a filtered game sequence.
//!
//! Everything here is recomputed from scratch for each filter; nothing is
//! updated incrementally.

use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::model::{Game, Place};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Places {
    pub first: u32,
    pub second: u32,
    pub third: u32,
    pub fourth: u32,
}

impl Places {
    pub fn get(&self, place: Place) -> u32 {
        match place {
            Place::First => self.first,
            Place::Second => self.second,
            Place::Third => self.third,
            Place::Fourth => self.fourth,
        }
    }

    fn with(mut self, place: Place) -> Self {
        match place {
            Place::First => self.first += 1,
            Place::Second => self.second += 1,
            Place::Third => self.third += 1,
            Place::Fourth => self.fourth += 1,
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats<'a> {
    pub name: String,
    pub total_games: u32,
    pub total_score: i64,
    pub total_wins: u32,
    pub places: Places,
    pub games: Vec<&'a Game>,
}

impl<'a> PlayerStats<'a> {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total_games: 0,
            total_score: 0,
            total_wins: 0,
            places: Places::default(),
            games: Vec::new(),
        }
    }

    fn record(&mut self, game: &'a Game, index: usize, score: i32) {
        self.total_games += 1;
        self.total_score += i64::from(score);
        if index == 0 {
            self.total_wins += 1;
        }
        if let Some(place) = Place::from_index(index) {
            self.places = self.places.with(place);
        }
        self.games.push(game);
    }

    pub fn win_rate(&self) -> f64 {
        ratio(f64::from(self.total_wins), self.total_games)
    }

    pub fn average_score(&self) -> f64 {
        ratio(self.total_score as f64, self.total_games)
    }

    pub fn place_share(&self, place: Place) -> f64 {
        ratio(f64::from(self.places.get(place)), self.total_games)
    }
}

fn ratio(value: f64, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        value / f64::from(count)
    }
}

/// Per-player stats keyed by name, iterated in first-appearance order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerTable<'a> {
    entries: Vec<PlayerStats<'a>>,
    index: HashMap<String, usize>,
}

impl<'a> PlayerTable<'a> {
    pub fn from_games<I>(games: I) -> Self
    where
        I: IntoIterator<Item = &'a Game>,
    {
        games
            .into_iter()
            .fold(Self::default(), |table, game| table.with_game(game))
    }

    fn with_game(self, game: &'a Game) -> Self {
        game.players
            .iter()
            .enumerate()
            .fold(self, |mut table, (index, player)| {
                let slot = match table.index.get(&player.name) {
                    Some(&slot) => slot,
                    None => {
                        table.entries.push(PlayerStats::empty(&player.name));
                        table
                            .index
                            .insert(player.name.clone(), table.entries.len() - 1);
                        table.entries.len() - 1
                    }
                };
                table.entries[slot].record(game, index, player.score);
                table
            })
    }

    pub fn get(&self, name: &str) -> Option<&PlayerStats<'a>> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerStats<'a>> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub game_no: String,
    pub value: f64,
}

fn running_mean<'a, I, F>(name: &str, games: I, sample: F) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = &'a Game>,
    F: Fn(&Game, usize) -> f64,
{
    games
        .into_iter()
        .filter_map(|game| game.position_of(name).map(|index| (game, index)))
        .scan(0.0, |sum, (game, index)| {
            *sum += sample(game, index);
            Some((game, *sum))
        })
        .enumerate()
        .map(|(i, (game, sum))| SeriesPoint {
            game_no: game.game_no.clone(),
            value: sum / (i + 1) as f64,
        })
        .collect()
}

/// Running share of games won, one point per game the player took part in.
pub fn win_rate_series<'a, I>(name: &str, games: I) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = &'a Game>,
{
    running_mean(name, games, |_, index| if index == 0 { 1.0 } else { 0.0 })
}

pub fn average_score_series<'a, I>(name: &str, games: I) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = &'a Game>,
{
    running_mean(name, games, |game, index| {
        f64::from(game.players[index].score)
    })
}

/// Counts of (starting position, finishing place) pairs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMatrix {
    counts: [[u32; 4]; 4],
}

impl OrderMatrix {
    /// Only games whose winner carries a starting order contribute; players
    /// with a missing or out-of-range order are skipped.
    pub fn from_games<'a, I>(games: I) -> Self
    where
        I: IntoIterator<Item = &'a Game>,
    {
        games
            .into_iter()
            .filter(|game| game.has_start_order())
            .flat_map(|game| game.players.iter().enumerate())
            .filter_map(|(index, player)| {
                let start = Place::from_position(player.order?)?;
                let finish = Place::from_index(index)?;
                Some((start, finish))
            })
            .fold(Self::default(), |mut matrix, (start, finish)| {
                matrix.counts[start.index()][finish.index()] += 1;
                matrix
            })
    }

    pub fn count(&self, start: Place, finish: Place) -> u32 {
        self.counts[start.index()][finish.index()]
    }

    pub fn row_total(&self, start: Place) -> u32 {
        self.counts[start.index()].iter().sum()
    }

    /// Finishing-place shares for one starting position; `None` for a row
    /// with no games.
    pub fn row_shares(&self, start: Place) -> Option<[f64; 4]> {
        let total = self.row_total(start);
        if total == 0 {
            return None;
        }
        Some(self.counts[start.index()].map(|c| f64::from(c) / f64::from(total)))
    }

    /// Non-empty rows in starting-position order.
    pub fn rows(&self) -> impl Iterator<Item = (Place, [f64; 4])> + '_ {
        Place::ALL
            .into_iter()
            .filter_map(|start| self.row_shares(start).map(|shares| (start, shares)))
    }

    pub fn is_empty(&self) -> bool {
        Place::ALL.iter().all(|&p| self.row_total(p) == 0)
    }
}

/// Minimum participation for a player to be shown by default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationThreshold {
    MinGames(u32),
    /// Share of the candidate games, in `(0, 1]`.
    FractionOfGames(f64),
}

impl Default for ParticipationThreshold {
    fn default() -> Self {
        Self::MinGames(5)
    }
}

impl ParticipationThreshold {
    pub fn minimum(&self, total_games: usize) -> f64 {
        match *self {
            Self::MinGames(n) => f64::from(n),
            Self::FractionOfGames(fraction) => total_games as f64 * fraction,
        }
    }

    pub fn admits(&self, player_games: u32, total_games: usize) -> bool {
        f64::from(player_games) >= self.minimum(total_games)
    }
}

/// Players meeting the participation threshold, in table order.
pub fn auto_whitelist(
    table: &PlayerTable<'_>,
    total_games: usize,
    threshold: ParticipationThreshold,
) -> Vec<String> {
    let selected: Vec<String> = table
        .iter()
        .filter(|stats| threshold.admits(stats.total_games, total_games))
        .map(|stats| stats.name.clone())
        .collect();
    info!(
        "auto-selected {} of {} players (threshold {:?} over {} games)",
        selected.len(),
        table.len(),
        threshold,
        total_games
    );
    selected
}
