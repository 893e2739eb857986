use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use log::debug;

use super::error::{CoreError, CoreErrorCode};
use super::types::{EngineConfig, Recency, Summary};
use crate::aggregate::{
    OrderMatrix, PlayerTable, SeriesPoint, auto_whitelist, average_score_series,
    win_rate_series,
};
use crate::assemble::assemble;
use crate::consistency::{MissingStats, ScoreMismatch, check_scores, missing_stats};
use crate::filter::{DateRange, GameFilter, RequiredStats, Whitelist};
use crate::model::Game;
use crate::profile::PlayerProfile;
use crate::reader::GridReader;

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine {
    config: EngineConfig,
}

/// A successfully parsed export. Immutable once opened.
#[derive(Debug)]
pub struct Session {
    config: EngineConfig,
    games: Vec<Game>,
    score_mismatches: Vec<ScoreMismatch>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn open_reader<R: Read>(&self, reader: R) -> Result<Session, CoreError> {
        let rows = GridReader::new(reader, self.config.header_rows).read_rows()?;
        debug!("read {} data rows", rows.len());

        let games = assemble(&rows, self.config.extra_points)?;
        let score_mismatches = check_scores(&games);
        debug!(
            "parsed {} games with {} score mismatches",
            games.len(),
            score_mismatches.len()
        );

        Ok(Session {
            config: self.config,
            games,
            score_mismatches,
        })
    }

    pub fn open_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> Result<Session, CoreError> {
        self.open_reader(bytes.as_ref())
    }

    pub fn open_path(&self, path: &Path) -> Result<Session, CoreError> {
        let file = File::open(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to open {}: {e}", path.display()),
            )
        })?;
        self.open_reader(BufReader::new(file))
    }
}

impl Session {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Games in file order, which is chronological order.
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn score_mismatches(&self) -> &[ScoreMismatch] {
        &self.score_mismatches
    }

    pub fn all_players(&self) -> Vec<String> {
        distinct_players(&self.games)
    }

    /// Players appearing in the games the date filter alone lets through.
    pub fn available_players(&self, range: &DateRange) -> Vec<String> {
        distinct_players(self.games.iter().filter(|g| range.admits(g)))
    }

    pub fn summary(&self, today: NaiveDate) -> Summary {
        let first_date = self.games.first().map(|g| g.date);
        let last_date = self.games.last().map(|g| g.date);
        let days_since_last = last_date.map(|d| (today - d).num_days());

        Summary {
            total_games: self.games.len(),
            players: self.all_players(),
            first_date,
            last_date,
            days_since_last,
            recency: days_since_last.map(Recency::from_days),
        }
    }

    pub fn view(&self, filter: &GameFilter) -> StatsView<'_> {
        let (whitelist, auto_selected) = if filter.whitelist.is_empty() && self.config.auto_select {
            let selected = self.auto_selection(&filter.date_range);
            let applied = !selected.is_empty();
            (selected, applied)
        } else {
            (filter.whitelist.clone(), false)
        };

        let roster = GameFilter {
            date_range: filter.date_range,
            whitelist,
            required: RequiredStats::default(),
        };
        let candidates = roster.apply(&self.games);
        let games: Vec<&Game> = candidates
            .iter()
            .copied()
            .filter(|g| filter.required.admits(g))
            .collect();
        let players = PlayerTable::from_games(games.iter().copied());
        debug!(
            "view keeps {} of {} games ({} before completeness filter), {} players",
            games.len(),
            self.games.len(),
            candidates.len(),
            players.len()
        );

        StatsView {
            filter: GameFilter {
                required: filter.required,
                ..roster
            },
            auto_selected,
            candidates,
            games,
            players,
        }
    }

    fn auto_selection(&self, range: &DateRange) -> Whitelist {
        let baseline: Vec<&Game> = self.games.iter().filter(|g| range.admits(g)).collect();
        let table = PlayerTable::from_games(baseline.iter().copied());
        Whitelist::new(auto_whitelist(
            &table,
            baseline.len(),
            self.config.participation,
        ))
    }
}

fn distinct_players<'a, I>(games: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Game>,
{
    let mut seen = HashSet::new();
    games
        .into_iter()
        .flat_map(|g| g.players.iter())
        .filter(|p| seen.insert(p.name.as_str()))
        .map(|p| p.name.clone())
        .collect()
}

/// Everything derived from one filter setting.
#[derive(Debug)]
pub struct StatsView<'a> {
    filter: GameFilter,
    auto_selected: bool,
    candidates: Vec<&'a Game>,
    games: Vec<&'a Game>,
    players: PlayerTable<'a>,
}

impl<'a> StatsView<'a> {
    /// The filter actually applied, with any auto-selected whitelist.
    pub fn filter(&self) -> &GameFilter {
        &self.filter
    }

    pub fn auto_selected(&self) -> bool {
        self.auto_selected
    }

    pub fn games(&self) -> &[&'a Game] {
        &self.games
    }

    pub fn players(&self) -> &PlayerTable<'a> {
        &self.players
    }

    /// Games lacking detail categories, before the completeness filter.
    pub fn missing_stats(&self) -> Vec<MissingStats> {
        missing_stats(self.candidates.iter().copied())
    }

    /// The part of [`Self::missing_stats`] still shown after the
    /// completeness filter.
    pub fn shown_missing_stats(&self) -> Vec<MissingStats> {
        missing_stats(self.games.iter().copied())
    }

    pub fn win_rate_series(&self, name: &str) -> Vec<SeriesPoint> {
        self.players
            .get(name)
            .map(|stats| win_rate_series(name, stats.games.iter().copied()))
            .unwrap_or_default()
    }

    pub fn average_score_series(&self, name: &str) -> Vec<SeriesPoint> {
        self.players
            .get(name)
            .map(|stats| average_score_series(name, stats.games.iter().copied()))
            .unwrap_or_default()
    }

    pub fn order_matrix(&self) -> OrderMatrix {
        OrderMatrix::from_games(self.games.iter().copied())
    }

    pub fn profile(&self, name: &str) -> Option<PlayerProfile> {
        self.players
            .get(name)
            .map(|stats| PlayerProfile::compute(name, stats.games.iter().copied()))
    }
}
