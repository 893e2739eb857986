//! Stitches consecutive raw rows into games.
//!
//! A game block starts at a row carrying a game number and must open with a
//! `Player` row; every later row of the block attaches one attribute to the
//! players positionally.

use std::collections::HashSet;

use log::debug;

use crate::core_api::ParseError;
use crate::decode::{
    ExtraPointsAccumulation, parse_base, parse_date, parse_development, parse_extra_points,
    parse_score, parse_start_order,
};
use crate::model::{Game, Player};
use crate::reader::RawRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldName {
    Player,
    Score,
    Base,
    Development,
    ExtraPoints,
    StartOrder,
}

impl FieldName {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Player" => Some(Self::Player),
            "Score" => Some(Self::Score),
            "Base" => Some(Self::Base),
            "Development" => Some(Self::Development),
            "Extra points" => Some(Self::ExtraPoints),
            "Start order" => Some(Self::StartOrder),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Player => "Player",
            Self::Score => "Score",
            Self::Base => "Base",
            Self::Development => "Development",
            Self::ExtraPoints => "Extra points",
            Self::StartOrder => "Start order",
        }
    }
}

#[derive(Debug)]
struct GameDraft {
    game: Game,
    roster_seen: bool,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    InGame(GameDraft),
}

#[derive(Debug)]
pub struct Assembler {
    state: State,
    games: Vec<Game>,
    seen_game_numbers: HashSet<String>,
    accumulation: ExtraPointsAccumulation,
}

impl Assembler {
    pub fn new(accumulation: ExtraPointsAccumulation) -> Self {
        Self {
            state: State::Idle,
            games: Vec::new(),
            seen_game_numbers: HashSet::new(),
            accumulation,
        }
    }

    pub fn push(&mut self, row: &RawRow) -> Result<(), ParseError> {
        self.push_inner(row).map_err(|err| err.at_line(row.line))
    }

    fn push_inner(&mut self, row: &RawRow) -> Result<(), ParseError> {
        if row.is_blank() {
            debug!("skipping blank row at line {}", row.line);
            return Ok(());
        }

        if !row.game_no.is_empty() {
            self.start_game(row)?;
        }

        let field = FieldName::parse(&row.field)
            .ok_or_else(|| ParseError::UnrecognizedField(describe_row(row)))?;

        let State::InGame(draft) = &mut self.state else {
            return Err(ParseError::OrderingViolation {
                field: field.as_str().to_string(),
            });
        };

        match field {
            FieldName::Player => {
                draft.game.players = roster(&row.values)?;
                draft.roster_seen = true;
                Ok(())
            }
            _ if !draft.roster_seen => Err(ParseError::OrderingViolation {
                field: field.as_str().to_string(),
            }),
            FieldName::Score => {
                attach(draft, row, |p, cell| {
                    p.score = parse_score(cell);
                    Ok(())
                })
            }
            FieldName::Base => attach(draft, row, |p, cell| {
                p.base = Some(parse_base(cell));
                Ok(())
            }),
            FieldName::Development => attach(draft, row, |p, cell| {
                p.development = Some(parse_development(cell));
                Ok(())
            }),
            FieldName::ExtraPoints => {
                let accumulation = self.accumulation;
                attach(draft, row, |p, cell| {
                    p.extra_points = Some(parse_extra_points(cell, accumulation)?);
                    Ok(())
                })
            }
            FieldName::StartOrder => attach(draft, row, |p, cell| {
                p.order = parse_start_order(cell);
                Ok(())
            }),
        }
    }

    fn start_game(&mut self, row: &RawRow) -> Result<(), ParseError> {
        if !self.seen_game_numbers.insert(row.game_no.clone()) {
            return Err(ParseError::DuplicateGame(row.game_no.clone()));
        }
        let date =
            parse_date(&row.date).ok_or_else(|| ParseError::InvalidDate(row.date.clone()))?;

        let next = GameDraft {
            game: Game {
                game_no: row.game_no.clone(),
                date,
                raw_date: row.date.trim().to_string(),
                players: Vec::new(),
            },
            roster_seen: false,
        };
        if let State::InGame(done) = std::mem::replace(&mut self.state, State::InGame(next)) {
            self.games.push(done.game);
        }
        Ok(())
    }

    pub fn finish(mut self) -> Vec<Game> {
        if let State::InGame(done) = std::mem::take(&mut self.state) {
            self.games.push(done.game);
        }
        debug!("assembled {} games", self.games.len());
        self.games
    }
}

fn roster(values: &[String]) -> Result<Vec<Player>, ParseError> {
    let mut names = HashSet::new();
    values
        .iter()
        .map(|v| v.trim())
        .filter(|name| !name.is_empty())
        .map(|name| {
            if names.insert(name) {
                Ok(Player::new(name))
            } else {
                Err(ParseError::DuplicatePlayer(name.to_string()))
            }
        })
        .collect()
}

fn attach<F>(draft: &mut GameDraft, row: &RawRow, mut apply: F) -> Result<(), ParseError>
where
    F: FnMut(&mut Player, &str) -> Result<(), ParseError>,
{
    for (player, cell) in draft.game.players.iter_mut().zip(row.values.iter()) {
        apply(player, cell)?;
    }
    Ok(())
}

fn describe_row(row: &RawRow) -> String {
    let values: Vec<&str> = row.values.iter().map(String::as_str).collect();
    format!("{}:{}", row.field, values.join(", "))
}

/// Runs the assembler over a whole row sequence.
pub fn assemble(
    rows: &[RawRow],
    accumulation: ExtraPointsAccumulation,
) -> Result<Vec<Game>, ParseError> {
    let mut assembler = Assembler::new(accumulation);
    for row in rows {
        assembler.push(row)?;
    }
    Ok(assembler.finish())
}
