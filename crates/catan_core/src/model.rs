use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extra_points::ExtraPointKind;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Base {
    pub cities: u32,
    pub settlements: u32,
}

impl Base {
    /// Victory points from buildings: two per city, one per settlement.
    /// Saturates at `i32::MAX` for counts no real game reaches.
    pub fn points(&self) -> i32 {
        let points = u64::from(self.cities) * 2 + u64::from(self.settlements);
        i32::try_from(points).unwrap_or(i32::MAX)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Development {
    pub trade: u32,
    pub politics: u32,
    pub science: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtraPoints {
    pub total: i32,
    pub items: BTreeMap<ExtraPointKind, i32>,
}

impl ExtraPoints {
    pub fn item(&self, kind: ExtraPointKind) -> i32 {
        self.items.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub score: i32,
    pub base: Option<Base>,
    pub development: Option<Development>,
    pub extra_points: Option<ExtraPoints>,
    /// Starting turn order, 1-based. Older records do not carry it.
    pub order: Option<u32>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            base: None,
            development: None,
            extra_points: None,
            order: None,
        }
    }

    pub fn has_point_details(&self) -> bool {
        self.base.is_some() && self.development.is_some() && self.extra_points.is_some()
    }
}

/// One played game. `players` is in finishing order: index 0 won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub game_no: String,
    pub date: NaiveDate,
    pub raw_date: String,
    pub players: Vec<Player>,
}

impl Game {
    pub fn winner(&self) -> Option<&Player> {
        self.players.first()
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }

    /// Whether the block recorded starting order, judged by the winner's row.
    pub fn has_start_order(&self) -> bool {
        self.winner().is_some_and(|p| p.order.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Place {
    First,
    Second,
    Third,
    Fourth,
}

impl Place {
    pub const ALL: [Self; 4] = [Self::First, Self::Second, Self::Third, Self::Fourth];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Maps a 1-based starting position onto the same ordinal names.
    pub fn from_position(position: u32) -> Option<Self> {
        let index = usize::try_from(position).ok()?.checked_sub(1)?;
        Self::from_index(index)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
            Self::Fourth => "fourth",
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
