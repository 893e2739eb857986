use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::extra_points::ExtraPointKind;
use crate::model::{Game, Place, Player};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailAverages {
    pub games: usize,
    pub trade: f64,
    pub politics: f64,
    pub science: f64,
    pub cities: f64,
    pub settlements: f64,
    /// Fixed-value kinds read as the share of games holding the bonus;
    /// defender is the average defender points.
    pub extra: BTreeMap<ExtraPointKind, f64>,
}

#[derive(Debug, Default, Clone, Copy)]
struct DetailTotals {
    games: usize,
    trade: u64,
    politics: u64,
    science: u64,
    cities: u64,
    settlements: u64,
    extra: [f64; 8],
}

impl DetailTotals {
    fn add(mut self, player: &Player) -> Self {
        self.games += 1;
        if let Some(dev) = player.development {
            self.trade += u64::from(dev.trade);
            self.politics += u64::from(dev.politics);
            self.science += u64::from(dev.science);
        }
        if let Some(base) = player.base {
            self.cities += u64::from(base.cities);
            self.settlements += u64::from(base.settlements);
        }
        if let Some(extra) = &player.extra_points {
            for (slot, kind) in ExtraPointKind::ALL.iter().enumerate() {
                let points = f64::from(extra.item(*kind));
                self.extra[slot] += match kind.unit_points() {
                    Some(unit) => points / f64::from(unit),
                    None => points,
                };
            }
        }
        self
    }

    fn averages(&self) -> Option<DetailAverages> {
        if self.games == 0 {
            return None;
        }
        let n = self.games as f64;
        Some(DetailAverages {
            games: self.games,
            trade: self.trade as f64 / n,
            politics: self.politics as f64 / n,
            science: self.science as f64 / n,
            cities: self.cities as f64 / n,
            settlements: self.settlements as f64 / n,
            extra: ExtraPointKind::ALL
                .iter()
                .zip(self.extra)
                .map(|(kind, total)| (*kind, total / n))
                .collect(),
        })
    }
}

/// Detail averages for one player over the games that recorded buildings
/// and development for the winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub averages: Option<DetailAverages>,
    pub win_averages: Option<DetailAverages>,
    /// Games started from positions 1..4, over the detailed games.
    pub start_order_counts: [u32; 4],
}

impl PlayerProfile {
    pub fn compute<'a, I>(name: &str, games: I) -> Self
    where
        I: IntoIterator<Item = &'a Game>,
    {
        let (all, won, start_order_counts) = games
            .into_iter()
            .filter(|game| {
                game.winner()
                    .is_some_and(|p| p.base.is_some() && p.development.is_some())
            })
            .filter_map(|game| game.position_of(name).map(|i| (i, &game.players[i])))
            .fold(
                (DetailTotals::default(), DetailTotals::default(), [0u32; 4]),
                |(all, won, mut orders), (index, player)| {
                    if let Some(start) = player.order.and_then(Place::from_position) {
                        orders[start.index()] += 1;
                    }
                    let won = if index == 0 { won.add(player) } else { won };
                    (all.add(player), won, orders)
                },
            );

        Self {
            name: name.to_string(),
            averages: all.averages(),
            win_averages: won.averages(),
            start_order_counts,
        }
    }
}
