use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static DEFENDER_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)d$").expect("valid defender token regex"));

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ExtraPointKind {
    Merchant,
    Roads,
    Defender,
    VictoryPolitics,
    VictoryScience,
    MetropolisTrade,
    MetropolisPolitics,
    MetropolisScience,
}

impl ExtraPointKind {
    pub const ALL: [Self; 8] = [
        Self::Merchant,
        Self::Roads,
        Self::Defender,
        Self::VictoryPolitics,
        Self::VictoryScience,
        Self::MetropolisTrade,
        Self::MetropolisPolitics,
        Self::MetropolisScience,
    ];

    /// Resolves one extra-points token to its kind and point value.
    ///
    /// `<n>d` is the defender token carrying its own score; every other
    /// token comes from the fixed table below. Returns `None` for anything
    /// else so the caller can refuse the cell.
    pub fn from_token(token: &str) -> Option<(Self, i32)> {
        if let Some(caps) = DEFENDER_TOKEN_RE.captures(token) {
            let score = caps[1].parse::<i32>().ok()?;
            return Some((Self::Defender, score));
        }

        let kind = match token {
            "merchant" => Self::Merchant,
            "roads" => Self::Roads,
            "vb" => Self::VictoryPolitics,
            "vg" => Self::VictoryScience,
            "my" => Self::MetropolisTrade,
            "mb" => Self::MetropolisPolitics,
            "mg" => Self::MetropolisScience,
            _ => return None,
        };
        let score = kind.unit_points()?;
        Some((kind, score))
    }

    /// Points awarded for one occurrence; defender carries its own score.
    pub fn unit_points(&self) -> Option<i32> {
        match *self {
            Self::Merchant => Some(1),
            Self::Roads => Some(2),
            Self::Defender => None,
            Self::VictoryPolitics | Self::VictoryScience => Some(1),
            Self::MetropolisTrade | Self::MetropolisPolitics | Self::MetropolisScience => Some(2),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Merchant => "merchant",
            Self::Roads => "roads",
            Self::Defender => "defender",
            Self::VictoryPolitics => "victoryPolitics",
            Self::VictoryScience => "victoryScience",
            Self::MetropolisTrade => "metropolisTrade",
            Self::MetropolisPolitics => "metropolisPolitics",
            Self::MetropolisScience => "metropolisScience",
        }
    }
}

impl fmt::Display for ExtraPointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ExtraPointKind;

    #[test]
    fn table_tokens_resolve_to_fixed_scores() {
        assert_eq!(
            ExtraPointKind::from_token("roads"),
            Some((ExtraPointKind::Roads, 2))
        );
        assert_eq!(
            ExtraPointKind::from_token("merchant"),
            Some((ExtraPointKind::Merchant, 1))
        );
        assert_eq!(
            ExtraPointKind::from_token("mg"),
            Some((ExtraPointKind::MetropolisScience, 2))
        );
        assert_eq!(
            ExtraPointKind::from_token("vb"),
            Some((ExtraPointKind::VictoryPolitics, 1))
        );
    }

    #[test]
    fn defender_token_carries_its_own_score() {
        assert_eq!(
            ExtraPointKind::from_token("3d"),
            Some((ExtraPointKind::Defender, 3))
        );
        assert_eq!(ExtraPointKind::from_token("d"), None);
        assert_eq!(ExtraPointKind::from_token("3dx"), None);
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert_eq!(ExtraPointKind::from_token("bogus"), None);
        assert_eq!(ExtraPointKind::from_token("Roads"), None);
    }

    #[test]
    fn names_match_serialized_form() {
        for kind in ExtraPointKind::ALL {
            let json = serde_json::to_string(&kind).expect("kind should serialize");
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
