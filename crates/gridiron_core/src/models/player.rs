use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rating used when a player exposes neither the requested attribute nor an
/// overall rating.
pub const DEFAULT_RATING: f32 = 60.0;

/// Roster position for the 11-a-side personnel model.
///
/// Specific slots (LT, MLB, FS, ...) describe a formation requirement;
/// generic slots (OL, LB, S, ...) are depth-chart aliases that may fill any
/// specific slot of the same class, and vice versa.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    // Offense
    QB,
    RB,
    FB,
    WR,
    TE,
    LT,
    LG,
    C,
    RG,
    RT,
    // Defense
    DE,
    DT,
    NT,
    OLB,
    MLB,
    ILB,
    CB,
    FS,
    SS,
    // Specialists
    K,
    P,
    LS,
    // Generic depth-chart positions
    OL,
    DL,
    LB,
    S,
    DB,
}

impl Position {
    pub fn is_offense(&self) -> bool {
        matches!(
            self,
            Position::QB
                | Position::RB
                | Position::FB
                | Position::WR
                | Position::TE
                | Position::LT
                | Position::LG
                | Position::C
                | Position::RG
                | Position::RT
                | Position::OL
        )
    }

    pub fn is_defense(&self) -> bool {
        matches!(
            self,
            Position::DE
                | Position::DT
                | Position::NT
                | Position::OLB
                | Position::MLB
                | Position::ILB
                | Position::CB
                | Position::FS
                | Position::SS
                | Position::DL
                | Position::LB
                | Position::S
                | Position::DB
        )
    }

    pub fn is_offensive_line(&self) -> bool {
        matches!(
            self,
            Position::LT | Position::LG | Position::C | Position::RG | Position::RT | Position::OL
        )
    }

    pub fn is_defensive_line(&self) -> bool {
        matches!(self, Position::DE | Position::DT | Position::NT | Position::DL)
    }

    pub fn is_linebacker(&self) -> bool {
        matches!(self, Position::OLB | Position::MLB | Position::ILB | Position::LB)
    }

    pub fn is_defensive_back(&self) -> bool {
        matches!(self, Position::CB | Position::FS | Position::SS | Position::S | Position::DB)
    }

    pub fn is_safety(&self) -> bool {
        matches!(self, Position::FS | Position::SS | Position::S)
    }

    pub fn is_receiver(&self) -> bool {
        matches!(self, Position::WR | Position::TE)
    }

    pub fn is_back(&self) -> bool {
        matches!(self, Position::RB | Position::FB)
    }

    pub fn is_specialist(&self) -> bool {
        matches!(self, Position::K | Position::P | Position::LS)
    }

    /// Generic alias covering this position's class, if one exists.
    fn generic(&self) -> Option<Position> {
        if self.is_offensive_line() {
            Some(Position::OL)
        } else if self.is_defensive_line() {
            Some(Position::DL)
        } else if self.is_linebacker() {
            Some(Position::LB)
        } else if self.is_safety() {
            Some(Position::S)
        } else if self.is_defensive_back() {
            Some(Position::DB)
        } else {
            None
        }
    }

    /// Whether a player listed at this position may occupy `slot` in a
    /// personnel table. Exact matches always fill; otherwise the player and
    /// slot must share a generic class (a depth-chart "LB" may line up at
    /// MLB, and an MLB may fill a generic "LB" slot). DB is the widest
    /// defensive-backfield alias and also accepts safeties and corners.
    pub fn fills(&self, slot: Position) -> bool {
        if *self == slot {
            return true;
        }
        match (self.generic(), slot.generic()) {
            (Some(g), _) if g == slot => true,
            (_, Some(g)) if g == *self => true,
            (Some(a), Some(b)) if a == b => true,
            // Safeties fold into the DB alias in both directions.
            _ => {
                (slot == Position::DB && self.is_defensive_back())
                    || (*self == Position::DB && slot.is_defensive_back())
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::QB
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::FB => "FB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::LT => "LT",
            Position::LG => "LG",
            Position::C => "C",
            Position::RG => "RG",
            Position::RT => "RT",
            Position::DE => "DE",
            Position::DT => "DT",
            Position::NT => "NT",
            Position::OLB => "OLB",
            Position::MLB => "MLB",
            Position::ILB => "ILB",
            Position::CB => "CB",
            Position::FS => "FS",
            Position::SS => "SS",
            Position::K => "K",
            Position::P => "P",
            Position::LS => "LS",
            Position::OL => "OL",
            Position::DL => "DL",
            Position::LB => "LB",
            Position::S => "S",
            Position::DB => "DB",
        };
        write!(f, "{}", s)
    }
}

/// Player data consumed by the play resolution engine.
///
/// The engine never mutates a player. Named ratings live in a string-keyed
/// map so the roster provider can ship whichever attributes it has; lookups
/// go through the fallback chain below rather than erroring on gaps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: String,
    pub jersey: u8,
    pub position: Position,
    pub team: String,
    pub overall: u8,
    #[serde(default)]
    pub ratings: HashMap<String, f32>,
}

impl Player {
    pub fn new(name: &str, jersey: u8, position: Position, team: &str, overall: u8) -> Self {
        Self {
            name: name.to_string(),
            jersey,
            position,
            team: team.to_string(),
            overall,
            ratings: HashMap::new(),
        }
    }

    pub fn with_rating(mut self, name: &str, value: f32) -> Self {
        self.ratings.insert(name.to_string(), value);
        self
    }

    /// Named rating lookup. The pseudo-attribute `"overall"` always resolves
    /// to the player's overall rating.
    pub fn rating(&self, name: &str) -> Option<f32> {
        if name == "overall" {
            return Some(self.overall as f32);
        }
        self.ratings.get(name).copied()
    }

    /// The documented fallback chain: first present attribute in `names`
    /// wins, otherwise `default`. Callers wanting the standard
    /// attribute-then-overall chain append `"overall"` or use
    /// [`Player::rating_or_overall`].
    pub fn rating_chain(&self, names: &[&str], default: f32) -> f32 {
        for name in names {
            if let Some(v) = self.rating(name) {
                return v;
            }
        }
        default
    }

    /// Standard chain: specific attribute, then overall, then
    /// [`DEFAULT_RATING`].
    pub fn rating_or_overall(&self, name: &str) -> f32 {
        self.rating_chain(&[name, "overall"], DEFAULT_RATING)
    }
}

/// Rating scale helpers.
pub mod ratings {
    /// Map a 0-100 rating onto 0.0-1.0.
    #[inline]
    pub fn normalize(value: f32) -> f32 {
        (value / 100.0).clamp(0.0, 1.0)
    }

    /// Average of normalized ratings; 0.5 (league average) for an empty set.
    pub fn normalized_mean(values: &[f32]) -> f32 {
        if values.is_empty() {
            return 0.5;
        }
        let sum: f32 = values.iter().map(|v| normalize(*v)).sum();
        sum / values.len() as f32
    }
}
