use super::penalty::PenaltyInstance;
use super::play::PlayType;
use super::stats::PlayerStatLine;
use serde::{Deserialize, Serialize};

/// Terminal state of the pocket on a dropback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PocketOutcome {
    Sacked,
    Pressured,
    Scrambled,
    CleanPocket,
}

/// How a thrown ball resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PassOutcome {
    Complete,
    Incomplete,
    Drop,
    Deflection,
    Interception,
}

/// Final output of one simulated play. Owned by the caller once returned;
/// the engine keeps no reference to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayResult {
    pub play_type: PlayType,
    /// Net yards after any penalty and goal-line clipping.
    pub yards: i16,
    pub elapsed_seconds: u16,
    pub points: u8,
    pub is_touchdown: bool,
    pub is_turnover: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pocket: Option<PocketOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_outcome: Option<PassOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty: Option<PenaltyInstance>,
    /// Every player who recorded anything this play, zero lines filtered.
    pub player_stats: Vec<PlayerStatLine>,
}

impl PlayResult {
    /// Count of distinct players credited with an offensive snap.
    pub fn offensive_snap_count(&self) -> usize {
        self.player_stats.iter().filter(|l| l.offensive_snaps > 0).count()
    }

    /// Count of distinct players credited with a defensive snap.
    pub fn defensive_snap_count(&self) -> usize {
        self.player_stats.iter().filter(|l| l.defensive_snaps > 0).count()
    }

    pub fn stat_line(&self, name: &str) -> Option<&PlayerStatLine> {
        self.player_stats.iter().find(|l| l.name == name)
    }
}
