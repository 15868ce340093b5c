use super::player::{Player, Position};
use serde::{Deserialize, Serialize};

/// Per-player, per-play statistical accumulator.
///
/// Every field starts at zero and is only ever incremented through the
/// methods below; game- and season-level accumulators fold these lines
/// together with [`PlayerStatLine::merge`]. `longest_field_goal` is the one
/// take-maximum field.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PlayerStatLine {
    pub name: String,
    pub team: String,
    pub position: Position,
    pub jersey: u8,

    // Passing
    pub pass_attempts: u16,
    pub completions: u16,
    pub passing_yards: i16,
    pub passing_tds: u16,
    pub interceptions_thrown: u16,
    pub sacks_taken: u16,

    // Receiving
    pub targets: u16,
    pub receptions: u16,
    pub receiving_yards: i16,
    pub receiving_tds: u16,
    pub drops: u16,

    // Rushing
    pub rush_attempts: u16,
    pub rush_yards: i16,
    pub rush_tds: u16,

    // Defense
    pub tackles: u16,
    pub assisted_tackles: u16,
    pub tackles_for_loss: u16,
    /// Fractional for split credit; a shared sack is 0.5 + 0.5.
    pub sacks: f32,
    pub passes_defensed: u16,
    pub interceptions: u16,

    // Discipline
    pub penalties: u16,
    pub penalty_yards: u16,

    // Participation
    pub offensive_snaps: u16,
    pub defensive_snaps: u16,
    pub special_teams_snaps: u16,

    // Kicking game
    pub fg_attempts: u16,
    pub fg_made: u16,
    pub longest_field_goal: u8,
    pub xp_attempts: u16,
    pub xp_made: u16,
    pub kickoffs: u16,
    pub touchbacks: u16,
    pub kick_returns: u16,
    pub kick_return_yards: i16,
    pub kick_return_tds: u16,
}

impl PlayerStatLine {
    pub fn for_player(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            team: player.team.clone(),
            position: player.position,
            jersey: player.jersey,
            ..Default::default()
        }
    }

    pub fn add_pass_attempt(&mut self) {
        self.pass_attempts += 1;
    }

    pub fn add_completion(&mut self, yards: i16) {
        self.completions += 1;
        self.passing_yards += yards;
    }

    pub fn add_passing_td(&mut self) {
        self.passing_tds += 1;
    }

    pub fn add_interception_thrown(&mut self) {
        self.interceptions_thrown += 1;
    }

    pub fn add_sack_taken(&mut self) {
        self.sacks_taken += 1;
    }

    pub fn add_target(&mut self) {
        self.targets += 1;
    }

    pub fn add_reception(&mut self, yards: i16) {
        self.receptions += 1;
        self.receiving_yards += yards;
    }

    pub fn add_receiving_td(&mut self) {
        self.receiving_tds += 1;
    }

    pub fn add_drop(&mut self) {
        self.drops += 1;
    }

    pub fn add_rush_attempt(&mut self, yards: i16) {
        self.rush_attempts += 1;
        self.rush_yards += yards;
    }

    pub fn add_rush_td(&mut self) {
        self.rush_tds += 1;
    }

    pub fn add_tackle(&mut self, for_loss: bool) {
        self.tackles += 1;
        if for_loss {
            self.tackles_for_loss += 1;
        }
    }

    pub fn add_assisted_tackle(&mut self) {
        self.assisted_tackles += 1;
    }

    pub fn add_sack_credit(&mut self, share: f32) {
        self.sacks += share;
    }

    pub fn add_pass_defensed(&mut self) {
        self.passes_defensed += 1;
    }

    pub fn add_interception(&mut self) {
        self.interceptions += 1;
    }

    pub fn add_penalty(&mut self, yards: u8) {
        self.penalties += 1;
        self.penalty_yards += yards as u16;
    }

    pub fn add_offensive_snap(&mut self) {
        self.offensive_snaps += 1;
    }

    pub fn add_defensive_snap(&mut self) {
        self.defensive_snaps += 1;
    }

    pub fn add_special_teams_snap(&mut self) {
        self.special_teams_snaps += 1;
    }

    pub fn add_field_goal_attempt(&mut self, made: bool, distance: u8) {
        self.fg_attempts += 1;
        if made {
            self.fg_made += 1;
            if distance > self.longest_field_goal {
                self.longest_field_goal = distance;
            }
        }
    }

    pub fn add_extra_point(&mut self, made: bool) {
        self.xp_attempts += 1;
        if made {
            self.xp_made += 1;
        }
    }

    pub fn add_kickoff(&mut self, touchback: bool) {
        self.kickoffs += 1;
        if touchback {
            self.touchbacks += 1;
        }
    }

    pub fn add_kick_return(&mut self, yards: i16) {
        self.kick_returns += 1;
        self.kick_return_yards += yards;
    }

    pub fn add_kick_return_td(&mut self) {
        self.kick_return_tds += 1;
    }

    /// True when no field has been touched. Zero-valued lines are dropped
    /// from play results before they are returned.
    pub fn is_empty(&self) -> bool {
        *self
            == Self {
                name: self.name.clone(),
                team: self.team.clone(),
                position: self.position,
                jersey: self.jersey,
                ..Default::default()
            }
    }

    /// Field-wise addition, with `longest_field_goal` taking the maximum.
    pub fn merge(&mut self, other: &PlayerStatLine) {
        self.pass_attempts += other.pass_attempts;
        self.completions += other.completions;
        self.passing_yards += other.passing_yards;
        self.passing_tds += other.passing_tds;
        self.interceptions_thrown += other.interceptions_thrown;
        self.sacks_taken += other.sacks_taken;
        self.targets += other.targets;
        self.receptions += other.receptions;
        self.receiving_yards += other.receiving_yards;
        self.receiving_tds += other.receiving_tds;
        self.drops += other.drops;
        self.rush_attempts += other.rush_attempts;
        self.rush_yards += other.rush_yards;
        self.rush_tds += other.rush_tds;
        self.tackles += other.tackles;
        self.assisted_tackles += other.assisted_tackles;
        self.tackles_for_loss += other.tackles_for_loss;
        self.sacks += other.sacks;
        self.passes_defensed += other.passes_defensed;
        self.interceptions += other.interceptions;
        self.penalties += other.penalties;
        self.penalty_yards += other.penalty_yards;
        self.offensive_snaps += other.offensive_snaps;
        self.defensive_snaps += other.defensive_snaps;
        self.special_teams_snaps += other.special_teams_snaps;
        self.fg_attempts += other.fg_attempts;
        self.fg_made += other.fg_made;
        self.longest_field_goal = self.longest_field_goal.max(other.longest_field_goal);
        self.xp_attempts += other.xp_attempts;
        self.xp_made += other.xp_made;
        self.kickoffs += other.kickoffs;
        self.touchbacks += other.touchbacks;
        self.kick_returns += other.kick_returns;
        self.kick_return_yards += other.kick_return_yards;
        self.kick_return_tds += other.kick_return_tds;
    }
}
