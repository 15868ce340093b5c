//! Team momentum and individual form tracking.
//!
//! Momentum swings with big plays (scores, turnovers, sacks) and feeds the
//! modifier pipeline as a small multiplier. Form tracks each player's
//! recent execution and drives the hot/cold streak stage. Both are scoped
//! to a single game and must be reset between games; callers simulating
//! games concurrently give each game its own instance.

use std::collections::HashMap;

/// Momentum trend direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MomentumTrend {
    Rising,
    Falling,
    #[default]
    Stable,
}

/// Team momentum during a game.
///
/// Value range: 0.0 (deflated) to 1.0 (rolling), neutral 0.5.
#[derive(Debug, Clone, Copy)]
pub struct TeamMomentum {
    pub value: f32,
    pub trend: MomentumTrend,
    plays_since_event: u32,
}

impl Default for TeamMomentum {
    fn default() -> Self {
        Self { value: 0.5, trend: MomentumTrend::Stable, plays_since_event: 0 }
    }
}

impl TeamMomentum {
    /// Apply a momentum-changing event. Positive deltas are good for this
    /// team.
    pub fn apply_event(&mut self, delta: f32) {
        self.value = (self.value + delta).clamp(0.0, 1.0);
        self.trend = if delta > 0.01 {
            MomentumTrend::Rising
        } else if delta < -0.01 {
            MomentumTrend::Falling
        } else {
            MomentumTrend::Stable
        };
        self.plays_since_event = 0;
    }

    /// Advance one play; momentum decays slowly toward neutral when
    /// nothing notable has happened for a while.
    pub fn tick(&mut self) {
        self.plays_since_event += 1;
        if self.plays_since_event > 6 {
            let decay = 0.01;
            if self.value > 0.5 {
                self.value = (self.value - decay).max(0.5);
            } else if self.value < 0.5 {
                self.value = (self.value + decay).min(0.5);
            }
            if (self.value - 0.5).abs() < 0.01 {
                self.trend = MomentumTrend::Stable;
            }
        }
    }

    /// Symmetric multiplier input for the pipeline: -1.0 at deflated, 0.0
    /// neutral, +1.0 rolling.
    pub fn signed(&self) -> f32 {
        (self.value - 0.5) * 2.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[doc(hidden)]
    pub fn with_value(value: f32) -> Self {
        Self { value: value.clamp(0.0, 1.0), ..Default::default() }
    }
}

/// Momentum event deltas.
pub mod events {
    pub const TOUCHDOWN_SCORED: f32 = 0.15;
    pub const TOUCHDOWN_ALLOWED: f32 = -0.12;
    pub const TURNOVER_FORCED: f32 = 0.12;
    pub const TURNOVER_COMMITTED: f32 = -0.12;
    pub const SACK_MADE: f32 = 0.05;
    pub const SACK_ALLOWED: f32 = -0.04;
    pub const BIG_PLAY: f32 = 0.08;
    pub const THREE_AND_OUT_FORCED: f32 = 0.06;
}

/// Rolling hot/cold streak per player, from recent play grades.
///
/// A grade is 0.0 (busted play) to 1.0 (big success); the tracker keeps an
/// exponential moving average and exposes it as a multiplier within a
/// span configured by the pipeline (a hot quarterback completes a few more
/// passes, a cold one a few less).
#[derive(Debug, Clone, Default)]
pub struct FormTracker {
    averages: HashMap<String, f32>,
}

impl FormTracker {
    const SMOOTHING: f32 = 0.30;

    pub fn new() -> Self {
        Self::default()
    }

    /// Record one graded play for a player.
    pub fn record(&mut self, player_name: &str, grade: f32) {
        let grade = grade.clamp(0.0, 1.0);
        let entry = self.averages.entry(player_name.to_string()).or_insert(0.5);
        *entry = *entry * (1.0 - Self::SMOOTHING) + grade * Self::SMOOTHING;
    }

    /// Signed streak for a player: -1.0 ice cold, 0.0 neutral, +1.0 red
    /// hot. Unknown players are neutral.
    pub fn signed(&self, player_name: &str) -> f32 {
        let avg = self.averages.get(player_name).copied().unwrap_or(0.5);
        (avg - 0.5) * 2.0
    }

    /// Multiplier within `±span` around 1.0.
    pub fn multiplier(&self, player_name: &str, span: f32) -> f32 {
        1.0 + self.signed(player_name) * span
    }

    pub fn reset(&mut self) {
        self.averages.clear();
    }
}
