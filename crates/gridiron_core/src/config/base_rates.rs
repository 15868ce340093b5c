use serde::{Deserialize, Serialize};

/// Tunable base rates for one play family, before the modifier pipeline
/// runs. Rate fields are probabilities; yardage fields are Gaussian
/// means/spreads. A pair override table (specific offensive vs defensive
/// formation) replaces the play-type table wholesale when registered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseRateTable {
    pub completion_rate: f32,
    pub sack_rate: f32,
    pub pressure_rate: f32,
    pub interception_rate: f32,
    pub deflection_rate: f32,

    pub air_yards_mean: f32,
    pub air_yards_std: f32,
    pub yac_mean: f32,
    pub yac_std: f32,

    pub rush_yards_mean: f32,
    pub rush_yards_std: f32,
    pub yards_after_contact_mean: f32,

    /// Sack loss magnitudes, positive numbers.
    pub sack_yards_min: f32,
    pub sack_yards_max: f32,

    pub scramble_yards_mean: f32,
    pub scramble_yards_std: f32,
}

impl BaseRateTable {
    /// League-average dropback numbers.
    pub fn pass_default() -> Self {
        Self {
            completion_rate: 0.62,
            sack_rate: 0.065,
            pressure_rate: 0.24,
            interception_rate: 0.025,
            deflection_rate: 0.055,
            air_yards_mean: 8.0,
            air_yards_std: 6.0,
            yac_mean: 5.0,
            yac_std: 4.0,
            rush_yards_mean: 4.2,
            rush_yards_std: 3.5,
            yards_after_contact_mean: 1.8,
            sack_yards_min: 5.0,
            sack_yards_max: 9.0,
            scramble_yards_mean: 5.5,
            scramble_yards_std: 4.0,
        }
    }

    /// League-average handoff numbers. Pass-specific rates stay at their
    /// defaults so a run table still resolves when a play-action style
    /// caller asks for them.
    pub fn run_default() -> Self {
        Self {
            rush_yards_mean: 4.2,
            rush_yards_std: 3.2,
            yards_after_contact_mean: 1.9,
            ..Self::pass_default()
        }
    }

    /// Kick plays reuse the yardage machinery only.
    pub fn kick_default() -> Self {
        Self {
            rush_yards_mean: 22.0,
            rush_yards_std: 8.0,
            ..Self::pass_default()
        }
    }
}

/// Parameter-specific clamp bounds for rate-type values.
///
/// Each bound is applied right after any pipeline stage that can push the
/// parameter out of range; yardage means are deliberately unbounded below
/// (a busted play can lose yards). The floors keep degenerate ratings from
/// zeroing an outcome entirely and the ceilings keep blowout matchups
/// inside observed league extremes.
pub mod bounds {
    pub const COMPLETION: (f32, f32) = (0.10, 0.85);
    pub const SACK: (f32, f32) = (0.01, 0.25);
    pub const PRESSURE: (f32, f32) = (0.05, 0.55);
    pub const INTERCEPTION: (f32, f32) = (0.004, 0.15);
    pub const DEFLECTION: (f32, f32) = (0.01, 0.20);

    #[inline]
    pub fn clamp(value: f32, range: (f32, f32)) -> f32 {
        value.clamp(range.0, range.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_inside_bounds() {
        let t = BaseRateTable::pass_default();
        assert!((bounds::COMPLETION.0..=bounds::COMPLETION.1).contains(&t.completion_rate));
        assert!((bounds::SACK.0..=bounds::SACK.1).contains(&t.sack_rate));
        assert!((bounds::PRESSURE.0..=bounds::PRESSURE.1).contains(&t.pressure_rate));
        assert!((bounds::INTERCEPTION.0..=bounds::INTERCEPTION.1).contains(&t.interception_rate));
        assert!(t.sack_yards_min < t.sack_yards_max);
    }

    #[test]
    fn test_clamp_helper() {
        assert_eq!(bounds::clamp(1.4, bounds::COMPLETION), bounds::COMPLETION.1);
        assert_eq!(bounds::clamp(-0.2, bounds::SACK), bounds::SACK.0);
        let mid = bounds::clamp(0.5, bounds::COMPLETION);
        assert!((mid - 0.5).abs() < f32::EPSILON);
    }
}
