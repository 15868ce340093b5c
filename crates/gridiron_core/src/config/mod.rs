//! Engine configuration handle.
//!
//! One [`SimConfig`] is constructed at process start (either
//! [`SimConfig::standard`] or deserialized by the surrounding application's
//! loader) and passed by reference into every component that needs it.
//! There is no hidden global. Required lookups fail loudly with a
//! configuration error rather than silently defaulting, because a guessed
//! personnel table or rate table would corrupt snap accounting and balance.

pub mod base_rates;

pub use base_rates::{bounds, BaseRateTable};

use crate::error::{Result, SimError};
use crate::models::{DefensiveFormation, OffensiveFormation, PlayType, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Required on-field count per position for a formation.
pub type PersonnelTable = Vec<(Position, u8)>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub offense_personnel: HashMap<OffensiveFormation, PersonnelTable>,
    pub defense_personnel: HashMap<DefensiveFormation, PersonnelTable>,
    /// Base rates per play family; required for every play type the caller
    /// simulates.
    pub base_rates: HashMap<PlayType, BaseRateTable>,
    /// Optional whole-table overrides for specific formation pairings.
    #[serde(default)]
    pub pair_overrides: Vec<(OffensiveFormation, DefensiveFormation, BaseRateTable)>,
    /// Named numeric thresholds, keyed by name.
    pub thresholds: HashMap<String, f32>,
    /// Named numeric modifiers, keyed by category then name.
    pub modifiers: HashMap<String, HashMap<String, f32>>,
}

impl SimConfig {
    /// A config with nothing registered; every lookup fails. Used by tests
    /// exercising the loud-failure contract and by loaders that fill in
    /// every section themselves.
    pub fn empty() -> Self {
        Self {
            offense_personnel: HashMap::new(),
            defense_personnel: HashMap::new(),
            base_rates: HashMap::new(),
            pair_overrides: Vec::new(),
            thresholds: HashMap::new(),
            modifiers: HashMap::new(),
        }
    }

    pub fn offense_personnel(&self, formation: OffensiveFormation) -> Result<&PersonnelTable> {
        self.offense_personnel
            .get(&formation)
            .ok_or_else(|| SimError::UnknownFormation(formation.to_string()))
    }

    pub fn defense_personnel(&self, formation: DefensiveFormation) -> Result<&PersonnelTable> {
        self.defense_personnel
            .get(&formation)
            .ok_or_else(|| SimError::UnknownFormation(formation.to_string()))
    }

    /// Base-rate table for a play type and formation pairing. A registered
    /// pair override wins wholesale; otherwise the play-type table applies.
    /// A missing play-type table is a loud configuration error.
    pub fn base_rates(
        &self,
        play_type: PlayType,
        pair: (OffensiveFormation, DefensiveFormation),
    ) -> Result<BaseRateTable> {
        if let Some((_, _, table)) =
            self.pair_overrides.iter().find(|(o, d, _)| *o == pair.0 && *d == pair.1)
        {
            return Ok(table.clone());
        }
        self.base_rates
            .get(&play_type)
            .cloned()
            .ok_or_else(|| SimError::MissingConfig {
                section: "base_rates".to_string(),
                key: play_type.to_string(),
            })
    }

    pub fn threshold(&self, name: &str) -> Result<f32> {
        self.thresholds.get(name).copied().ok_or_else(|| SimError::MissingConfig {
            section: "thresholds".to_string(),
            key: name.to_string(),
        })
    }

    pub fn modifier(&self, category: &str, name: &str) -> Result<f32> {
        self.modifiers
            .get(category)
            .and_then(|m| m.get(name))
            .copied()
            .ok_or_else(|| SimError::MissingConfig {
                section: format!("modifiers/{}", category),
                key: name.to_string(),
            })
    }

    /// The tuned default tables the engine ships with.
    pub fn standard() -> Self {
        use DefensiveFormation as D;
        use OffensiveFormation as O;
        use Position::*;

        let mut offense_personnel = HashMap::new();
        offense_personnel.insert(
            O::IForm,
            vec![(QB, 1), (RB, 1), (FB, 1), (TE, 1), (WR, 2), (LT, 1), (LG, 1), (C, 1), (RG, 1), (RT, 1)],
        );
        offense_personnel.insert(
            O::Singleback,
            vec![(QB, 1), (RB, 1), (TE, 2), (WR, 2), (LT, 1), (LG, 1), (C, 1), (RG, 1), (RT, 1)],
        );
        offense_personnel.insert(
            O::Shotgun,
            vec![(QB, 1), (RB, 1), (TE, 1), (WR, 3), (LT, 1), (LG, 1), (C, 1), (RG, 1), (RT, 1)],
        );
        offense_personnel.insert(
            O::Spread,
            vec![(QB, 1), (RB, 1), (WR, 4), (LT, 1), (LG, 1), (C, 1), (RG, 1), (RT, 1)],
        );
        offense_personnel.insert(
            O::GoalLine,
            vec![(QB, 1), (RB, 1), (FB, 1), (TE, 3), (LT, 1), (LG, 1), (C, 1), (RG, 1), (RT, 1)],
        );
        offense_personnel.insert(
            O::FieldGoalUnit,
            vec![(K, 1), (P, 1), (LS, 1), (OL, 5), (TE, 2), (WR, 1)],
        );
        offense_personnel.insert(
            O::KickoffUnit,
            vec![(K, 1), (WR, 2), (TE, 2), (LB, 3), (S, 2), (CB, 1)],
        );

        let mut defense_personnel = HashMap::new();
        defense_personnel.insert(
            D::Base43,
            vec![(DE, 2), (DT, 2), (OLB, 2), (MLB, 1), (CB, 2), (FS, 1), (SS, 1)],
        );
        defense_personnel.insert(
            D::Base34,
            vec![(DE, 2), (NT, 1), (OLB, 2), (ILB, 2), (CB, 2), (FS, 1), (SS, 1)],
        );
        defense_personnel.insert(
            D::Nickel,
            vec![(DE, 2), (DT, 2), (OLB, 1), (MLB, 1), (CB, 3), (FS, 1), (SS, 1)],
        );
        defense_personnel.insert(
            D::Dime,
            vec![(DE, 2), (DT, 1), (OLB, 1), (MLB, 1), (CB, 4), (FS, 1), (SS, 1)],
        );
        defense_personnel.insert(
            D::GoalLineDefense,
            vec![(DE, 2), (DT, 2), (NT, 1), (OLB, 2), (MLB, 1), (CB, 1), (SS, 2)],
        );
        defense_personnel.insert(
            D::Prevent,
            vec![(DE, 2), (DT, 1), (OLB, 1), (MLB, 1), (CB, 3), (FS, 2), (SS, 1)],
        );
        defense_personnel.insert(
            D::FieldGoalBlock,
            vec![(DE, 2), (DT, 2), (NT, 1), (OLB, 2), (MLB, 1), (CB, 1), (FS, 1), (SS, 1)],
        );
        defense_personnel.insert(
            D::KickReturn,
            vec![(WR, 2), (RB, 1), (TE, 2), (LB, 4), (CB, 2)],
        );

        let mut base_rates = HashMap::new();
        base_rates.insert(PlayType::Pass, BaseRateTable::pass_default());
        base_rates.insert(PlayType::Run, BaseRateTable::run_default());
        base_rates.insert(PlayType::FieldGoal, BaseRateTable::kick_default());
        base_rates.insert(PlayType::ExtraPoint, BaseRateTable::kick_default());
        base_rates.insert(PlayType::Kickoff, BaseRateTable::kick_default());

        // A prevent shell concedes the short completion; a stacked goal
        // line front squeezes the run game.
        let pair_overrides = vec![
            (
                O::Spread,
                D::Prevent,
                BaseRateTable {
                    completion_rate: 0.70,
                    sack_rate: 0.045,
                    air_yards_mean: 6.0,
                    ..BaseRateTable::pass_default()
                },
            ),
            (
                O::GoalLine,
                D::GoalLineDefense,
                BaseRateTable {
                    rush_yards_mean: 1.8,
                    rush_yards_std: 2.0,
                    ..BaseRateTable::run_default()
                },
            ),
        ];

        let mut thresholds = HashMap::new();
        for (name, value) in [
            ("clutch_engage", 0.6),
            ("composure_high", 65.0),
            ("composure_low", 45.0),
            ("designed_scramble_mobility", 80.0),
            ("designed_scramble_chance", 0.04),
            ("escape_bonus", 0.25),
            ("escape_ceiling", 0.85),
            ("long_scramble_chance", 0.08),
            ("deep_route_depth", 18.0),
            ("short_route_depth", 6.0),
            ("tackle_fatigue_start", 4.0),
            ("breakaway_speed", 88.0),
            ("breakaway_chance", 0.05),
            ("touchback_base", 0.55),
            ("fg_block_rate", 0.015),
        ] {
            thresholds.insert(name.to_string(), value);
        }

        let mut modifiers: HashMap<String, HashMap<String, f32>> = HashMap::new();
        let mut insert = |category: &str, entries: &[(&str, f32)]| {
            let map = entries.iter().map(|(k, v)| (k.to_string(), *v)).collect();
            modifiers.insert(category.to_string(), map);
        };

        insert(
            "scheme_man_press",
            &[
                ("completion_mult", 0.94),
                ("sack_mult", 1.02),
                ("pressure_mult", 1.05),
                ("interception_mult", 1.15),
                ("deflection_mult", 1.10),
                ("air_mult", 1.05),
            ],
        );
        insert(
            "scheme_man",
            &[
                ("completion_mult", 1.0),
                ("sack_mult", 1.0),
                ("pressure_mult", 1.0),
                ("interception_mult", 1.0),
                ("deflection_mult", 1.05),
                ("air_mult", 1.0),
            ],
        );
        insert(
            "scheme_zone",
            &[
                ("completion_mult", 1.03),
                ("sack_mult", 0.95),
                ("pressure_mult", 0.95),
                ("interception_mult", 1.10),
                ("deflection_mult", 1.0),
                ("air_mult", 0.95),
            ],
        );
        insert(
            "scheme_zone_deep",
            &[
                ("completion_mult", 1.06),
                ("sack_mult", 0.90),
                ("pressure_mult", 0.90),
                ("interception_mult", 0.90),
                ("deflection_mult", 1.0),
                ("air_mult", 0.85),
            ],
        );
        insert(
            "scheme_prevent",
            &[
                ("completion_mult", 1.15),
                ("sack_mult", 0.70),
                ("pressure_mult", 0.80),
                ("interception_mult", 0.85),
                ("deflection_mult", 0.95),
                ("air_mult", 0.75),
            ],
        );
        insert(
            "down_third",
            &[("pressure_mult", 1.12), ("sack_mult", 1.08), ("completion_delta", -0.02)],
        );
        insert(
            "down_fourth",
            &[("pressure_mult", 1.15), ("sack_mult", 1.10), ("completion_delta", -0.03)],
        );
        insert(
            "weather_rain",
            &[("completion_delta", -0.05), ("air_delta", -1.0), ("kick_mult", 0.95)],
        );
        insert(
            "weather_snow",
            &[("completion_delta", -0.08), ("air_delta", -2.5), ("kick_mult", 0.88)],
        );
        insert(
            "weather_wind",
            &[("completion_delta", -0.03), ("air_delta", -1.5), ("kick_mult", 0.90)],
        );
        insert("crowd", &[("completion_per_noise", -0.04), ("sack_per_noise", 0.02)]);
        insert("clutch", &[("completion_bonus", 0.03), ("completion_penalty", -0.06)]);
        insert("streak", &[("span", 0.07)]);
        insert("momentum", &[("span", 0.05)]);
        insert(
            "variance_rate",
            &[("simple", 0.010), ("medium", 0.020), ("complex", 0.035)],
        );
        insert(
            "variance_yards",
            &[("simple", 0.5), ("medium", 1.0), ("complex", 1.8)],
        );
        insert("home_field", &[("penalty_mult_home", 0.92), ("penalty_mult_away", 1.05)]);
        insert(
            "penalty_base",
            &[
                ("false_start", 0.020),
                ("delay_of_game", 0.008),
                ("offside", 0.016),
                ("encroachment", 0.006),
                ("offensive_holding", 0.028),
                ("defensive_holding", 0.012),
                ("illegal_contact", 0.008),
                ("pass_interference", 0.016),
                ("roughing_the_passer", 0.007),
                ("face_mask", 0.006),
                ("unnecessary_roughness", 0.007),
                ("illegal_block_in_the_back", 0.040),
            ],
        );

        Self {
            offense_personnel,
            defense_personnel,
            base_rates,
            pair_overrides,
            thresholds,
            modifiers,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::standard()
    }
}
