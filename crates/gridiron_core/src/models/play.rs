use serde::{Deserialize, Serialize};

/// Closed set of play types the engine resolves. The single dispatch point
/// in `engine::PlaySimulator::simulate_play` matches exhaustively, so adding
/// a variant forces a resolver to exist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PlayType {
    Pass,
    Run,
    FieldGoal,
    Kickoff,
    ExtraPoint,
}

impl std::fmt::Display for PlayType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            PlayType::Pass => "pass",
            PlayType::Run => "run",
            PlayType::FieldGoal => "field_goal",
            PlayType::Kickoff => "kickoff",
            PlayType::ExtraPoint => "extra_point",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Snow,
    Wind,
}

/// Offensive personnel groupings the engine knows how to field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OffensiveFormation {
    IForm,
    Singleback,
    Shotgun,
    Spread,
    GoalLine,
    FieldGoalUnit,
    KickoffUnit,
}

impl std::fmt::Display for OffensiveFormation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            OffensiveFormation::IForm => "i_form",
            OffensiveFormation::Singleback => "singleback",
            OffensiveFormation::Shotgun => "shotgun",
            OffensiveFormation::Spread => "spread",
            OffensiveFormation::GoalLine => "goal_line",
            OffensiveFormation::FieldGoalUnit => "field_goal_unit",
            OffensiveFormation::KickoffUnit => "kickoff_unit",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DefensiveFormation {
    Base43,
    Base34,
    Nickel,
    Dime,
    GoalLineDefense,
    Prevent,
    FieldGoalBlock,
    KickReturn,
}

impl std::fmt::Display for DefensiveFormation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            DefensiveFormation::Base43 => "base_43",
            DefensiveFormation::Base34 => "base_34",
            DefensiveFormation::Nickel => "nickel",
            DefensiveFormation::Dime => "dime",
            DefensiveFormation::GoalLineDefense => "goal_line_defense",
            DefensiveFormation::Prevent => "prevent",
            DefensiveFormation::FieldGoalBlock => "field_goal_block",
            DefensiveFormation::KickReturn => "kick_return",
        };
        write!(f, "{}", s)
    }
}

/// Pass-coverage family of the defensive call. Man families use the
/// position-preference matchup table; zone families assign by route depth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum CoverageScheme {
    ManPress,
    #[default]
    Man,
    Zone,
    ZoneDeep,
    Prevent,
}

impl CoverageScheme {
    pub fn is_man(&self) -> bool {
        matches!(self, CoverageScheme::ManPress | CoverageScheme::Man)
    }

    /// Name used to key the scheme modifier table in config.
    pub fn key(&self) -> &'static str {
        match self {
            CoverageScheme::ManPress => "man_press",
            CoverageScheme::Man => "man",
            CoverageScheme::Zone => "zone",
            CoverageScheme::ZoneDeep => "zone_deep",
            CoverageScheme::Prevent => "prevent",
        }
    }
}

/// Named blitz package: which positions rush beyond the base front.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum BlitzPackage {
    /// Standard four-man rush from the defensive line.
    #[default]
    BaseRush,
    MikeBlitz,
    SafetyBlitz,
    CornerBlitz,
    DoubleABlitz,
    ZeroBlitz,
}

/// Complexity tier of the called play; widens execution variance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum PlayComplexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

/// Immutable situational snapshot for one play. Built fresh by the caller
/// for every snap; nothing in the engine mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayContext {
    pub quarter: u8,
    /// Seconds remaining in the quarter.
    pub seconds_remaining: u16,
    pub down: u8,
    pub distance: u8,
    /// 0-100, offense's own goal line at 0.
    pub field_position: f32,
    /// Offense score minus defense score.
    pub score_differential: i16,
    pub offense_is_home: bool,
    pub play_type: PlayType,
    pub offensive_formation: OffensiveFormation,
    pub defensive_formation: DefensiveFormation,
    #[serde(default)]
    pub coverage: CoverageScheme,
    #[serde(default)]
    pub blitz: BlitzPackage,
    #[serde(default)]
    pub complexity: PlayComplexity,
    #[serde(default)]
    pub weather: Weather,
    /// Crowd noise intensity, 0.0 (empty) to 1.0 (deafening).
    #[serde(default)]
    pub crowd_noise: f32,
    #[serde(default)]
    pub is_primetime: bool,
}

impl PlayContext {
    /// Yards from the current spot to the defender's goal line.
    pub fn yards_to_goal(&self) -> f32 {
        (100.0 - self.field_position).max(0.0)
    }

    /// Urgency of the moment, 0.0 (garbage time) to 1.0 (game on the line).
    ///
    /// Late quarters, a running-out clock and a one-score margin all push
    /// the factor up. The composure stage of the modifier pipeline only
    /// engages above the configured clutch threshold.
    pub fn clutch_factor(&self) -> f32 {
        let quarter_weight = match self.quarter {
            1 => 0.0,
            2 => 0.15,
            3 => 0.2,
            _ => 0.5,
        };
        let clock_weight = if self.quarter >= 4 && self.seconds_remaining <= 300 {
            0.3 * (1.0 - self.seconds_remaining as f32 / 300.0)
        } else {
            0.0
        };
        let margin = self.score_differential.unsigned_abs() as f32;
        let margin_weight = if margin <= 8.0 { 0.2 * (1.0 - margin / 9.0) } else { 0.0 };

        (quarter_weight + clock_weight + margin_weight).clamp(0.0, 1.0)
    }
}
