use super::player::Position;
use serde::{Deserialize, Serialize};

/// Registered penalty kinds, in their fixed evaluation order. The penalty
/// engine rolls each kind independently and applies the first that
/// triggers, so a play carries at most one penalty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PenaltyKind {
    FalseStart,
    DelayOfGame,
    Offside,
    Encroachment,
    OffensiveHolding,
    DefensiveHolding,
    IllegalContact,
    PassInterference,
    RoughingThePasser,
    FaceMask,
    UnnecessaryRoughness,
    IllegalBlockInTheBack,
}

impl PenaltyKind {
    /// Stable snake_case key used by config tables.
    pub fn key(&self) -> &'static str {
        match self {
            PenaltyKind::FalseStart => "false_start",
            PenaltyKind::DelayOfGame => "delay_of_game",
            PenaltyKind::Offside => "offside",
            PenaltyKind::Encroachment => "encroachment",
            PenaltyKind::OffensiveHolding => "offensive_holding",
            PenaltyKind::DefensiveHolding => "defensive_holding",
            PenaltyKind::IllegalContact => "illegal_contact",
            PenaltyKind::PassInterference => "pass_interference",
            PenaltyKind::RoughingThePasser => "roughing_the_passer",
            PenaltyKind::FaceMask => "face_mask",
            PenaltyKind::UnnecessaryRoughness => "unnecessary_roughness",
            PenaltyKind::IllegalBlockInTheBack => "illegal_block_in_the_back",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PenaltyKind::FalseStart => "False Start",
            PenaltyKind::DelayOfGame => "Delay of Game",
            PenaltyKind::Offside => "Offside",
            PenaltyKind::Encroachment => "Encroachment",
            PenaltyKind::OffensiveHolding => "Offensive Holding",
            PenaltyKind::DefensiveHolding => "Defensive Holding",
            PenaltyKind::IllegalContact => "Illegal Contact",
            PenaltyKind::PassInterference => "Pass Interference",
            PenaltyKind::RoughingThePasser => "Roughing the Passer",
            PenaltyKind::FaceMask => "Face Mask",
            PenaltyKind::UnnecessaryRoughness => "Unnecessary Roughness",
            PenaltyKind::IllegalBlockInTheBack => "Illegal Block in the Back",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PenaltySide {
    Offense,
    Defense,
}

/// When in the snap cycle the infraction happened. Pre-snap penalties kill
/// the play outright; post-play penalties tack onto the finished result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PenaltyPhase {
    PreSnap,
    DuringPlay,
    PostPlay,
}

/// One recorded infraction and its game effects. Created only by the
/// penalty engine and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyInstance {
    pub kind: PenaltyKind,
    pub player_name: String,
    pub player_position: Position,
    pub side: PenaltySide,
    /// Assessed yardage magnitude; the side determines the sign.
    pub yards: u8,
    pub automatic_first_down: bool,
    pub negates_play: bool,
    pub phase: PenaltyPhase,
    // Situational snapshot at the moment of the flag.
    pub quarter: u8,
    pub down: u8,
    pub field_position: f32,
}
