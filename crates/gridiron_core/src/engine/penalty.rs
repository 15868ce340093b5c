//! Penalty determination and application.
//!
//! A pure function of the on-field units, the play context and the
//! pre-penalty yardage. Each registered penalty kind rolls independently
//! against `base_rate x team_discipline x situation x home_field`, in a
//! fixed registration order; the first kind to trigger is the one applied,
//! so a play carries at most one penalty.
//!
//! On kickoffs the caller passes the return unit as the "offense", which
//! keeps the side-sign convention intact: a return-team hold subtracts
//! from the return the same way an offensive hold subtracts from a run.

use crate::config::SimConfig;
use crate::error::Result;
use crate::models::{
    ratings, PenaltyInstance, PenaltyKind, PenaltyPhase, PenaltySide, PlayContext, PlayType,
    Player, Position,
};
use crate::engine::selection::weighted_pick;
use log::debug;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Static description of one registered penalty kind.
struct PenaltyRule {
    kind: PenaltyKind,
    side: PenaltySide,
    phase: PenaltyPhase,
    yards: u8,
    automatic_first_down: bool,
    negates_play: bool,
}

/// Registration order is fixed and significant: the first rule whose roll
/// triggers wins the play.
const REGISTRY: &[PenaltyRule] = &[
    PenaltyRule {
        kind: PenaltyKind::FalseStart,
        side: PenaltySide::Offense,
        phase: PenaltyPhase::PreSnap,
        yards: 5,
        automatic_first_down: false,
        negates_play: true,
    },
    PenaltyRule {
        kind: PenaltyKind::DelayOfGame,
        side: PenaltySide::Offense,
        phase: PenaltyPhase::PreSnap,
        yards: 5,
        automatic_first_down: false,
        negates_play: true,
    },
    PenaltyRule {
        kind: PenaltyKind::Offside,
        side: PenaltySide::Defense,
        phase: PenaltyPhase::PreSnap,
        yards: 5,
        automatic_first_down: false,
        negates_play: false,
    },
    PenaltyRule {
        kind: PenaltyKind::Encroachment,
        side: PenaltySide::Defense,
        phase: PenaltyPhase::PreSnap,
        yards: 5,
        automatic_first_down: false,
        negates_play: true,
    },
    PenaltyRule {
        kind: PenaltyKind::OffensiveHolding,
        side: PenaltySide::Offense,
        phase: PenaltyPhase::DuringPlay,
        yards: 10,
        automatic_first_down: false,
        negates_play: true,
    },
    PenaltyRule {
        kind: PenaltyKind::DefensiveHolding,
        side: PenaltySide::Defense,
        phase: PenaltyPhase::DuringPlay,
        yards: 5,
        automatic_first_down: true,
        negates_play: false,
    },
    PenaltyRule {
        kind: PenaltyKind::IllegalContact,
        side: PenaltySide::Defense,
        phase: PenaltyPhase::DuringPlay,
        yards: 5,
        automatic_first_down: true,
        negates_play: false,
    },
    PenaltyRule {
        kind: PenaltyKind::PassInterference,
        side: PenaltySide::Defense,
        phase: PenaltyPhase::DuringPlay,
        yards: 15,
        automatic_first_down: true,
        negates_play: false,
    },
    PenaltyRule {
        kind: PenaltyKind::RoughingThePasser,
        side: PenaltySide::Defense,
        phase: PenaltyPhase::PostPlay,
        yards: 15,
        automatic_first_down: true,
        negates_play: false,
    },
    PenaltyRule {
        kind: PenaltyKind::FaceMask,
        side: PenaltySide::Defense,
        phase: PenaltyPhase::DuringPlay,
        yards: 15,
        automatic_first_down: true,
        negates_play: false,
    },
    PenaltyRule {
        kind: PenaltyKind::UnnecessaryRoughness,
        side: PenaltySide::Defense,
        phase: PenaltyPhase::PostPlay,
        yards: 15,
        automatic_first_down: true,
        negates_play: false,
    },
    PenaltyRule {
        kind: PenaltyKind::IllegalBlockInTheBack,
        side: PenaltySide::Offense,
        phase: PenaltyPhase::DuringPlay,
        yards: 10,
        automatic_first_down: false,
        negates_play: false,
    },
];

/// Influence weight for the team discipline average. Signal callers set
/// the tone: the quarterback, the center making line calls, the mike
/// backer, the blind-side tackle and the strong safety count extra.
fn discipline_influence(position: Position) -> f32 {
    match position {
        Position::QB => 2.0,
        Position::C => 1.8,
        Position::MLB => 1.8,
        Position::LT => 1.6,
        Position::SS => 1.5,
        _ => 1.0,
    }
}

/// Position-weighted mean discipline mapped through fixed bands to a
/// penalty-rate multiplier; a composed unit draws fewer flags.
pub fn team_discipline_multiplier(players: &[&Player]) -> f32 {
    if players.is_empty() {
        return 1.0;
    }
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for player in players {
        let weight = discipline_influence(player.position);
        let discipline = ratings::normalize(player.rating_or_overall("discipline"));
        weighted_sum += discipline * weight;
        weight_total += weight;
    }
    let mean = weighted_sum / weight_total;

    if mean >= 0.75 {
        0.75
    } else if mean >= 0.65 {
        0.90
    } else if mean >= 0.55 {
        1.00
    } else if mean >= 0.45 {
        1.10
    } else {
        1.25
    }
}

/// Play-type eligibility and situational scaling for one kind. A zero
/// disables the kind for this snap.
fn situational_multiplier(kind: PenaltyKind, ctx: &PlayContext) -> f32 {
    let is_kick = ctx.play_type == PlayType::Kickoff;
    match kind {
        PenaltyKind::IllegalBlockInTheBack => {
            if is_kick {
                1.0
            } else {
                0.0
            }
        }
        PenaltyKind::IllegalContact
        | PenaltyKind::PassInterference
        | PenaltyKind::RoughingThePasser => {
            if ctx.play_type == PlayType::Pass {
                // Desperation shots downfield draw more contact flags.
                if kind == PenaltyKind::PassInterference && ctx.distance > 15 {
                    1.3
                } else {
                    1.0
                }
            } else {
                0.0
            }
        }
        PenaltyKind::FalseStart => {
            if is_kick {
                0.0
            } else if !ctx.offense_is_home && ctx.crowd_noise > 0.0 {
                // Silent counts fail in loud buildings.
                1.0 + ctx.crowd_noise * 0.8
            } else {
                1.0
            }
        }
        PenaltyKind::DelayOfGame | PenaltyKind::Offside | PenaltyKind::Encroachment => {
            if is_kick {
                0.0
            } else {
                1.0
            }
        }
        PenaltyKind::UnnecessaryRoughness => 1.0 + ctx.clutch_factor() * 0.4,
        PenaltyKind::DefensiveHolding => {
            if is_kick {
                0.0
            } else {
                1.0
            }
        }
        PenaltyKind::OffensiveHolding | PenaltyKind::FaceMask => 1.0,
    }
}

/// Home-field multiplier for the penalized side; road teams draw a few
/// more flags.
fn home_field_multiplier(config: &SimConfig, ctx: &PlayContext, side: PenaltySide) -> Result<f32> {
    let penalized_is_home = match side {
        PenaltySide::Offense => ctx.offense_is_home,
        PenaltySide::Defense => !ctx.offense_is_home,
    };
    if penalized_is_home {
        config.modifier("home_field", "penalty_mult_home")
    } else {
        config.modifier("home_field", "penalty_mult_away")
    }
}

/// Position tendency for committing a given kind.
fn position_tendency(kind: PenaltyKind, position: Position) -> f32 {
    match kind {
        PenaltyKind::FalseStart => {
            if position.is_offensive_line() {
                2.0
            } else if position == Position::TE {
                1.2
            } else if position == Position::QB {
                0.1
            } else {
                0.6
            }
        }
        PenaltyKind::DelayOfGame => {
            if position == Position::QB {
                5.0
            } else {
                0.0
            }
        }
        PenaltyKind::Offside | PenaltyKind::Encroachment => {
            if position.is_defensive_line() {
                2.2
            } else if position.is_linebacker() {
                0.8
            } else {
                0.2
            }
        }
        PenaltyKind::OffensiveHolding => {
            if position.is_offensive_line() {
                2.5
            } else if position == Position::TE {
                1.2
            } else if position == Position::QB {
                0.0
            } else {
                0.4
            }
        }
        PenaltyKind::DefensiveHolding | PenaltyKind::IllegalContact
        | PenaltyKind::PassInterference => {
            if position == Position::CB {
                2.2
            } else if position.is_safety() || position == Position::DB {
                1.2
            } else if position.is_linebacker() {
                0.5
            } else {
                0.1
            }
        }
        PenaltyKind::RoughingThePasser => {
            if position.is_defensive_line() {
                2.0
            } else if position.is_linebacker() {
                1.0
            } else {
                0.3
            }
        }
        PenaltyKind::FaceMask => {
            if position.is_linebacker() {
                1.5
            } else if position.is_defensive_line() {
                1.2
            } else {
                0.8
            }
        }
        PenaltyKind::UnnecessaryRoughness => {
            if position.is_safety() {
                1.5
            } else if position.is_linebacker() {
                1.2
            } else {
                0.8
            }
        }
        PenaltyKind::IllegalBlockInTheBack => {
            if position.is_linebacker() || position == Position::TE {
                1.4
            } else {
                1.0
            }
        }
    }
}

/// Pick the guilty player: restrict to the penalized side, prefer the
/// positions associated with the kind, then weight by each candidate's
/// penalty proneness (the inverse of discipline). Falls back to a uniform
/// choice over the side when no candidate carries weight.
fn select_guilty<'a>(
    kind: PenaltyKind,
    candidates: &[&'a Player],
    rng: &mut ChaCha8Rng,
) -> Option<&'a Player> {
    weighted_pick(rng, candidates, |p| {
        let proneness = 1.0 - ratings::normalize(p.rating_or_overall("discipline"));
        position_tendency(kind, p.position) * (0.15 + proneness)
    })
    .copied()
}

/// One assessed penalty plus its effect on the play.
#[derive(Debug, Clone)]
pub struct PenaltyAssessment {
    pub instance: PenaltyInstance,
    /// Play yardage after the penalty: the signed assessed yardage alone
    /// when the play is negated, otherwise the original yardage plus the
    /// signed assessed yardage.
    pub final_yards: f32,
    pub automatic_first_down: bool,
}

/// Determine whether a penalty occurred on this snap and, if so, assess
/// it. Pure given the random source; never fails on valid inputs.
pub fn determine_penalty(
    config: &SimConfig,
    offense: &[&Player],
    defense: &[&Player],
    ctx: &PlayContext,
    pre_penalty_yards: f32,
    rng: &mut ChaCha8Rng,
) -> Result<Option<PenaltyAssessment>> {
    for rule in REGISTRY {
        let side_players: &[&Player] = match rule.side {
            PenaltySide::Offense => offense,
            PenaltySide::Defense => defense,
        };
        if side_players.is_empty() {
            continue;
        }

        let base = config.modifier("penalty_base", rule.kind.key())?;
        let rate = base
            * team_discipline_multiplier(side_players)
            * situational_multiplier(rule.kind, ctx)
            * home_field_multiplier(config, ctx, rule.side)?;

        if rate <= 0.0 || rng.gen::<f32>() >= rate {
            continue;
        }

        let guilty = match select_guilty(rule.kind, side_players, rng) {
            Some(p) => p,
            None => continue,
        };

        let signed_yards = match rule.side {
            PenaltySide::Offense => -(rule.yards as f32),
            PenaltySide::Defense => rule.yards as f32,
        };
        let final_yards = if rule.negates_play {
            signed_yards
        } else {
            pre_penalty_yards + signed_yards
        };

        debug!(
            "{} on {} ({}), {} yards, negates={}",
            rule.kind.name(),
            guilty.name,
            guilty.position,
            rule.yards,
            rule.negates_play
        );

        let instance = PenaltyInstance {
            kind: rule.kind,
            player_name: guilty.name.clone(),
            player_position: guilty.position,
            side: rule.side,
            yards: rule.yards,
            automatic_first_down: rule.automatic_first_down,
            negates_play: rule.negates_play,
            phase: rule.phase,
            quarter: ctx.quarter,
            down: ctx.down,
            field_position: ctx.field_position,
        };

        return Ok(Some(PenaltyAssessment {
            instance,
            final_yards,
            automatic_first_down: rule.automatic_first_down
                && rule.side == PenaltySide::Defense,
        }));
    }

    Ok(None)
}
