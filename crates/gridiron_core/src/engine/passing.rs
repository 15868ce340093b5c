//! Target selection, coverage assignment and completion resolution.
//!
//! Target choice is a cumulative-weight draw over the on-field receivers
//! and backs, never a deterministic "best receiver". The covering defender
//! comes from man-coverage position preferences or zone route-depth bands
//! depending on the called scheme family. The throw then resolves in fixed
//! precedence: drop, interception, deflection, completion.

use crate::config::{BaseRateTable, SimConfig};
use crate::engine::selection::{weighted_index, weighted_pick};
use crate::models::{ratings, CoverageScheme, PassOutcome, PlayContext, Player, Position};
use log::trace;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Completion penalty while throwing under pressure.
const PRESSURE_COMPLETION_PENALTY: f32 = 0.08;
/// Interception bump while throwing under pressure.
const PRESSURE_INTERCEPTION_BUMP: f32 = 0.015;

/// Resolved throw.
#[derive(Debug, Clone, Copy)]
pub struct PassResolution<'a> {
    pub outcome: PassOutcome,
    pub receiver: &'a Player,
    pub defender: Option<&'a Player>,
    pub air_yards: f32,
    pub yac: f32,
}

impl PassResolution<'_> {
    pub fn total_yards(&self) -> f32 {
        match self.outcome {
            PassOutcome::Complete => self.air_yards + self.yac,
            _ => 0.0,
        }
    }
}

/// Depth-chart base weight for a target by position-class ordinal: the
/// first wide receiver draws far more looks than the fourth, tight ends
/// and backs sit between.
fn depth_weight(position: Position, ordinal: usize) -> f32 {
    match position {
        Position::WR => match ordinal {
            0 => 3.0,
            1 => 2.2,
            2 => 1.4,
            _ => 0.8,
        },
        Position::TE => match ordinal {
            0 => 1.8,
            _ => 1.0,
        },
        Position::RB => 1.2,
        Position::FB => 0.5,
        _ => 0.0,
    }
}

/// Select the targeted receiver from the on-field offense.
///
/// Weight is depth-chart base weight times a rating factor, drawn through
/// the shared cumulative-weight primitive. An offense with no eligible
/// receivers at all (a heavy kick unit, say) falls back to a uniform
/// choice over everyone on the field.
pub fn select_target<'a>(offense: &[&'a Player], rng: &mut ChaCha8Rng) -> Option<&'a Player> {
    let mut ordinals = std::collections::HashMap::new();
    let mut candidates: Vec<(&Player, f32)> = Vec::new();

    for &player in offense {
        let base = {
            let ordinal = ordinals.entry(player.position).or_insert(0usize);
            let w = depth_weight(player.position, *ordinal);
            *ordinal += 1;
            w
        };
        if base > 0.0 {
            let skill = ratings::normalize(player.rating_chain(
                &["route_running", "hands", "overall"],
                crate::models::DEFAULT_RATING,
            ));
            candidates.push((player, base * (0.5 + skill)));
        }
    }

    if candidates.is_empty() {
        return weighted_pick(rng, offense, |_| 1.0).copied();
    }
    weighted_index(rng, &candidates, |(_, w)| *w).map(|i| candidates[i].0)
}

/// Pick the primary covering defender for a target.
///
/// Man families match by position preference (outside receivers draw
/// corners, tight ends draw the strong safety or a linebacker, backs draw
/// linebackers); zone families pick the defender of the zone band the
/// route depth lands in. Every miss falls back to a uniform choice over
/// the coverage group, so a valid defense always produces a defender.
pub fn assign_cover_defender<'a>(
    config: &SimConfig,
    receiver: &Player,
    coverage_group: &[&'a Player],
    scheme: CoverageScheme,
    route_depth: f32,
    rng: &mut ChaCha8Rng,
) -> crate::error::Result<Option<&'a Player>> {
    if coverage_group.is_empty() {
        return Ok(None);
    }

    let preferred: Vec<&Player> = if scheme.is_man() {
        let pred: fn(&Position) -> bool = match receiver.position {
            Position::WR => |p| matches!(p, Position::CB),
            Position::TE => |p| matches!(p, Position::SS | Position::S) || p.is_linebacker(),
            _ => Position::is_linebacker,
        };
        coverage_group.iter().filter(|p| pred(&p.position)).copied().collect()
    } else {
        let deep = config.threshold("deep_route_depth")?;
        let short = config.threshold("short_route_depth")?;
        let pred: fn(&Position) -> bool = if route_depth >= deep {
            Position::is_safety
        } else if route_depth <= short {
            |p| matches!(p, Position::CB) || p.is_linebacker()
        } else {
            |p| p.is_linebacker() || matches!(p, Position::CB | Position::SS | Position::S)
        };
        coverage_group.iter().filter(|p| pred(&p.position)).copied().collect()
    };

    let pool: &[&Player] = if preferred.is_empty() { coverage_group } else { &preferred };
    let chosen = weighted_pick(rng, pool, |p| {
        0.2 + ratings::normalize(p.rating_or_overall("coverage"))
    });
    Ok(chosen.copied())
}

/// Drop probability from the receiver's hands; sure-handed receivers
/// never drop, stone hands drop plenty.
fn drop_probability(receiver: &Player) -> f32 {
    let hands = ratings::normalize(receiver.rating_or_overall("hands"));
    (0.16 * (1.0 - hands)).clamp(0.0, 0.25)
}

/// Receiver-position scaling for yards after catch.
fn yac_scale(position: Position) -> f32 {
    match position {
        Position::RB => 1.35,
        Position::WR => 1.0,
        Position::TE => 0.75,
        Position::FB => 0.6,
        _ => 0.9,
    }
}

/// Resolve a throw from an alive pocket (clean or pressured).
pub fn resolve_pass<'a>(
    config: &SimConfig,
    rates: &BaseRateTable,
    offense: &[&'a Player],
    coverage_group: &[&'a Player],
    ctx: &PlayContext,
    pressured: bool,
    rng: &mut ChaCha8Rng,
) -> crate::error::Result<Option<PassResolution<'a>>> {
    let receiver = match select_target(offense, rng) {
        Some(r) => r,
        None => return Ok(None),
    };

    // One depth draw serves both the zone-band assignment and, on a
    // completion, the air yards of the throw.
    let route_depth = match Normal::new(rates.air_yards_mean, rates.air_yards_std) {
        Ok(dist) => dist.sample(rng),
        Err(_) => rates.air_yards_mean,
    };

    let defender =
        assign_cover_defender(config, receiver, coverage_group, ctx.coverage, route_depth, rng)?;
    let cover_skill = defender
        .map(|d| ratings::normalize(d.rating_or_overall("coverage")))
        .unwrap_or(0.5);

    // Fixed precedence: drop, interception, deflection, completion.
    if rng.gen::<f32>() < drop_probability(receiver) {
        trace!("{} drops the throw", receiver.name);
        return Ok(Some(PassResolution {
            outcome: PassOutcome::Drop,
            receiver,
            defender,
            air_yards: 0.0,
            yac: 0.0,
        }));
    }

    let mut interception_chance = rates.interception_rate + (cover_skill - 0.5) * 0.02;
    if pressured {
        interception_chance += PRESSURE_INTERCEPTION_BUMP;
    }
    if rng.gen::<f32>() < interception_chance {
        return Ok(Some(PassResolution {
            outcome: PassOutcome::Interception,
            receiver,
            defender,
            air_yards: 0.0,
            yac: 0.0,
        }));
    }

    let deflection_chance = rates.deflection_rate * (0.6 + cover_skill * 0.8);
    if rng.gen::<f32>() < deflection_chance {
        return Ok(Some(PassResolution {
            outcome: PassOutcome::Deflection,
            receiver,
            defender,
            air_yards: 0.0,
            yac: 0.0,
        }));
    }

    let mut completion_chance = rates.completion_rate - (cover_skill - 0.5) * 0.08;
    if pressured {
        completion_chance -= PRESSURE_COMPLETION_PENALTY;
    }
    if rng.gen::<f32>() < completion_chance {
        let yac_dist = Normal::new(rates.yac_mean * yac_scale(receiver.position), rates.yac_std);
        let yac = match yac_dist {
            Ok(dist) => dist.sample(rng).max(0.0),
            Err(_) => rates.yac_mean,
        };

        let mut air = route_depth;
        let mut yac = yac;
        if ctx.is_primetime {
            // Primetime lights swing finishes both ways.
            let swing = rng.gen_range(0.90..1.25);
            air *= swing;
            yac *= swing;
        }
        // A caught ball always nets at least a yard.
        if air + yac < 1.0 {
            yac = 1.0 - air;
        }
        return Ok(Some(PassResolution {
            outcome: PassOutcome::Complete,
            receiver,
            defender,
            air_yards: air,
            yac,
        }));
    }

    Ok(Some(PassResolution {
        outcome: PassOutcome::Incomplete,
        receiver,
        defender,
        air_yards: 0.0,
        yac: 0.0,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BlitzPackage, DefensiveFormation, OffensiveFormation, PlayComplexity, PlayType, Weather,
    };
    use rand::SeedableRng;

    fn context(scheme: CoverageScheme) -> PlayContext {
        PlayContext {
            quarter: 1,
            seconds_remaining: 900,
            down: 1,
            distance: 10,
            field_position: 40.0,
            score_differential: 0,
            offense_is_home: true,
            play_type: PlayType::Pass,
            offensive_formation: OffensiveFormation::Shotgun,
            defensive_formation: DefensiveFormation::Base43,
            coverage: scheme,
            blitz: BlitzPackage::BaseRush,
            complexity: PlayComplexity::Medium,
            weather: Weather::Clear,
            crowd_noise: 0.0,
            is_primetime: false,
        }
    }

    fn skill_offense() -> Vec<Player> {
        vec![
            Player::new("QB1", 12, Position::QB, "Home", 80),
            Player::new("RB1", 28, Position::RB, "Home", 78),
            Player::new("WR1", 81, Position::WR, "Home", 88),
            Player::new("WR2", 82, Position::WR, "Home", 80),
            Player::new("WR3", 83, Position::WR, "Home", 74),
            Player::new("TE1", 87, Position::TE, "Home", 79),
        ]
    }

    fn coverage_defense() -> Vec<Player> {
        vec![
            Player::new("CB1", 24, Position::CB, "Away", 82),
            Player::new("CB2", 25, Position::CB, "Away", 78),
            Player::new("OLB1", 55, Position::OLB, "Away", 76),
            Player::new("MLB1", 54, Position::MLB, "Away", 80),
            Player::new("FS1", 32, Position::FS, "Away", 81),
            Player::new("SS1", 33, Position::SS, "Away", 79),
        ]
    }

    #[test]
    fn test_target_always_from_supplied_pool() {
        let offense = skill_offense();
        let refs: Vec<&Player> = offense.iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..500 {
            let target = select_target(&refs, &mut rng).unwrap();
            assert!(refs.iter().any(|p| p.name == target.name));
            assert!(target.position != Position::QB, "QB cannot target himself");
        }
    }

    #[test]
    fn test_first_receiver_sees_most_targets() {
        let offense = skill_offense();
        let refs: Vec<&Player> = offense.iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut wr1 = 0;
        let mut wr3 = 0;
        for _ in 0..3000 {
            match select_target(&refs, &mut rng).unwrap().name.as_str() {
                "WR1" => wr1 += 1,
                "WR3" => wr3 += 1,
                _ => {}
            }
        }
        assert!(wr1 > wr3 * 2 - 200, "WR1 {} should far outdraw WR3 {}", wr1, wr3);
    }

    #[test]
    fn test_man_coverage_prefers_corners_on_receivers() {
        let config = SimConfig::standard();
        let defense = coverage_defense();
        let refs: Vec<&Player> = defense.iter().collect();
        let wr = Player::new("WR1", 81, Position::WR, "Home", 85);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..300 {
            let defender = assign_cover_defender(
                &config,
                &wr,
                &refs,
                CoverageScheme::Man,
                9.0,
                &mut rng,
            )
            .unwrap()
            .unwrap();
            assert_eq!(defender.position, Position::CB, "man puts a corner on a wideout");
        }
    }

    #[test]
    fn test_zone_deep_routes_draw_safeties() {
        let config = SimConfig::standard();
        let defense = coverage_defense();
        let refs: Vec<&Player> = defense.iter().collect();
        let wr = Player::new("WR1", 81, Position::WR, "Home", 85);
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        for _ in 0..300 {
            let defender = assign_cover_defender(
                &config,
                &wr,
                &refs,
                CoverageScheme::Zone,
                25.0,
                &mut rng,
            )
            .unwrap()
            .unwrap();
            assert!(defender.position.is_safety(), "deep zone is a safety's job");
        }
    }

    #[test]
    fn test_forced_interception_always_picked() {
        let config = SimConfig::standard();
        let mut offense = skill_offense();
        for p in offense.iter_mut() {
            p.ratings.insert("hands".to_string(), 100.0);
        }
        let off_refs: Vec<&Player> = offense.iter().collect();
        let defense = coverage_defense();
        let def_refs: Vec<&Player> = defense.iter().collect();
        let rates = BaseRateTable {
            interception_rate: 1.0,
            ..BaseRateTable::pass_default()
        };
        let ctx = context(CoverageScheme::Man);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..300 {
            let res = resolve_pass(&config, &rates, &off_refs, &def_refs, &ctx, false, &mut rng)
                .unwrap()
                .unwrap();
            assert_eq!(res.outcome, PassOutcome::Interception);
            assert_eq!(res.total_yards(), 0.0);
            assert!(res.defender.is_some(), "an interception needs a defender");
        }
    }

    #[test]
    fn test_forced_completion_nets_at_least_one_yard() {
        let config = SimConfig::standard();
        let mut offense = skill_offense();
        for p in offense.iter_mut() {
            p.ratings.insert("hands".to_string(), 100.0);
        }
        let off_refs: Vec<&Player> = offense.iter().collect();
        let mut defense = coverage_defense();
        for p in defense.iter_mut() {
            // League-average coverage keeps the residual interception term
            // at exactly zero for this scenario.
            p.ratings.insert("coverage".to_string(), 50.0);
        }
        let def_refs: Vec<&Player> = defense.iter().collect();
        let rates = BaseRateTable {
            completion_rate: 2.0,
            interception_rate: 0.0,
            deflection_rate: 0.0,
            air_yards_mean: -2.0,
            air_yards_std: 1.0,
            yac_mean: 0.0,
            yac_std: 0.1,
            ..BaseRateTable::pass_default()
        };
        let ctx = context(CoverageScheme::Zone);
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        for _ in 0..300 {
            let res = resolve_pass(&config, &rates, &off_refs, &def_refs, &ctx, false, &mut rng)
                .unwrap()
                .unwrap();
            assert_eq!(res.outcome, PassOutcome::Complete);
            assert!(
                res.total_yards() >= 1.0 - 1e-4,
                "completion must net a yard: {}",
                res.total_yards()
            );
        }
    }

    #[test]
    fn test_sure_hands_never_drop() {
        let receiver =
            Player::new("Glue", 80, Position::WR, "Home", 90).with_rating("hands", 100.0);
        assert_eq!(drop_probability(&receiver), 0.0);

        let bricks = Player::new("Bricks", 89, Position::WR, "Home", 60).with_rating("hands", 20.0);
        assert!(drop_probability(&bricks) > 0.1);
    }

    #[test]
    fn test_pressure_lowers_completion_rate() {
        let config = SimConfig::standard();
        let offense = skill_offense();
        let off_refs: Vec<&Player> = offense.iter().collect();
        let defense = coverage_defense();
        let def_refs: Vec<&Player> = defense.iter().collect();
        let rates = BaseRateTable::pass_default();
        let ctx = context(CoverageScheme::Man);

        let completions = |pressured: bool| {
            let mut rng = ChaCha8Rng::seed_from_u64(17);
            (0..2000)
                .filter(|_| {
                    resolve_pass(&config, &rates, &off_refs, &def_refs, &ctx, pressured, &mut rng)
                        .unwrap()
                        .unwrap()
                        .outcome
                        == PassOutcome::Complete
                })
                .count()
        };

        let clean = completions(false);
        let hot = completions(true);
        assert!(clean > hot, "clean pocket {} should beat pressure {}", clean, hot);
    }
}
