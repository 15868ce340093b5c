//! Field goal, extra point and kickoff resolution.
//!
//! Kick scoring is settled here, not in the outcome assembler: a made
//! field goal is worth 3, a made try 1, and a housed kickoff return 6 for
//! the returning side.

use crate::config::SimConfig;
use crate::error::Result;
use crate::models::{ratings, Player, Position, Weather};
use crate::engine::selection::weighted_pick;
use log::trace;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Snap-to-holder plus end-zone depth added to the line of scrimmage.
pub const FIELD_GOAL_OFFSET_YARDS: f32 = 17.0;
/// Kick returns are fielded around the 2-yard line.
pub const RETURN_CATCH_SPOT: f32 = 2.0;

#[derive(Debug, Clone, Copy)]
pub struct FieldGoalResolution {
    pub distance: u8,
    pub good: bool,
    pub blocked: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct KickoffResolution<'a> {
    pub touchback: bool,
    pub returner: Option<&'a Player>,
    pub return_yards: f32,
}

fn weather_kick_mult(config: &SimConfig, weather: Weather) -> Result<f32> {
    let category = match weather {
        Weather::Clear => return Ok(1.0),
        Weather::Rain => "weather_rain",
        Weather::Snow => "weather_snow",
        Weather::Wind => "weather_wind",
    };
    config.modifier(category, "kick_mult")
}

/// Distance-band make probability before kicker adjustments.
fn distance_base_probability(distance: f32) -> f32 {
    if distance < 30.0 {
        0.96
    } else if distance < 40.0 {
        0.88
    } else if distance < 50.0 {
        0.75
    } else if distance < 57.0 {
        0.55
    } else {
        0.25
    }
}

/// Make probability for a placekick of `distance` yards.
pub fn make_probability(
    config: &SimConfig,
    kicker: &Player,
    distance: f32,
    weather: Weather,
    clutch: f32,
) -> Result<f32> {
    let accuracy = ratings::normalize(kicker.rating_chain(&["kick_accuracy", "overall"], 60.0));
    let leg = ratings::normalize(kicker.rating_chain(&["leg_strength", "overall"], 60.0));

    let mut prob = distance_base_probability(distance);
    prob += (accuracy - 0.5) * 0.12;
    if distance >= 45.0 {
        prob += (leg - 0.5) * 0.15;
    }
    prob *= weather_kick_mult(config, weather)?;

    if clutch > config.threshold("clutch_engage")? {
        let composure = ratings::normalize(kicker.rating_or_overall("composure"));
        if composure < ratings::normalize(config.threshold("composure_low")?) {
            prob -= clutch * 0.06;
        }
    }

    Ok(prob.clamp(0.02, 0.99))
}

/// Resolve a field goal try from the given line of scrimmage.
pub fn resolve_field_goal(
    config: &SimConfig,
    kicker: &Player,
    yards_to_goal: f32,
    weather: Weather,
    clutch: f32,
    rng: &mut ChaCha8Rng,
) -> Result<FieldGoalResolution> {
    let distance = yards_to_goal + FIELD_GOAL_OFFSET_YARDS;

    if rng.gen::<f32>() < config.threshold("fg_block_rate")? {
        trace!("field goal from {:.0} blocked", distance);
        return Ok(FieldGoalResolution { distance: distance as u8, good: false, blocked: true });
    }

    let prob = make_probability(config, kicker, distance, weather, clutch)?;
    let good = rng.gen::<f32>() < prob;
    Ok(FieldGoalResolution { distance: distance as u8, good, blocked: false })
}

/// Extra points are snapped from the 15, a 33-yard kick.
pub const EXTRA_POINT_DISTANCE: f32 = 33.0;

pub fn resolve_extra_point(
    config: &SimConfig,
    kicker: &Player,
    weather: Weather,
    clutch: f32,
    rng: &mut ChaCha8Rng,
) -> Result<bool> {
    let prob = make_probability(config, kicker, EXTRA_POINT_DISTANCE, weather, clutch)?;
    Ok(rng.gen::<f32>() < prob)
}

/// Resolve a kickoff: touchback, or a return with the ball fielded at the
/// catch spot. Return yardage that reaches the far goal line is a score;
/// the caller clips and credits through the outcome assembler.
pub fn resolve_kickoff<'a>(
    config: &SimConfig,
    kicker: &Player,
    return_unit: &[&'a Player],
    weather: Weather,
    rng: &mut ChaCha8Rng,
) -> Result<KickoffResolution<'a>> {
    let leg = ratings::normalize(kicker.rating_chain(&["leg_strength", "overall"], 60.0));
    let mut touchback_prob = config.threshold("touchback_base")? + (leg - 0.5) * 0.30;
    touchback_prob *= weather_kick_mult(config, weather)?;

    if rng.gen::<f32>() < touchback_prob.clamp(0.05, 0.95) {
        return Ok(KickoffResolution { touchback: true, returner: None, return_yards: 0.0 });
    }

    // Deep returner: fastest skill player back deep. A unit with no backs
    // or receivers still returns the kick with whoever is out there.
    let deep: Vec<&Player> = return_unit
        .iter()
        .filter(|p| matches!(p.position, Position::WR | Position::RB))
        .copied()
        .collect();
    let pool: &[&Player] = if deep.is_empty() { return_unit } else { &deep };
    let returner = weighted_pick(rng, pool, |p| {
        0.2 + ratings::normalize(p.rating_chain(&["speed", "overall"], 60.0))
    })
    .copied();

    let mut yards = match Normal::<f32>::new(22.0, 8.0) {
        Ok(dist) => dist.sample(rng).max(0.0),
        Err(_) => 22.0,
    };
    // The occasional crease goes the distance.
    if rng.gen::<f32>() < 0.012 {
        yards += rng.gen_range(40.0..80.0);
    }

    Ok(KickoffResolution { touchback: false, returner, return_yards: yards })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn kicker(ovr: u8) -> Player {
        Player::new("K1", 3, Position::K, "Home", ovr)
            .with_rating("kick_accuracy", ovr as f32)
            .with_rating("leg_strength", ovr as f32)
    }

    fn return_unit() -> Vec<Player> {
        vec![
            Player::new("KR1", 18, Position::WR, "Away", 80).with_rating("speed", 92.0),
            Player::new("KR2", 26, Position::RB, "Away", 75),
            Player::new("W1", 50, Position::LB, "Away", 70),
            Player::new("W2", 51, Position::LB, "Away", 70),
        ]
    }

    #[test]
    fn test_chip_shots_beat_long_bombs() {
        let config = SimConfig::standard();
        let k = kicker(80);
        let short = make_probability(&config, &k, 25.0, Weather::Clear, 0.0).unwrap();
        let long = make_probability(&config, &k, 56.0, Weather::Clear, 0.0).unwrap();
        assert!(short > long, "short {} must beat long {}", short, long);
        assert!(short > 0.9);
        assert!(long < 0.75);
    }

    #[test]
    fn test_snow_hurts_the_kicker() {
        let config = SimConfig::standard();
        let k = kicker(80);
        let clear = make_probability(&config, &k, 45.0, Weather::Clear, 0.0).unwrap();
        let snow = make_probability(&config, &k, 45.0, Weather::Snow, 0.0).unwrap();
        assert!(snow < clear);
    }

    #[test]
    fn test_field_goal_distance_includes_offset() {
        let config = SimConfig::standard();
        let k = kicker(85);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let res = resolve_field_goal(&config, &k, 25.0, Weather::Clear, 0.0, &mut rng).unwrap();
        assert_eq!(res.distance, 42);
    }

    #[test]
    fn test_strong_kicker_makes_most_extra_points() {
        let config = SimConfig::standard();
        let k = kicker(85);
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let made = (0..1000)
            .filter(|_| {
                resolve_extra_point(&config, &k, Weather::Clear, 0.0, &mut rng).unwrap()
            })
            .count();
        assert!(made > 900, "extra points are near-automatic: {}", made);
    }

    #[test]
    fn test_kickoff_touchback_rate_plausible() {
        let config = SimConfig::standard();
        let k = kicker(80);
        let unit = return_unit();
        let refs: Vec<&Player> = unit.iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(20);
        let touchbacks = (0..2000)
            .filter(|_| {
                resolve_kickoff(&config, &k, &refs, Weather::Clear, &mut rng)
                    .unwrap()
                    .touchback
            })
            .count();
        assert!(
            (600..=1600).contains(&touchbacks),
            "touchback count out of band: {}",
            touchbacks
        );
    }

    #[test]
    fn test_returner_is_a_skill_player() {
        let config = SimConfig::standard();
        let k = kicker(60);
        let unit = return_unit();
        let refs: Vec<&Player> = unit.iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(30);
        let mut returns = 0;
        for _ in 0..500 {
            let res = resolve_kickoff(&config, &k, &refs, Weather::Clear, &mut rng).unwrap();
            if let Some(returner) = res.returner {
                returns += 1;
                assert!(
                    matches!(returner.position, Position::WR | Position::RB),
                    "deep men field kicks, got {}",
                    returner.position
                );
                assert!(res.return_yards >= 0.0);
            }
        }
        assert!(returns > 50, "some kicks must be returned: {}", returns);
    }
}
