//! Pocket resolution: sack, pressure, scramble, or clean pocket.
//!
//! Runs before any receiving outcome is considered. Sack and pressure are
//! drawn independently against the adjusted rates; a mobile quarterback
//! can turn either into a scramble, with an extra escape bonus when a sack
//! was coming. A small designed-scramble chance exists even from a clean
//! pocket, gated on a high mobility threshold, to model called runs.

use crate::config::{BaseRateTable, SimConfig};
use crate::error::Result;
use crate::models::{ratings, PocketOutcome, Player};
use log::trace;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Terminal pocket state plus the yardage it settles directly (sacks lose
/// yards, scrambles gain or lose; pressured and clean pockets hand off to
/// the passing resolver with zero yards here).
#[derive(Debug, Clone, Copy)]
pub struct PocketResolution {
    pub outcome: PocketOutcome,
    pub yards: f32,
}

fn scramble_probability(config: &SimConfig, qb: &Player, sack_incoming: bool) -> Result<f32> {
    // Mobility falls back to straight-line speed, then a fixed default;
    // an immobile pocket passer should not inherit a high overall here.
    let mobility = ratings::normalize(qb.rating_chain(&["mobility", "speed"], 45.0));
    let composure = ratings::normalize(qb.rating_or_overall("composure"));

    let mut prob = mobility * 0.45 + composure * 0.15;
    if sack_incoming {
        prob += config.threshold("escape_bonus")?;
    }
    Ok(prob.min(config.threshold("escape_ceiling")?))
}

fn scramble_yards(
    config: &SimConfig,
    rates: &BaseRateTable,
    qb: &Player,
    rng: &mut ChaCha8Rng,
) -> Result<f32> {
    let mobility = ratings::normalize(qb.rating_chain(&["mobility", "speed"], 45.0));
    let agility = ratings::normalize(qb.rating_chain(&["agility", "mobility"], 50.0));
    let weight = 0.6 + mobility * 0.25 + agility * 0.15;

    let mean = rates.scramble_yards_mean * weight;
    let mut yards = match Normal::new(mean, rates.scramble_yards_std) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean,
    };

    if rng.gen::<f32>() < config.threshold("long_scramble_chance")? {
        yards += rng.gen_range(10.0..25.0);
    }
    Ok(yards)
}

/// Resolve the pocket for one dropback.
pub fn resolve_pocket(
    config: &SimConfig,
    rates: &BaseRateTable,
    qb: &Player,
    rng: &mut ChaCha8Rng,
) -> Result<PocketResolution> {
    let sack_roll = rng.gen::<f32>() < rates.sack_rate;
    let pressure_roll = rng.gen::<f32>() < rates.pressure_rate;

    if sack_roll || pressure_roll {
        let escape = scramble_probability(config, qb, sack_roll)?;
        if rng.gen::<f32>() < escape {
            let yards = scramble_yards(config, rates, qb, rng)?;
            trace!("{} escapes the rush for {:.1} yards", qb.name, yards);
            return Ok(PocketResolution { outcome: PocketOutcome::Scrambled, yards });
        }
    }

    if sack_roll {
        let loss = rng.gen_range(rates.sack_yards_min..=rates.sack_yards_max);
        trace!("{} sacked for a loss of {:.1}", qb.name, loss);
        return Ok(PocketResolution { outcome: PocketOutcome::Sacked, yards: -loss });
    }

    if pressure_roll {
        return Ok(PocketResolution { outcome: PocketOutcome::Pressured, yards: 0.0 });
    }

    // Called quarterback run from a clean pocket.
    let mobility = qb.rating_chain(&["mobility", "speed"], 45.0);
    if mobility >= config.threshold("designed_scramble_mobility")?
        && rng.gen::<f32>() < config.threshold("designed_scramble_chance")?
    {
        let yards = scramble_yards(config, rates, qb, rng)?;
        trace!("{} takes off on a designed run for {:.1}", qb.name, yards);
        return Ok(PocketResolution { outcome: PocketOutcome::Scrambled, yards });
    }

    Ok(PocketResolution { outcome: PocketOutcome::CleanPocket, yards: 0.0 })
}
