//! Run play resolution.
//!
//! Picks the ball carrier from the backfield, shifts the yardage
//! expectation by the blocking matchup up front, then adds power-based
//! yards after contact and a speed-gated breakaway chance.

use crate::config::{BaseRateTable, SimConfig};
use crate::engine::selection::weighted_index;
use crate::error::Result;
use crate::models::{ratings, Player, Position};
use log::trace;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

#[derive(Debug, Clone, Copy)]
pub struct RunResolution<'a> {
    pub carrier: &'a Player,
    pub yards: f32,
}

/// Weighted carrier choice: the featured back carries most, fullbacks and
/// sweeps are change-ups, a mobile quarterback keeps a few himself.
fn select_carrier<'a>(offense: &[&'a Player], rng: &mut ChaCha8Rng) -> Option<&'a Player> {
    let chosen = weighted_index(rng, offense, |p| {
        let skill = ratings::normalize(p.rating_chain(&["vision", "overall"], 60.0));
        let base = match p.position {
            Position::RB => 3.0,
            Position::FB => 0.5,
            Position::QB => {
                if p.rating_chain(&["mobility", "speed"], 45.0) >= 80.0 {
                    0.4
                } else {
                    0.0
                }
            }
            Position::WR => 0.15,
            _ => 0.0,
        };
        base * (0.5 + skill)
    });
    chosen.map(|i| offense[i])
}

fn blocking_shift(offense: &[&Player], defense: &[&Player]) -> f32 {
    let blocking: Vec<f32> = offense
        .iter()
        .filter(|p| p.position.is_offensive_line() || p.position == Position::TE)
        .map(|p| p.rating_or_overall("run_block"))
        .collect();
    let front: Vec<f32> = defense
        .iter()
        .filter(|p| p.position.is_defensive_line() || p.position.is_linebacker())
        .map(|p| p.rating_or_overall("run_defense"))
        .collect();

    let block = ratings::normalized_mean(&blocking);
    let stop = ratings::normalized_mean(&front);
    (block - stop) * 4.0
}

/// Resolve one handoff (or designed keeper).
pub fn resolve_run<'a>(
    config: &SimConfig,
    rates: &BaseRateTable,
    offense: &[&'a Player],
    defense: &[&'a Player],
    rng: &mut ChaCha8Rng,
) -> Result<Option<RunResolution<'a>>> {
    let carrier = match select_carrier(offense, rng) {
        Some(c) => c,
        None => return Ok(None),
    };

    let mean = rates.rush_yards_mean + blocking_shift(offense, defense);
    let base = match Normal::new(mean, rates.rush_yards_std) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean,
    };

    // Yards after contact from the carrier's power; only forward carries
    // earn them, a stuffed run stays stuffed.
    let power = ratings::normalize(carrier.rating_chain(&["power", "strength"], 55.0));
    let contact = if base > 0.0 {
        (rates.yards_after_contact_mean * (0.4 + power)).max(0.0) * rng.gen::<f32>()
    } else {
        0.0
    };

    let mut yards = base + contact;

    let speed = carrier.rating_chain(&["speed", "overall"], 60.0);
    if speed >= config.threshold("breakaway_speed")?
        && rng.gen::<f32>() < config.threshold("breakaway_chance")?
    {
        let burst = rng.gen_range(15.0..40.0);
        trace!("{} breaks away for an extra {:.1}", carrier.name, burst);
        yards += burst;
    }

    Ok(Some(RunResolution { carrier, yards }))
}
