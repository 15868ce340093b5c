//! Layered probability-modifier pipeline.
//!
//! Takes the base-rate table for the called play and applies the
//! situational stages in a fixed, significant order:
//!
//! 1. player attributes (QB accuracy, line protection, hands, coverage)
//! 2. defensive scheme (plus extra rushers from the blitz package)
//! 3. team momentum
//! 4. down-specific pressure
//! 5. weather
//! 6. crowd noise (away offense only)
//! 7. clutch/composure
//! 8. individual hot/cold streak
//! 9. execution variance (Gaussian, by play complexity tier)
//!
//! Rate-type parameters are re-clamped to their parameter-specific bounds
//! after every stage that can push them out of range. Yardage means are
//! never clamped; a busted play may carry a negative expectation.

use crate::config::{bounds, BaseRateTable, SimConfig};
use crate::error::Result;
use crate::models::{ratings, PlayComplexity, PlayContext, Player, Position, Weather};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Situational facts feeding the pipeline beyond the play context itself.
pub struct ModifierInputs<'a> {
    pub offense: &'a [&'a Player],
    pub defense: &'a [&'a Player],
    /// Offense momentum, -1.0 to 1.0 (see `TeamMomentum::signed`).
    pub momentum_signed: f32,
    /// Hot/cold multiplier for the acting player (see
    /// `FormTracker::multiplier`).
    pub streak_mult: f32,
    /// Rushers beyond the base four-man front.
    pub extra_rushers: usize,
}

fn clamp_rates(table: &mut BaseRateTable) {
    table.completion_rate = bounds::clamp(table.completion_rate, bounds::COMPLETION);
    table.sack_rate = bounds::clamp(table.sack_rate, bounds::SACK);
    table.pressure_rate = bounds::clamp(table.pressure_rate, bounds::PRESSURE);
    table.interception_rate = bounds::clamp(table.interception_rate, bounds::INTERCEPTION);
    table.deflection_rate = bounds::clamp(table.deflection_rate, bounds::DEFLECTION);
}

fn find_quarterback<'a>(offense: &'a [&'a Player]) -> Option<&'a Player> {
    offense.iter().find(|p| p.position == Position::QB).copied()
}

fn unit_mean(players: &[&Player], filter: fn(&Position) -> bool, rating: &str) -> f32 {
    let values: Vec<f32> = players
        .iter()
        .filter(|p| filter(&p.position))
        .map(|p| p.rating_or_overall(rating))
        .collect();
    ratings::normalized_mean(&values)
}

/// Stage 1: player-attribute adjustments.
fn apply_player_attributes(table: &mut BaseRateTable, inputs: &ModifierInputs) {
    let qb_accuracy = find_quarterback(inputs.offense)
        .map(|qb| ratings::normalize(qb.rating_or_overall("accuracy")))
        .unwrap_or(0.5);
    let qb_arm = find_quarterback(inputs.offense)
        .map(|qb| ratings::normalize(qb.rating_or_overall("arm_strength")))
        .unwrap_or(0.5);
    let protection = unit_mean(inputs.offense, Position::is_offensive_line, "pass_block");
    let hands = unit_mean(inputs.offense, Position::is_receiver, "hands");
    let coverage = unit_mean(inputs.defense, Position::is_defensive_back, "coverage");

    table.completion_rate +=
        (qb_accuracy - 0.5) * 0.18 + (hands - 0.5) * 0.08 - (coverage - 0.5) * 0.14;
    table.sack_rate *= 1.0 - (protection - 0.5) * 0.6;
    table.pressure_rate *= 1.0 - (protection - 0.5) * 0.5;
    table.interception_rate += (coverage - 0.5) * 0.05 - (qb_accuracy - 0.5) * 0.04;
    table.deflection_rate += (coverage - 0.5) * 0.04;
    table.air_yards_mean += (qb_arm - 0.5) * 4.0;

    clamp_rates(table);
}

/// Stage 2: defensive scheme plus blitz weight.
fn apply_scheme(
    config: &SimConfig,
    table: &mut BaseRateTable,
    ctx: &PlayContext,
    extra_rushers: usize,
) -> Result<()> {
    let category = format!("scheme_{}", ctx.coverage.key());
    table.completion_rate *= config.modifier(&category, "completion_mult")?;
    table.sack_rate *= config.modifier(&category, "sack_mult")?;
    table.pressure_rate *= config.modifier(&category, "pressure_mult")?;
    table.interception_rate *= config.modifier(&category, "interception_mult")?;
    table.deflection_rate *= config.modifier(&category, "deflection_mult")?;
    table.air_yards_mean *= config.modifier(&category, "air_mult")?;

    if extra_rushers > 0 {
        let extra = extra_rushers as f32;
        table.pressure_rate *= 1.0 + 0.08 * extra;
        table.sack_rate *= 1.0 + 0.06 * extra;
        // An emptied-out coverage shell is easier to throw on when the
        // ball does come out.
        table.completion_rate += 0.01 * extra;
    }

    clamp_rates(table);
    Ok(())
}

/// Stage 3: team momentum.
fn apply_momentum(config: &SimConfig, table: &mut BaseRateTable, signed: f32) -> Result<()> {
    let span = config.modifier("momentum", "span")?;
    table.completion_rate *= 1.0 + signed * span;
    table.sack_rate *= 1.0 - signed * span;
    clamp_rates(table);
    Ok(())
}

/// Stage 4: down-specific pressure.
fn apply_down(config: &SimConfig, table: &mut BaseRateTable, down: u8) -> Result<()> {
    let category = match down {
        3 => "down_third",
        d if d >= 4 => "down_fourth",
        _ => return Ok(()),
    };
    table.pressure_rate *= config.modifier(category, "pressure_mult")?;
    table.sack_rate *= config.modifier(category, "sack_mult")?;
    table.completion_rate += config.modifier(category, "completion_delta")?;
    clamp_rates(table);
    Ok(())
}

/// Stage 5: weather.
fn apply_weather(config: &SimConfig, table: &mut BaseRateTable, weather: Weather) -> Result<()> {
    let category = match weather {
        Weather::Clear => return Ok(()),
        Weather::Rain => "weather_rain",
        Weather::Snow => "weather_snow",
        Weather::Wind => "weather_wind",
    };
    table.completion_rate += config.modifier(category, "completion_delta")?;
    table.air_yards_mean += config.modifier(category, "air_delta")?;
    clamp_rates(table);
    Ok(())
}

/// Stage 6: crowd noise, only when the offense is the visiting team.
fn apply_crowd(config: &SimConfig, table: &mut BaseRateTable, ctx: &PlayContext) -> Result<()> {
    if ctx.offense_is_home || ctx.crowd_noise <= 0.0 {
        return Ok(());
    }
    let noise = ctx.crowd_noise.clamp(0.0, 1.0);
    table.completion_rate += noise * config.modifier("crowd", "completion_per_noise")?;
    table.sack_rate += noise * config.modifier("crowd", "sack_per_noise")?;
    clamp_rates(table);
    Ok(())
}

/// Stage 7: clutch/composure. Engages only above the clutch threshold;
/// the direction depends on where the acting player's composure sits
/// relative to the neutral band.
fn apply_clutch(
    config: &SimConfig,
    table: &mut BaseRateTable,
    ctx: &PlayContext,
    inputs: &ModifierInputs,
) -> Result<()> {
    let clutch = ctx.clutch_factor();
    if clutch <= config.threshold("clutch_engage")? {
        return Ok(());
    }
    let composure = find_quarterback(inputs.offense)
        .map(|qb| qb.rating_or_overall("composure"))
        .unwrap_or(crate::models::DEFAULT_RATING);

    if composure >= config.threshold("composure_high")? {
        table.completion_rate += clutch * config.modifier("clutch", "completion_bonus")?;
    } else if composure <= config.threshold("composure_low")? {
        table.completion_rate += clutch * config.modifier("clutch", "completion_penalty")?;
    }
    clamp_rates(table);
    Ok(())
}

/// Stage 8: hot/cold streak of the acting player.
fn apply_streak(table: &mut BaseRateTable, streak_mult: f32) {
    table.completion_rate *= streak_mult;
    clamp_rates(table);
}

/// Stage 9: execution variance. Gaussian noise whose spread follows the
/// play-complexity tier; rate values are clamped back into range, yardage
/// means are left free to go negative.
fn apply_execution_variance(
    config: &SimConfig,
    table: &mut BaseRateTable,
    complexity: PlayComplexity,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    let tier = match complexity {
        PlayComplexity::Simple => "simple",
        PlayComplexity::Medium => "medium",
        PlayComplexity::Complex => "complex",
    };
    let rate_sigma = config.modifier("variance_rate", tier)?;
    let yard_sigma = config.modifier("variance_yards", tier)?;

    if rate_sigma > 0.0 {
        if let Ok(noise) = Normal::new(0.0f32, rate_sigma) {
            table.completion_rate += noise.sample(rng);
            table.sack_rate += noise.sample(rng);
            table.pressure_rate += noise.sample(rng);
            table.interception_rate += noise.sample(rng);
            table.deflection_rate += noise.sample(rng);
        }
    }
    if yard_sigma > 0.0 {
        if let Ok(noise) = Normal::new(0.0f32, yard_sigma) {
            table.air_yards_mean += noise.sample(rng);
            table.yac_mean += noise.sample(rng);
            table.rush_yards_mean += noise.sample(rng);
        }
    }

    clamp_rates(table);
    Ok(())
}

/// Run the full pipeline over a base table.
pub fn adjust(
    config: &SimConfig,
    base: BaseRateTable,
    ctx: &PlayContext,
    inputs: &ModifierInputs,
    rng: &mut ChaCha8Rng,
) -> Result<BaseRateTable> {
    let mut table = base;

    apply_player_attributes(&mut table, inputs);
    apply_scheme(config, &mut table, ctx, inputs.extra_rushers)?;
    apply_momentum(config, &mut table, inputs.momentum_signed)?;
    apply_down(config, &mut table, ctx.down)?;
    apply_weather(config, &mut table, ctx.weather)?;
    apply_crowd(config, &mut table, ctx)?;
    apply_clutch(config, &mut table, ctx, inputs)?;
    apply_streak(&mut table, inputs.streak_mult);
    apply_execution_variance(config, &mut table, ctx.complexity, rng)?;

    Ok(table)
}
