//! Play resolution engine.
//!
//! [`PlaySimulator`] owns the seeded random source and the game-scoped
//! trackers (momentum, form, tackle fatigue) and dispatches each play to
//! its resolver through one exhaustive match over [`PlayType`]. A play
//! simulation is synchronous and sub-millisecond; determinism is
//! guaranteed for a fixed seed and identical inputs.

pub mod attribution;
pub mod formation;
pub mod kicking;
pub mod modifiers;
pub mod momentum;
pub mod outcome;
pub mod passing;
pub mod penalty;
pub mod pressure;
pub mod rushing;
pub mod selection;

pub use attribution::{Side, StatSheet};
pub use formation::{build_rush_plan, select_on_field, RushPlan};
pub use modifiers::ModifierInputs;
pub use momentum::{FormTracker, TeamMomentum};
pub use penalty::PenaltyAssessment;
pub use pressure::PocketResolution;

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::models::{
    PassOutcome, PenaltyInstance, PlayContext, PlayResult, PlayType, Player, PocketOutcome,
    Position,
};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// One-game play resolution engine.
///
/// Cross-play state is limited to the momentum/form trackers and tackle
/// counters, all scoped to a single game; call
/// [`PlaySimulator::reset_game_state`] between games. Callers running
/// games concurrently give each game its own simulator.
pub struct PlaySimulator<'a> {
    config: &'a SimConfig,
    rng: ChaCha8Rng,
    original_seed: u64,
    home_momentum: TeamMomentum,
    away_momentum: TeamMomentum,
    form: FormTracker,
    tackle_counts: HashMap<String, u16>,
}

impl<'a> PlaySimulator<'a> {
    pub fn new(config: &'a SimConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            original_seed: seed,
            home_momentum: TeamMomentum::default(),
            away_momentum: TeamMomentum::default(),
            form: FormTracker::new(),
            tackle_counts: HashMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.original_seed
    }

    /// Reset momentum, form and tackle counters for a fresh game.
    pub fn reset_game_state(&mut self) {
        self.home_momentum.reset();
        self.away_momentum.reset();
        self.form.reset();
        self.tackle_counts.clear();
    }

    /// Let the game loop feed drive-level momentum events (a forced punt,
    /// a long drive finished) back into the engine.
    pub fn record_momentum_event(&mut self, home_team: bool, delta: f32) {
        if home_team {
            self.home_momentum.apply_event(delta);
        } else {
            self.away_momentum.apply_event(delta);
        }
    }

    fn offense_momentum_signed(&self, ctx: &PlayContext) -> f32 {
        if ctx.offense_is_home {
            self.home_momentum.signed()
        } else {
            self.away_momentum.signed()
        }
    }

    fn swing_momentum(&mut self, ctx: &PlayContext, offense_delta: f32, defense_delta: f32) {
        if ctx.offense_is_home {
            self.home_momentum.apply_event(offense_delta);
            self.away_momentum.apply_event(defense_delta);
        } else {
            self.away_momentum.apply_event(offense_delta);
            self.home_momentum.apply_event(defense_delta);
        }
    }

    fn tick_momentum(&mut self) {
        self.home_momentum.tick();
        self.away_momentum.tick();
    }

    /// Diminishing-returns factors for tackle credit, from the counts this
    /// engine has produced so far in the game.
    fn tackle_fatigue_factors(&self, defenders: &[&Player]) -> Result<HashMap<String, f32>> {
        let start = self.config.threshold("tackle_fatigue_start")? as u16;
        let mut factors = HashMap::new();
        for player in defenders {
            let count = self.tackle_counts.get(&player.name).copied().unwrap_or(0);
            let factor = if count >= start {
                1.0 / (1.0 + 0.25 * (count - start + 1) as f32)
            } else {
                1.0
            };
            factors.insert(player.name.clone(), factor);
        }
        Ok(factors)
    }

    /// Simulate one play. The single dispatch point over the play type;
    /// the match is exhaustive so an unhandled play type cannot compile.
    pub fn simulate_play(
        &mut self,
        offense_roster: &[Player],
        defense_roster: &[Player],
        ctx: &PlayContext,
    ) -> Result<PlayResult> {
        let offense_table = self.config.offense_personnel(ctx.offensive_formation)?.clone();
        let defense_table = self.config.defense_personnel(ctx.defensive_formation)?.clone();
        let offense =
            select_on_field(offense_roster, &offense_table, &ctx.offensive_formation.to_string())?;
        let defense =
            select_on_field(defense_roster, &defense_table, &ctx.defensive_formation.to_string())?;

        let result = match ctx.play_type {
            PlayType::Pass => self.resolve_pass_play(&offense, &defense, ctx),
            PlayType::Run => self.resolve_run_play(&offense, &defense, ctx),
            PlayType::FieldGoal => self.resolve_field_goal_play(&offense, &defense, ctx),
            PlayType::ExtraPoint => self.resolve_extra_point_play(&offense, &defense, ctx),
            PlayType::Kickoff => self.resolve_kickoff_play(&offense, &defense, ctx),
        }?;

        self.tick_momentum();
        Ok(result)
    }

    fn elapsed_seconds(&mut self, ctx: &PlayContext, yards: f32) -> u16 {
        let (min, max) = match ctx.play_type {
            PlayType::Pass => (4.0, 8.0),
            PlayType::Run => (4.0, 7.0),
            PlayType::FieldGoal | PlayType::ExtraPoint => (4.0, 6.0),
            PlayType::Kickoff => (8.0, 14.0),
        };
        let base: f32 = self.rng.gen_range(min..max);
        (base + (yards.max(0.0) / 8.0)).round() as u16
    }

    fn run_penalty_engine(
        &mut self,
        offense: &[&Player],
        defense: &[&Player],
        ctx: &PlayContext,
        pre_penalty_yards: f32,
    ) -> Result<Option<PenaltyAssessment>> {
        penalty::determine_penalty(
            self.config,
            offense,
            defense,
            ctx,
            pre_penalty_yards,
            &mut self.rng,
        )
    }

    fn find_on_field<'p>(
        players: &[&'p Player],
        position: Position,
        role: &str,
    ) -> Result<&'p Player> {
        players
            .iter()
            .find(|p| p.position == position)
            .copied()
            .ok_or_else(|| SimError::InvalidRequest(format!("no {} on the field", role)))
    }

    // ========================================================================
    // Pass plays
    // ========================================================================

    fn resolve_pass_play(
        &mut self,
        offense: &[&Player],
        defense: &[&Player],
        ctx: &PlayContext,
    ) -> Result<PlayResult> {
        let config = self.config;
        let qb = Self::find_on_field(offense, Position::QB, "quarterback")?;
        let rush_plan = build_rush_plan(defense, ctx.blitz);
        let coverage_group: Vec<&Player> =
            rush_plan.coverage.iter().map(|&i| defense[i]).collect();
        let rushers: Vec<&Player> = rush_plan.rushers.iter().map(|&i| defense[i]).collect();

        let base = config.base_rates(PlayType::Pass, (ctx.offensive_formation, ctx.defensive_formation))?;
        let streak_span = config.modifier("streak", "span")?;
        let inputs = ModifierInputs {
            offense,
            defense,
            momentum_signed: self.offense_momentum_signed(ctx),
            streak_mult: self.form.multiplier(&qb.name, streak_span),
            extra_rushers: rush_plan.extra_rushers(),
        };
        let rates = modifiers::adjust(config, base, ctx, &inputs, &mut self.rng)?;

        let pocket = pressure::resolve_pocket(config, &rates, qb, &mut self.rng)?;
        let pass = match pocket.outcome {
            PocketOutcome::Sacked | PocketOutcome::Scrambled => None,
            PocketOutcome::Pressured | PocketOutcome::CleanPocket => passing::resolve_pass(
                config,
                &rates,
                offense,
                &coverage_group,
                ctx,
                pocket.outcome == PocketOutcome::Pressured,
                &mut self.rng,
            )?,
        };

        let pre_penalty_yards = match pocket.outcome {
            PocketOutcome::Sacked | PocketOutcome::Scrambled => pocket.yards,
            _ => pass.as_ref().map(|p| p.total_yards()).unwrap_or(0.0),
        };

        let assessment =
            self.run_penalty_engine(offense, defense, ctx, pre_penalty_yards)?;
        let negated = assessment.as_ref().map(|a| a.instance.negates_play).unwrap_or(false);
        let adjusted_yards =
            assessment.as_ref().map(|a| a.final_yards).unwrap_or(pre_penalty_yards);

        let outcome =
            outcome::assemble(ctx.field_position, pre_penalty_yards, adjusted_yards, negated);

        // Attribution. A negated play keeps snap credit and the flag but
        // no play stats; the down is replayed.
        let mut sheet = StatSheet::open(offense, defense, false);
        let mut is_turnover = false;

        if !negated {
            match pocket.outcome {
                PocketOutcome::Sacked => {
                    attribution::credit_sack(&mut sheet, qb, &rushers, &mut self.rng);
                    self.form.record(&qb.name, 0.15);
                    self.swing_momentum(ctx, momentum::events::SACK_ALLOWED, momentum::events::SACK_MADE);
                }
                PocketOutcome::Scrambled => {
                    let yards = outcome.actual_yards;
                    sheet.line_mut(qb, Side::Offense).add_rush_attempt(yards.round() as i16);
                    if outcome.is_touchdown {
                        sheet.line_mut(qb, Side::Offense).add_rush_td();
                    } else {
                        self.credit_tackle_with_fatigue(
                            &mut sheet,
                            defense,
                            true,
                            yards < 0.0,
                        )?;
                    }
                    self.form.record(&qb.name, (0.5 + yards / 25.0).clamp(0.0, 1.0));
                }
                PocketOutcome::Pressured | PocketOutcome::CleanPocket => {
                    self.apply_pass_attribution(&mut sheet, qb, &pass, &coverage_group, defense, ctx, &outcome, &mut is_turnover)?;
                }
            }

            if outcome.is_touchdown {
                self.swing_momentum(
                    ctx,
                    momentum::events::TOUCHDOWN_SCORED,
                    momentum::events::TOUCHDOWN_ALLOWED,
                );
            }
        }

        if let Some(a) = &assessment {
            self.credit_penalty_line(&mut sheet, offense, defense, &a.instance);
        }

        let elapsed = self.elapsed_seconds(ctx, outcome.actual_yards);
        Ok(PlayResult {
            play_type: PlayType::Pass,
            yards: outcome.actual_yards.round() as i16,
            elapsed_seconds: elapsed,
            points: outcome.points,
            is_touchdown: outcome.is_touchdown,
            is_turnover,
            pocket: if negated { None } else { Some(pocket.outcome) },
            pass_outcome: if negated { None } else { pass.as_ref().map(|p| p.outcome) },
            penalty: assessment.map(|a| a.instance),
            player_stats: sheet.into_lines(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_pass_attribution(
        &mut self,
        sheet: &mut StatSheet,
        qb: &Player,
        pass: &Option<passing::PassResolution<'_>>,
        coverage_group: &[&Player],
        defense: &[&Player],
        ctx: &PlayContext,
        outcome: &outcome::OutcomeResolution,
        is_turnover: &mut bool,
    ) -> Result<()> {
        sheet.line_mut(qb, Side::Offense).add_pass_attempt();

        let resolution = match pass {
            Some(r) => r,
            // Nobody to throw to; the ball goes away harmlessly.
            None => {
                self.form.record(&qb.name, 0.35);
                return Ok(());
            }
        };
        let receiver = resolution.receiver;

        match resolution.outcome {
            PassOutcome::Complete => {
                let yards = outcome.actual_yards.round() as i16;
                sheet.line_mut(qb, Side::Offense).add_completion(yards);
                sheet.line_mut(receiver, Side::Offense).add_target();
                sheet.line_mut(receiver, Side::Offense).add_reception(yards);
                if outcome.is_touchdown {
                    sheet.line_mut(qb, Side::Offense).add_passing_td();
                    sheet.line_mut(receiver, Side::Offense).add_receiving_td();
                } else {
                    self.credit_tackle_with_fatigue(sheet, defense, false, false)?;
                }
                self.form.record(&qb.name, 0.8);
                self.form
                    .record(&receiver.name, (0.5 + yards as f32 / 30.0).clamp(0.0, 1.0));
                if yards >= 25 {
                    self.swing_momentum(ctx, momentum::events::BIG_PLAY, 0.0);
                }
            }
            PassOutcome::Incomplete => {
                sheet.line_mut(receiver, Side::Offense).add_target();
                self.form.record(&qb.name, 0.35);
            }
            PassOutcome::Drop => {
                sheet.line_mut(receiver, Side::Offense).add_target();
                sheet.line_mut(receiver, Side::Offense).add_drop();
                self.form.record(&receiver.name, 0.0);
                self.form.record(&qb.name, 0.5);
            }
            PassOutcome::Deflection => {
                sheet.line_mut(receiver, Side::Offense).add_target();
                attribution::credit_deflection(
                    sheet,
                    resolution.defender,
                    coverage_group,
                    &mut self.rng,
                );
                self.form.record(&qb.name, 0.3);
            }
            PassOutcome::Interception => {
                sheet.line_mut(qb, Side::Offense).add_interception_thrown();
                sheet.line_mut(receiver, Side::Offense).add_target();
                attribution::credit_interception(
                    sheet,
                    resolution.defender,
                    coverage_group,
                    &mut self.rng,
                );
                *is_turnover = true;
                self.form.record(&qb.name, 0.0);
                self.swing_momentum(
                    ctx,
                    momentum::events::TURNOVER_COMMITTED,
                    momentum::events::TURNOVER_FORCED,
                );
            }
        }
        Ok(())
    }

    fn credit_tackle_with_fatigue(
        &mut self,
        sheet: &mut StatSheet,
        defense: &[&Player],
        against_run: bool,
        for_loss: bool,
    ) -> Result<()> {
        let factors = self.tackle_fatigue_factors(defense)?;
        let fatigue = move |name: &str| factors.get(name).copied().unwrap_or(1.0);
        if let Some(tackler) = attribution::credit_tackle(
            sheet,
            defense,
            against_run,
            for_loss,
            &fatigue,
            &mut self.rng,
        ) {
            *self.tackle_counts.entry(tackler).or_insert(0) += 1;
        }
        Ok(())
    }

    fn credit_penalty_line(
        &mut self,
        sheet: &mut StatSheet,
        offense: &[&Player],
        defense: &[&Player],
        instance: &PenaltyInstance,
    ) {
        let pool: &[&Player] = match instance.side {
            crate::models::PenaltySide::Offense => offense,
            crate::models::PenaltySide::Defense => defense,
        };
        if let Some(guilty) = pool.iter().find(|p| p.name == instance.player_name) {
            attribution::credit_penalty(sheet, guilty, instance);
        }
    }

    // ========================================================================
    // Run plays
    // ========================================================================

    fn resolve_run_play(
        &mut self,
        offense: &[&Player],
        defense: &[&Player],
        ctx: &PlayContext,
    ) -> Result<PlayResult> {
        let config = self.config;
        let base =
            config.base_rates(PlayType::Run, (ctx.offensive_formation, ctx.defensive_formation))?;
        let streak_span = config.modifier("streak", "span")?;

        // The featured back's form drives the streak stage on handoffs.
        let back_name = offense
            .iter()
            .find(|p| p.position == Position::RB)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let inputs = ModifierInputs {
            offense,
            defense,
            momentum_signed: self.offense_momentum_signed(ctx),
            streak_mult: self.form.multiplier(&back_name, streak_span),
            extra_rushers: 0,
        };
        let rates = modifiers::adjust(config, base, ctx, &inputs, &mut self.rng)?;

        let run = rushing::resolve_run(config, &rates, offense, defense, &mut self.rng)?;
        let (carrier, pre_penalty_yards) = match &run {
            Some(r) => (Some(r.carrier), r.yards),
            None => (None, 0.0),
        };

        let assessment = self.run_penalty_engine(offense, defense, ctx, pre_penalty_yards)?;
        let negated = assessment.as_ref().map(|a| a.instance.negates_play).unwrap_or(false);
        let adjusted_yards =
            assessment.as_ref().map(|a| a.final_yards).unwrap_or(pre_penalty_yards);
        let outcome =
            outcome::assemble(ctx.field_position, pre_penalty_yards, adjusted_yards, negated);

        let mut sheet = StatSheet::open(offense, defense, false);

        if !negated {
            if let Some(carrier) = carrier {
                let yards = outcome.actual_yards;
                sheet.line_mut(carrier, Side::Offense).add_rush_attempt(yards.round() as i16);
                if outcome.is_touchdown {
                    sheet.line_mut(carrier, Side::Offense).add_rush_td();
                    self.swing_momentum(
                        ctx,
                        momentum::events::TOUCHDOWN_SCORED,
                        momentum::events::TOUCHDOWN_ALLOWED,
                    );
                } else {
                    self.credit_tackle_with_fatigue(&mut sheet, defense, true, yards < 0.0)?;
                }
                self.form
                    .record(&carrier.name, (0.5 + yards / 20.0).clamp(0.0, 1.0));
                if yards >= 20.0 {
                    self.swing_momentum(ctx, momentum::events::BIG_PLAY, 0.0);
                }
            }
        }

        if let Some(a) = &assessment {
            self.credit_penalty_line(&mut sheet, offense, defense, &a.instance);
        }

        let elapsed = self.elapsed_seconds(ctx, outcome.actual_yards);
        Ok(PlayResult {
            play_type: PlayType::Run,
            yards: outcome.actual_yards.round() as i16,
            elapsed_seconds: elapsed,
            points: outcome.points,
            is_touchdown: outcome.is_touchdown,
            is_turnover: false,
            pocket: None,
            pass_outcome: None,
            penalty: assessment.map(|a| a.instance),
            player_stats: sheet.into_lines(),
        })
    }

    // ========================================================================
    // Kicks
    // ========================================================================

    fn resolve_field_goal_play(
        &mut self,
        offense: &[&Player],
        defense: &[&Player],
        ctx: &PlayContext,
    ) -> Result<PlayResult> {
        let kicker = Self::find_on_field(offense, Position::K, "kicker")?;
        let res = kicking::resolve_field_goal(
            self.config,
            kicker,
            ctx.yards_to_goal(),
            ctx.weather,
            ctx.clutch_factor(),
            &mut self.rng,
        )?;

        let mut sheet = StatSheet::open(offense, defense, true);
        sheet
            .line_mut(kicker, Side::Offense)
            .add_field_goal_attempt(res.good, res.distance);

        if res.good {
            debug!("field goal good from {}", res.distance);
        }

        let elapsed = self.elapsed_seconds(ctx, 0.0);
        Ok(PlayResult {
            play_type: PlayType::FieldGoal,
            yards: 0,
            elapsed_seconds: elapsed,
            points: if res.good { 3 } else { 0 },
            is_touchdown: false,
            is_turnover: false,
            pocket: None,
            pass_outcome: None,
            penalty: None,
            player_stats: sheet.into_lines(),
        })
    }

    fn resolve_extra_point_play(
        &mut self,
        offense: &[&Player],
        defense: &[&Player],
        ctx: &PlayContext,
    ) -> Result<PlayResult> {
        let kicker = Self::find_on_field(offense, Position::K, "kicker")?;
        let good = kicking::resolve_extra_point(
            self.config,
            kicker,
            ctx.weather,
            ctx.clutch_factor(),
            &mut self.rng,
        )?;

        let mut sheet = StatSheet::open(offense, defense, true);
        sheet.line_mut(kicker, Side::Offense).add_extra_point(good);

        let elapsed = self.elapsed_seconds(ctx, 0.0);
        Ok(PlayResult {
            play_type: PlayType::ExtraPoint,
            yards: 0,
            elapsed_seconds: elapsed,
            points: if good { 1 } else { 0 },
            is_touchdown: false,
            is_turnover: false,
            pocket: None,
            pass_outcome: None,
            penalty: None,
            player_stats: sheet.into_lines(),
        })
    }

    /// Kickoffs field the kicking team as the play's offense and the
    /// return team as its defense. The penalty engine is invoked with the
    /// roles flipped so that a return-team block in the back subtracts
    /// from the return exactly like an offensive hold subtracts from a
    /// run.
    fn resolve_kickoff_play(
        &mut self,
        offense: &[&Player],
        defense: &[&Player],
        ctx: &PlayContext,
    ) -> Result<PlayResult> {
        let kicker = Self::find_on_field(offense, Position::K, "kicker")?;
        let res = kicking::resolve_kickoff(
            self.config,
            kicker,
            defense,
            ctx.weather,
            &mut self.rng,
        )?;

        let mut sheet = StatSheet::open(offense, defense, true);
        sheet.line_mut(kicker, Side::Offense).add_kickoff(res.touchback);

        if res.touchback {
            let elapsed = self.elapsed_seconds(ctx, 0.0);
            return Ok(PlayResult {
                play_type: PlayType::Kickoff,
                yards: 0,
                elapsed_seconds: elapsed,
                points: 0,
                is_touchdown: false,
                is_turnover: false,
                pocket: None,
                pass_outcome: None,
                penalty: None,
                player_stats: sheet.into_lines(),
            });
        }

        let pre_penalty_yards = res.return_yards;
        let assessment =
            self.run_penalty_engine(defense, offense, ctx, pre_penalty_yards)?;
        let negated = assessment.as_ref().map(|a| a.instance.negates_play).unwrap_or(false);
        let adjusted_yards =
            assessment.as_ref().map(|a| a.final_yards).unwrap_or(pre_penalty_yards);
        let outcome = outcome::assemble(
            kicking::RETURN_CATCH_SPOT,
            pre_penalty_yards,
            adjusted_yards,
            negated,
        );

        if !negated {
            if let Some(returner) = res.returner {
                let yards = outcome.actual_yards;
                sheet.line_mut(returner, Side::Defense).add_kick_return(yards.round() as i16);
                if outcome.is_touchdown {
                    sheet.line_mut(returner, Side::Defense).add_kick_return_td();
                } else {
                    // Coverage tackle by the kicking unit.
                    self.credit_tackle_with_fatigue(&mut sheet, offense, true, false)?;
                }
            }
        }

        if let Some(a) = &assessment {
            // Roles are flipped on the return: the penalty engine's
            // "offense" is the return team.
            self.credit_penalty_line(&mut sheet, defense, offense, &a.instance);
        }

        let elapsed = self.elapsed_seconds(ctx, outcome.actual_yards);
        Ok(PlayResult {
            play_type: PlayType::Kickoff,
            yards: outcome.actual_yards.round() as i16,
            elapsed_seconds: elapsed,
            points: outcome.points,
            is_touchdown: outcome.is_touchdown,
            is_turnover: false,
            pocket: None,
            pass_outcome: None,
            penalty: assessment.map(|a| a.instance),
            player_stats: sheet.into_lines(),
        })
    }
}
