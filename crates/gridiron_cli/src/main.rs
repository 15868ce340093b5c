//! Demo driver for the play resolution engine.
//!
//! Simulates a scripted offensive drive (or a single play) with two
//! generated rosters and prints the results, optionally as raw JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridiron_core::models::{
    BlitzPackage, CoverageScheme, DefensiveFormation, OffensiveFormation, PlayComplexity,
    PlayContext, PlayType, Weather,
};
use gridiron_core::{PlaySimulator, Player, Position, SimConfig};
use log::info;

#[derive(Parser)]
#[command(name = "gridiron")]
#[command(about = "Simulate football plays with gridiron_core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one play and print the result
    Play {
        /// RNG seed (same seed, same result)
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Play type: pass, run, field_goal, kickoff, extra_point
        #[arg(long, default_value = "pass")]
        play_type: String,

        /// Print the full result as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Simulate a scripted drive from the offense's 25
    Drive {
        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Print every play result as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

fn demo_roster(team: &str) -> Vec<Player> {
    let specs: &[(Position, u8, u8)] = &[
        (Position::QB, 9, 84),
        (Position::QB, 14, 69),
        (Position::RB, 22, 81),
        (Position::RB, 30, 73),
        (Position::FB, 44, 70),
        (Position::WR, 81, 86),
        (Position::WR, 82, 80),
        (Position::WR, 83, 75),
        (Position::WR, 84, 70),
        (Position::WR, 85, 66),
        (Position::TE, 86, 78),
        (Position::TE, 87, 71),
        (Position::TE, 88, 67),
        (Position::LT, 71, 80),
        (Position::LG, 66, 76),
        (Position::C, 60, 78),
        (Position::RG, 65, 75),
        (Position::RT, 72, 77),
        (Position::OL, 67, 68),
        (Position::DE, 91, 82),
        (Position::DE, 94, 78),
        (Position::DE, 97, 70),
        (Position::DT, 90, 80),
        (Position::DT, 93, 76),
        (Position::NT, 98, 72),
        (Position::OLB, 51, 79),
        (Position::OLB, 55, 75),
        (Position::OLB, 57, 69),
        (Position::MLB, 52, 82),
        (Position::ILB, 54, 73),
        (Position::LB, 58, 68),
        (Position::CB, 24, 83),
        (Position::CB, 26, 78),
        (Position::CB, 28, 72),
        (Position::CB, 29, 67),
        (Position::FS, 31, 80),
        (Position::SS, 33, 78),
        (Position::S, 36, 70),
        (Position::K, 3, 79),
        (Position::P, 7, 74),
        (Position::LS, 48, 66),
    ];
    specs
        .iter()
        .enumerate()
        .map(|(i, (pos, jersey, overall))| {
            Player::new(&format!("{} {} {}", team, pos, i + 1), *jersey, *pos, team, *overall)
        })
        .collect()
}

fn parse_play_type(name: &str) -> Result<PlayType> {
    match name {
        "pass" => Ok(PlayType::Pass),
        "run" => Ok(PlayType::Run),
        "field_goal" => Ok(PlayType::FieldGoal),
        "kickoff" => Ok(PlayType::Kickoff),
        "extra_point" => Ok(PlayType::ExtraPoint),
        other => anyhow::bail!("unknown play type: {}", other),
    }
}

fn context_for(
    play_type: PlayType,
    down: u8,
    distance: u8,
    field_position: f32,
) -> PlayContext {
    let (off_form, def_form) = match play_type {
        PlayType::FieldGoal | PlayType::ExtraPoint => {
            (OffensiveFormation::FieldGoalUnit, DefensiveFormation::FieldGoalBlock)
        }
        PlayType::Kickoff => (OffensiveFormation::KickoffUnit, DefensiveFormation::KickReturn),
        PlayType::Run => (OffensiveFormation::Singleback, DefensiveFormation::Base43),
        PlayType::Pass => (OffensiveFormation::Shotgun, DefensiveFormation::Nickel),
    };
    PlayContext {
        quarter: 2,
        seconds_remaining: 540,
        down,
        distance,
        field_position,
        score_differential: 0,
        offense_is_home: true,
        play_type,
        offensive_formation: off_form,
        defensive_formation: def_form,
        coverage: CoverageScheme::Man,
        blitz: BlitzPackage::BaseRush,
        complexity: PlayComplexity::Medium,
        weather: Weather::Clear,
        crowd_noise: 0.4,
        is_primetime: false,
    }
}

fn describe(result: &gridiron_core::PlayResult, ctx: &PlayContext) -> String {
    let mut parts = vec![format!(
        "{}&{} at the {:.0}: {} for {} yards",
        ctx.down, ctx.distance, ctx.field_position, result.play_type, result.yards
    )];
    if result.is_touchdown {
        parts.push("TOUCHDOWN".to_string());
    }
    if result.is_turnover {
        parts.push("INTERCEPTED".to_string());
    }
    if result.points > 0 && !result.is_touchdown {
        parts.push(format!("{} points", result.points));
    }
    if let Some(penalty) = &result.penalty {
        parts.push(format!("FLAG: {} on {}", penalty.kind.name(), penalty.player_name));
    }
    parts.join(" | ")
}

fn run_single_play(seed: u64, play_type: PlayType, json: bool) -> Result<()> {
    let config = SimConfig::standard();
    let offense = demo_roster("Home");
    let defense = demo_roster("Away");
    let mut simulator = PlaySimulator::new(&config, seed);

    let ctx = context_for(play_type, 1, 10, 35.0);
    let result = simulator
        .simulate_play(&offense, &defense, &ctx)
        .context("play simulation failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", describe(&result, &ctx));
        for line in &result.player_stats {
            if line.pass_attempts + line.rush_attempts + line.targets > 0
                || line.tackles > 0
                || line.sacks > 0.0
            {
                println!("  {} ({} {})", line.name, line.team, line.position);
            }
        }
    }
    Ok(())
}

fn run_drive(seed: u64, json: bool) -> Result<()> {
    let config = SimConfig::standard();
    let offense = demo_roster("Home");
    let defense = demo_roster("Away");
    let mut simulator = PlaySimulator::new(&config, seed);

    let mut field_position = 25.0f32;
    let mut down = 1u8;
    let mut distance = 10u8;
    let mut points = 0u32;
    let mut snaps = 0u32;

    info!("drive starting at the 25, seed {}", seed);

    loop {
        snaps += 1;
        if snaps > 20 {
            println!("Drive stalls after 20 snaps.");
            break;
        }

        // Fourth down: kick when in range, otherwise go for it deep in
        // desperation.
        let play_type = if down == 4 && field_position >= 62.0 {
            PlayType::FieldGoal
        } else if distance >= 7 || down >= 3 {
            PlayType::Pass
        } else {
            PlayType::Run
        };

        let ctx = context_for(play_type, down, distance, field_position);
        let result = simulator
            .simulate_play(&offense, &defense, &ctx)
            .context("play simulation failed")?;

        if json {
            println!("{}", serde_json::to_string(&result)?);
        } else {
            println!("{}", describe(&result, &ctx));
        }

        points += result.points as u32;

        if result.is_turnover {
            println!("Drive over: turnover.");
            break;
        }
        if result.play_type == PlayType::FieldGoal {
            println!(
                "Drive over: field goal {}.",
                if result.points > 0 { "good" } else { "missed" }
            );
            break;
        }
        if result.is_touchdown {
            let xp_ctx = context_for(PlayType::ExtraPoint, 1, 10, 85.0);
            let xp = simulator.simulate_play(&offense, &defense, &xp_ctx)?;
            points += xp.points as u32;
            println!(
                "Touchdown! Extra point {}.",
                if xp.points > 0 { "good" } else { "no good" }
            );
            break;
        }

        field_position = (field_position + result.yards as f32).clamp(0.0, 99.0);
        let gained = result.yards;
        if result.penalty.as_ref().map(|p| p.negates_play).unwrap_or(false) {
            // Replay the down after a negated play.
            distance = (distance as i16 - gained).clamp(1, 30) as u8;
            continue;
        }
        if gained >= distance as i16 {
            down = 1;
            distance = 10;
        } else {
            distance = (distance as i16 - gained).clamp(1, 30) as u8;
            down += 1;
            if down > 4 {
                println!("Drive over: turnover on downs.");
                break;
            }
        }
    }

    println!("Drive result: {} points over {} snaps.", points, snaps);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { seed, play_type, json } => {
            run_single_play(seed, parse_play_type(&play_type)?, json)
        }
        Commands::Drive { seed, json } => run_drive(seed, json),
    }
}
