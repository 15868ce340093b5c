use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::engine::PlaySimulator;
use crate::error::{Result, SimError};
use crate::models::{PlayContext, PlayResult, Player, Position};
use crate::SCHEMA_VERSION;
use std::collections::HashMap;

/// One-play simulation request.
///
/// The seed travels in the request so a caller can replay any play
/// bit-for-bit; two identical requests produce identical responses.
#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    pub schema_version: u8,
    pub seed: u64,
    pub offense: TeamData,
    pub defense: TeamData,
    pub context: PlayContext,
}

#[derive(Debug, Deserialize)]
pub struct TeamData {
    pub name: String,
    /// Depth-chart order; the personnel model fields starters first.
    pub players: Vec<PlayerData>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerData {
    pub name: String,
    pub jersey: u8,
    pub position: Position,
    pub overall: u8,
    #[serde(default)]
    pub ratings: HashMap<String, f32>,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub schema_version: u8,
    pub seed: u64,
    pub result: PlayResult,
}

fn build_roster(team: &TeamData) -> Vec<Player> {
    team.players
        .iter()
        .map(|p| Player {
            name: p.name.clone(),
            jersey: p.jersey,
            position: p.position,
            team: team.name.clone(),
            overall: p.overall,
            ratings: p.ratings.clone(),
        })
        .collect()
}

/// Simulate one play from a typed request against a caller-supplied
/// configuration handle.
pub fn simulate_play_request(config: &SimConfig, request: &PlayRequest) -> Result<PlayResult> {
    if request.schema_version != SCHEMA_VERSION {
        return Err(SimError::InvalidRequest(format!(
            "unsupported schema_version {} (expected {})",
            request.schema_version, SCHEMA_VERSION
        )));
    }
    if request.offense.players.is_empty() {
        return Err(SimError::EmptyRoster(request.offense.name.clone()));
    }
    if request.defense.players.is_empty() {
        return Err(SimError::EmptyRoster(request.defense.name.clone()));
    }

    let offense = build_roster(&request.offense);
    let defense = build_roster(&request.defense);

    let mut simulator = PlaySimulator::new(config, request.seed);
    simulator.simulate_play(&offense, &defense, &request.context)
}

/// JSON-in, JSON-out entry point using the standard configuration.
pub fn simulate_play_json(request_json: &str) -> Result<String> {
    let request: PlayRequest = serde_json::from_str(request_json)?;
    let config = SimConfig::standard();
    let result = simulate_play_request(&config, &request)?;
    let response =
        PlayResponse { schema_version: SCHEMA_VERSION, seed: request.seed, result };
    Ok(serde_json::to_string(&response)?)
}
