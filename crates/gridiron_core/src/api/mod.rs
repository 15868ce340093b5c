pub mod json_api;

pub use json_api::{
    simulate_play_json, simulate_play_request, PlayRequest, PlayResponse, PlayerData, TeamData,
};
