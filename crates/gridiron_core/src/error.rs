use std::fmt;

/// Errors surfaced by the play resolution engine.
///
/// Configuration problems are always loud: a missing personnel table or
/// rate table would silently desynchronize snap accounting and balance
/// numbers, so lookups fail instead of defaulting. Missing optional player
/// ratings are not errors; they resolve through the documented fallback
/// chain on [`crate::models::Player`].
#[derive(Debug)]
pub enum SimError {
    UnknownFormation(String),
    MissingConfig { section: String, key: String },
    EmptyRoster(String),
    UnfilledPosition { formation: String, position: String },
    InvalidRequest(String),
    SerializationError(String),
    DeserializationError(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::UnknownFormation(formation) => {
                write!(f, "Unknown formation: {}", formation)
            }
            SimError::MissingConfig { section, key } => {
                write!(f, "Missing config entry: {}/{}", section, key)
            }
            SimError::EmptyRoster(team) => {
                write!(f, "Empty roster for team: {}", team)
            }
            SimError::UnfilledPosition { formation, position } => {
                write!(f, "Formation {} requires {} but the roster cannot fill it", formation, position)
            }
            SimError::InvalidRequest(msg) => {
                write!(f, "Invalid request: {}", msg)
            }
            SimError::SerializationError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            SimError::DeserializationError(msg) => {
                write!(f, "Deserialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            SimError::DeserializationError(err.to_string())
        } else {
            SimError::SerializationError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
