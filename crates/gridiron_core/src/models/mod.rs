pub mod penalty;
pub mod play;
pub mod player;
pub mod result;
pub mod stats;

pub use penalty::{PenaltyInstance, PenaltyKind, PenaltyPhase, PenaltySide};
pub use play::{
    BlitzPackage, CoverageScheme, DefensiveFormation, OffensiveFormation, PlayComplexity,
    PlayContext, PlayType, Weather,
};
pub use player::{ratings, Player, Position, DEFAULT_RATING};
pub use result::{PassOutcome, PlayResult, PocketOutcome};
pub use stats::PlayerStatLine;
