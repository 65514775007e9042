use std::io;

use thiserror::Error;

use crate::{color::Color, engine::ValidationVerdict, movement::Move, square::Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TrackerError {
    #[error("expected sequence index {expected}, found {found}")]
    SequenceGap { expected: u32, found: u32 },
    #[error("no piece stands on {0} after the move")]
    EmptyDestination(Square),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("the position cannot be handed to {0} to move")]
pub struct PerspectiveError(pub Color);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("no color has been assigned yet")]
    NoColor,
    #[error(transparent)]
    Perspective(#[from] PerspectiveError),
    #[error("move {sequence_index} ({movement}) was rejected: {verdict}")]
    Rejected {
        sequence_index: u32,
        movement: Move,
        verdict: ValidationVerdict,
    },
    #[error("move {sequence_index} could not be recorded")]
    Tracker {
        sequence_index: u32,
        #[source]
        source: TrackerError,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("`{0}` must be at least 1")]
    ZeroLimit(&'static str),
}
