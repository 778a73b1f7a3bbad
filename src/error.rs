use thiserror::Error;

use crate::pod::{Phase, PhaseEvent};

#[derive(Debug, Error)]
pub enum HivemindError {
    #[error("Please enter a pod name before deploying.")]
    PodNameMissing,

    #[error("Please recruit at least {required} units to demonstrate parallel labor (found {found}).")]
    NotEnoughUnits { required: usize, found: usize },

    #[error("Cannot {event} while in the {from} phase")]
    InvalidTransition { from: Phase, event: PhaseEvent },

    #[error("Operation requires the {expected} phase, pod is in {actual}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("Roster is full ({max} units max)")]
    RosterFull { max: usize },

    #[error("Work request must not be empty")]
    EmptyWorkRequest,

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T, E = HivemindError> = std::result::Result<T, E>;
