use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HivemindError, Result};

/// The four steps of the pod lifecycle.
///
/// A pod flows: CHARTER → ARCHITECT → MAPPING → LIVE, and `Terminate` takes a
/// live pod back to CHARTER so it can be reconfigured and redeployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Charter,
    Architect,
    Mapping,
    Live,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Charter => write!(f, "charter"),
            Phase::Architect => write!(f, "architect"),
            Phase::Mapping => write!(f, "mapping"),
            Phase::Live => write!(f, "live"),
        }
    }
}

/// User actions that move the pod between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseEvent {
    /// "Recruit workforce".
    RecruitWorkforce,
    /// "Finalize squad".
    FinalizeSquad,
    /// "Initialize command". Guarded; see [`crate::controller::PodController::deploy`].
    Deploy,
    /// "Terminate pod".
    Terminate,
}

impl fmt::Display for PhaseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseEvent::RecruitWorkforce => write!(f, "recruit workforce"),
            PhaseEvent::FinalizeSquad => write!(f, "finalize squad"),
            PhaseEvent::Deploy => write!(f, "deploy pod"),
            PhaseEvent::Terminate => write!(f, "terminate pod"),
        }
    }
}

/// Pure transition table for [`Phase`]. Guards that need pod state live in
/// the controller; this only knows which edges exist.
pub struct PhaseMachine;

impl PhaseMachine {
    /// Target phase for `event` fired in `from`, or `InvalidTransition`.
    pub fn next(from: Phase, event: PhaseEvent) -> Result<Phase> {
        let to = match (from, event) {
            (Phase::Charter, PhaseEvent::RecruitWorkforce) => Phase::Architect,
            (Phase::Architect, PhaseEvent::FinalizeSquad) => Phase::Mapping,
            (Phase::Mapping, PhaseEvent::Deploy) => Phase::Live,
            (Phase::Live, PhaseEvent::Terminate) => Phase::Charter,
            _ => return Err(HivemindError::InvalidTransition { from, event }),
        };
        Ok(to)
    }
}
