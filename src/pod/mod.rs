//! Domain model of a pod: phases, labor units, the roster, deliverables and
//! the work intake.

mod charter;
mod deliverable;
mod log;
mod models;
mod phase;
mod roster;
mod unit;
mod work;

pub use charter::PodConfig;
pub use deliverable::{Deliverable, DeliverableFeed, DeliverableKind, FEED_CAPACITY};
pub use log::{LogEntry, PodLog};
pub use models::{ModelId, ModelMetadata};
pub use phase::{Phase, PhaseEvent, PhaseMachine};
pub use roster::{MAX_UNITS, Roster};
pub use unit::{LaborUnit, Position, Tool, UnitPatch, UnitStatus, avatar_url};
pub use work::{WorkKind, WorkUnit};
