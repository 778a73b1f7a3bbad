//! HiveMind: a pod of simulated AI labor units that take work requests,
//! report progress, produce deliverables and stop for human approval on
//! risky merges.
//!
//! [`controller::PodController`] owns all state and exposes every operation
//! as a synchronous method. [`session::Session`] puts it behind a lock and
//! drives it with the timers in [`scheduler`].

pub mod anthropic;
pub mod classify;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod manifest;
pub mod narrative;
pub mod pod;
pub mod random;
pub mod scheduler;
pub mod session;
pub mod ui;
