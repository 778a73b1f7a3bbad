//! Command-line interface built on clap.
//!
//! Subcommands: `run`, `demo`, `export`, `models`. Timing and output flags
//! are global so they work after any subcommand.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// HiveMind: deploy a pod of AI labor units and watch them work.
#[derive(Debug, Parser)]
#[command(name = "hivemind", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Simulation tick period in milliseconds (overrides hivemind.toml).
    #[arg(long, global = true)]
    pub tick_ms: Option<u64>,

    /// Stop watching after this many ticks.
    #[arg(long, global = true)]
    pub max_ticks: Option<u32>,

    /// Seed the simulation for a reproducible run.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Print the final pod state as JSON instead of drawing the floor.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy the pod described by a manifest and hand it one work request.
    Run {
        /// TOML or JSON pod manifest.
        #[arg(long)]
        manifest: PathBuf,

        /// Work request text: a ticket, a PR reference, anything.
        #[arg(long, default_value = "PR #314: CI checks failing")]
        work: String,

        /// Release units blocked for approval without asking.
        #[arg(long, default_value_t = false)]
        auto_approve: bool,
    },

    /// Deploy the built-in demo pod.
    Demo {
        #[arg(long, default_value = "PR #314: CI checks failing")]
        work: String,

        #[arg(long, default_value_t = false)]
        auto_approve: bool,
    },

    /// Print the crew configuration of a manifest (the demo crew by default).
    Export {
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// List the model engines a unit can run on.
    Models,
}
