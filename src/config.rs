//! Runtime configuration loaded from `hivemind.toml`.
//!
//! Every field has a default, so a missing file or a partial one is fine.
//! `ANTHROPIC_API_KEY` in the environment wins over the file's `api_key`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{HivemindError, Result};

pub const CONFIG_FILE: &str = "hivemind.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct HivemindConfig {
    /// Key for the narrative service. Empty runs the narrator offline.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_narrative_model")]
    pub narrative_model: String,

    /// Period of the simulation tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Period of the hallway meeting check.
    #[serde(default = "default_meeting_interval_ms")]
    pub meeting_interval_ms: u64,

    /// Probability that a meeting check actually starts a dialogue.
    #[serde(default = "default_meeting_chance")]
    pub meeting_chance: f64,

    /// How long a dialogue bubble stays on screen.
    #[serde(default = "default_dialogue_display_ms")]
    pub dialogue_display_ms: u64,

    #[serde(default = "default_budget")]
    pub default_budget: f64,

    /// Ticks the CLI runs before it stops watching.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u32,
}

fn default_narrative_model() -> String {
    "claude-haiku-4-5-20251001".to_string()
}

fn default_tick_interval_ms() -> u64 {
    1500
}

fn default_meeting_interval_ms() -> u64 {
    12_000
}

fn default_meeting_chance() -> f64 {
    0.25
}

fn default_dialogue_display_ms() -> u64 {
    5000
}

fn default_budget() -> f64 {
    100.0
}

fn default_max_ticks() -> u32 {
    40
}

impl Default for HivemindConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            narrative_model: default_narrative_model(),
            tick_interval_ms: default_tick_interval_ms(),
            meeting_interval_ms: default_meeting_interval_ms(),
            meeting_chance: default_meeting_chance(),
            dialogue_display_ms: default_dialogue_display_ms(),
            default_budget: default_budget(),
            max_ticks: default_max_ticks(),
        }
    }
}

/// Periods the live scheduler runs on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub tick: Duration,
    pub meeting: Duration,
    pub meeting_chance: f64,
    pub dialogue_display: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        HivemindConfig::default().timing()
    }
}

impl HivemindConfig {
    /// Load `hivemind.toml` from the current directory.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<HivemindConfig>(&contents)?
        } else {
            Self::default()
        };

        config.override_api_key(std::env::var("ANTHROPIC_API_KEY").ok());
        config.validate()?;
        Ok(config)
    }

    /// Replace `api_key` with `key` unless it is missing or empty.
    fn override_api_key(&mut self, key: Option<String>) {
        match key {
            Some(key) if !key.is_empty() => self.api_key = key,
            _ => {}
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 || self.meeting_interval_ms == 0 {
            return Err(HivemindError::Config(
                "tick_interval_ms and meeting_interval_ms must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.meeting_chance) {
            return Err(HivemindError::Config(format!(
                "meeting_chance must be within 0..=1, got {}",
                self.meeting_chance
            )));
        }
        Ok(())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            tick: Duration::from_millis(self.tick_interval_ms),
            meeting: Duration::from_millis(self.meeting_interval_ms),
            meeting_chance: self.meeting_chance,
            dialogue_display: Duration::from_millis(self.dialogue_display_ms),
        }
    }
}
